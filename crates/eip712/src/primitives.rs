//! Utility to convert u8 slice to and from hexadecimal strings.

use std::{
    fmt::{Display, LowerHex, Write},
    num::ParseIntError,
    str::FromStr,
};

#[derive(Debug, thiserror::Error)]
pub enum HexError {
    #[error(transparent)]
    ParseIntError(#[from] ParseIntError),

    #[error("Invalid hex length: {0}")]
    InvalidHexLength(usize),

    #[error("Invalid hex character in: {0}")]
    InvalidHexCharacter(String),
}

/// Represent a ethereum hex string type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hex<T>(pub T);

/// A 32 bytes hash, e.g. the EIP-712 sign hash.
pub type H256 = Hex<[u8; 32]>;

impl<T> Hex<T>
where
    T: AsRef<[u8]>,
{
    /// Returns the hex bytes length.
    pub fn len(&self) -> usize {
        self.0.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_ref().is_empty()
    }
}

impl<T> AsRef<[u8]> for Hex<T>
where
    T: AsRef<[u8]>,
{
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl<T> LowerHex for Hex<T>
where
    T: AsRef<[u8]>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let buf = self.0.as_ref();

        let mut content = String::with_capacity(buf.len() * 2);
        for &b in buf {
            write!(&mut content, "{:02x}", b)?;
        }

        if f.alternate() {
            write!(f, "0x{}", content)
        } else {
            write!(f, "{}", content)
        }
    }
}

impl<T> Display for Hex<T>
where
    T: AsRef<[u8]>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self)
    }
}

fn strip_hex_prefix(s: &str) -> Result<&str, HexError> {
    let s = s.strip_prefix("0x").unwrap_or(s);

    if !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(HexError::InvalidHexCharacter(s.to_owned()));
    }

    Ok(s)
}

impl FromStr for Hex<Vec<u8>> {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = strip_hex_prefix(s)?;

        let s = if s.len() % 2 != 0 {
            "0".to_string() + s
        } else {
            s.to_owned()
        };

        let buf: Result<Vec<u8>, ParseIntError> = (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16))
            .collect();

        Ok(Hex(buf?))
    }
}

impl<const N: usize> FromStr for Hex<[u8; N]> {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = strip_hex_prefix(s)?;

        if s.len() > N * 2 || s.len() % 2 != 0 {
            return Err(HexError::InvalidHexLength(s.len()));
        }

        let offset = N - s.len() / 2;

        let mut buf = [0u8; N];

        for i in offset..N {
            buf[i] = u8::from_str_radix(&s[(i - offset) * 2..(i - offset) * 2 + 2], 16)?;
        }

        Ok(Hex(buf))
    }
}

impl<const N: usize> From<[u8; N]> for Hex<[u8; N]> {
    fn from(value: [u8; N]) -> Self {
        Self(value)
    }
}

impl<const N: usize> From<Hex<[u8; N]>> for [u8; N] {
    fn from(value: Hex<[u8; N]>) -> Self {
        value.0
    }
}
