//! [`EIP-712`](https://eips.ethereum.org/EIPS/eip-712) hashing over a dynamic `types` schema.
//!
//! The schema and the data are plain JSON, so these functions work for any typed data,
//! not only the cosmos one produced by this crate.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use sha3::{Digest, Keccak256};

use crate::{
    errors::{Error, Result},
    json::json_kind,
    primitives::{Hex, H256},
    types::{Type, Types, EIP712_DOMAIN_TYPE},
};

/// Calculate the input data's keccak256 hash
pub fn keccak256<S>(bytes: S) -> H256
where
    S: AsRef<[u8]>,
{
    let mut hasher = Keccak256::new();

    hasher.update(bytes.as_ref());

    Hex::<[u8; 32]>(hasher.finalize().into())
}

fn lookup<'a>(types: &'a Types, type_name: &str) -> Result<&'a Vec<Type>> {
    types
        .get(type_name)
        .ok_or_else(|| Error::EncodeData(format!("type {} is not defined", type_name)))
}

fn strip_array_suffix(type_name: &str) -> &str {
    let mut base = type_name;

    while let Some(element) = base.strip_suffix("[]") {
        base = element;
    }

    base
}

fn collect_dependencies<'a>(
    types: &'a Types,
    type_name: &'a str,
    dependencies: &mut BTreeSet<&'a str>,
) -> Result<()> {
    if !dependencies.insert(type_name) {
        return Ok(());
    }

    for field in lookup(types, type_name)? {
        let base = strip_array_suffix(&field.r#type);

        if types.contains_key(base) {
            collect_dependencies(types, base, dependencies)?;
        }
    }

    Ok(())
}

fn encode_type_single(type_name: &str, fields: &[Type], buf: &mut String) {
    buf.push_str(type_name);
    buf.push('(');

    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }

        buf.push_str(&field.r#type);
        buf.push(' ');
        buf.push_str(&field.name);
    }

    buf.push(')');
}

/// Returns `encodeType(type_name)`: the type itself followed by every referenced
/// struct type in name order, e.g. `Mail(Person from,Person to,string contents)Person(string name,address wallet)`.
pub fn encode_type(types: &Types, type_name: &str) -> Result<String> {
    let mut dependencies = BTreeSet::new();

    collect_dependencies(types, type_name, &mut dependencies)?;

    dependencies.remove(type_name);

    let mut encoded = String::new();

    encode_type_single(type_name, lookup(types, type_name)?, &mut encoded);

    for dependency in dependencies {
        encode_type_single(dependency, lookup(types, dependency)?, &mut encoded);
    }

    Ok(encoded)
}

/// Returns `keccak256(encodeType(type_name))`.
pub fn type_hash(types: &Types, type_name: &str) -> Result<H256> {
    Ok(keccak256(encode_type(types, type_name)?))
}

/// Returns `keccak256(typeHash ‖ encodeData(data))`.
///
/// Fails if `data` misses a field of `type_name` or carries a key the type does not declare.
pub fn hash_struct(types: &Types, type_name: &str, data: &Map<String, Value>) -> Result<H256> {
    let fields = lookup(types, type_name)?;

    if let Some(extra) = data
        .keys()
        .find(|key| !fields.iter().any(|field| field.name == **key))
    {
        return Err(Error::EncodeData(format!(
            "there is extra data provided in the message, type {} has no field {}",
            type_name, extra
        )));
    }

    let mut buf = Vec::with_capacity((fields.len() + 1) * 32);

    buf.extend_from_slice(type_hash(types, type_name)?.as_ref());

    for field in fields {
        let value = data.get(&field.name).ok_or_else(|| {
            Error::EncodeData(format!(
                "missing value of field {} for type {}",
                field.name, type_name
            ))
        })?;

        let encoded = encode_field(types, &field.r#type, value)
            .map_err(|err| err.wrap(format!("{}.{}", type_name, field.name)))?;

        buf.extend_from_slice(&encoded);
    }

    Ok(keccak256(buf))
}

/// Returns the EIP-712 digest `keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ hashStruct(message))`.
pub fn sign_hash(
    types: &Types,
    primary_type: &str,
    domain: &Map<String, Value>,
    message: &Map<String, Value>,
) -> Result<H256> {
    let domain_separator = hash_struct(types, EIP712_DOMAIN_TYPE, domain)?;
    let message_hash = hash_struct(types, primary_type, message)?;

    let mut buf = Vec::with_capacity(2 + 32 + 32);

    buf.extend_from_slice(b"\x19\x01");
    buf.extend_from_slice(domain_separator.as_ref());
    buf.extend_from_slice(message_hash.as_ref());

    let hash = keccak256(buf);

    log::debug!("eip712 sign hash, primary_type={}, hash={}", primary_type, hash);

    Ok(hash)
}

fn unexpected(type_name: &str, value: &Value) -> Error {
    Error::EncodeData(format!(
        "expect {} value, got {}",
        type_name,
        json_kind(value)
    ))
}

fn encode_field(types: &Types, type_name: &str, value: &Value) -> Result<[u8; 32]> {
    if let Some(element_type) = type_name.strip_suffix("[]") {
        let elements = match value {
            Value::Array(elements) => elements,
            _ => return Err(unexpected(type_name, value)),
        };

        let mut buf = Vec::with_capacity(elements.len() * 32);

        for element in elements {
            buf.extend_from_slice(&encode_field(types, element_type, element)?);
        }

        return Ok(keccak256(buf).0);
    }

    if types.contains_key(type_name) {
        return match value {
            Value::Object(data) => Ok(hash_struct(types, type_name, data)?.0),
            _ => Err(unexpected(type_name, value)),
        };
    }

    encode_atomic(type_name, value)
}

fn parse_hex(type_name: &str, value: &Value) -> Result<Vec<u8>> {
    match value {
        Value::String(s) => s
            .parse::<Hex<Vec<u8>>>()
            .map(|hex| hex.0)
            .map_err(|err| Error::EncodeData(format!("{} value {}, {}", type_name, s, err))),
        _ => Err(unexpected(type_name, value)),
    }
}

/// Parse the bit size of `intN`/`uintN`, 256 if omitted.
fn integer_bits(type_name: &str, suffix: &str) -> Result<usize> {
    if suffix.is_empty() {
        return Ok(256);
    }

    match suffix.parse::<usize>() {
        Ok(bits) if bits % 8 == 0 && (8..=256).contains(&bits) => Ok(bits),
        _ => Err(Error::EncodeData(format!("invalid integer type {}", type_name))),
    }
}

fn encode_uint(type_name: &str, bits: usize, value: &Value) -> Result<[u8; 32]> {
    let mut buf = [0u8; 32];

    match value {
        Value::Number(n) => {
            let n = n
                .as_u64()
                .ok_or_else(|| Error::EncodeData(format!("{} value {} out of range", type_name, n)))?;

            buf[24..].copy_from_slice(&n.to_be_bytes());
        }
        Value::String(s) if s.starts_with("0x") => {
            let bytes = parse_hex(type_name, value)?;

            if bytes.len() > 32 {
                return Err(Error::EncodeData(format!("{} value {} out of range", type_name, s)));
            }

            buf[32 - bytes.len()..].copy_from_slice(&bytes);
        }
        Value::String(s) => {
            let n = s
                .parse::<u128>()
                .map_err(|err| Error::EncodeData(format!("{} value {}, {}", type_name, s, err)))?;

            buf[16..].copy_from_slice(&n.to_be_bytes());
        }
        _ => return Err(unexpected(type_name, value)),
    }

    if buf[..32 - bits / 8].iter().any(|b| *b != 0) {
        return Err(Error::EncodeData(format!(
            "{} value {} out of range",
            type_name, value
        )));
    }

    Ok(buf)
}

fn encode_int(type_name: &str, bits: usize, value: &Value) -> Result<[u8; 32]> {
    let n: i128 = match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .ok_or_else(|| Error::EncodeData(format!("{} value {} is not an integer", type_name, n)))?,
        Value::String(s) => s
            .parse::<i128>()
            .map_err(|err| Error::EncodeData(format!("{} value {}, {}", type_name, s, err)))?,
        _ => return Err(unexpected(type_name, value)),
    };

    if bits < 128 {
        let bound = 1i128 << (bits - 1);

        if n < -bound || n >= bound {
            return Err(Error::EncodeData(format!(
                "{} value {} out of range",
                type_name, n
            )));
        }
    }

    let mut buf = if n < 0 { [0xffu8; 32] } else { [0u8; 32] };

    buf[16..].copy_from_slice(&n.to_be_bytes());

    Ok(buf)
}

fn encode_atomic(type_name: &str, value: &Value) -> Result<[u8; 32]> {
    match type_name {
        "string" => match value {
            Value::String(s) => Ok(keccak256(s.as_bytes()).0),
            _ => Err(unexpected(type_name, value)),
        },
        "bool" => match value {
            Value::Bool(b) => {
                let mut buf = [0u8; 32];
                buf[31] = *b as u8;
                Ok(buf)
            }
            _ => Err(unexpected(type_name, value)),
        },
        "address" => {
            let bytes = parse_hex(type_name, value)?;

            if bytes.len() != 20 {
                return Err(Error::EncodeData(format!(
                    "address value must be 20 bytes, got {}",
                    bytes.len()
                )));
            }

            let mut buf = [0u8; 32];
            buf[12..].copy_from_slice(&bytes);
            Ok(buf)
        }
        "bytes" => Ok(keccak256(parse_hex(type_name, value)?).0),
        _ => {
            if let Some(suffix) = type_name.strip_prefix("uint") {
                return encode_uint(type_name, integer_bits(type_name, suffix)?, value);
            }

            if let Some(suffix) = type_name.strip_prefix("int") {
                return encode_int(type_name, integer_bits(type_name, suffix)?, value);
            }

            if let Some(Ok(len)) = type_name.strip_prefix("bytes").map(str::parse::<usize>) {
                let bytes = parse_hex(type_name, value)?;

                if !(1..=32).contains(&len) || bytes.len() != len {
                    return Err(Error::EncodeData(format!(
                        "{} value must be {} bytes, got {}",
                        type_name,
                        len,
                        bytes.len()
                    )));
                }

                let mut buf = [0u8; 32];
                buf[..len].copy_from_slice(&bytes);
                return Ok(buf);
            }

            Err(Error::EncodeData(format!("unsupported type {}", type_name)))
        }
    }
}
