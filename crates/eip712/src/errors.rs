//! Error types and utilities.

/// Fieldless classification of [`Error`], stable across [`Error::wrap`] calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidJson,
    InvalidRequest,
    InvalidType,
    InvalidChainId,
    InternalFault,
    EncodeData,
    Io,
    SerdeJson,
}

/// cosmos-eip712 error variants.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input bytes are not JSON, or not a JSON object at top level.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The payload does not have the expected structure.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid type: {0}")]
    InvalidType(String),

    #[error("invalid chainID: {0}")]
    InvalidChainId(String),

    #[error("internal fault: {0}")]
    InternalFault(String),

    /// The typed data can't be hashed against its own schema.
    #[error("eip712 encode data: {0}")]
    EncodeData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidJson(_) => ErrorKind::InvalidJson,
            Error::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Error::InvalidType(_) => ErrorKind::InvalidType,
            Error::InvalidChainId(_) => ErrorKind::InvalidChainId,
            Error::InternalFault(_) => ErrorKind::InternalFault,
            Error::EncodeData(_) => ErrorKind::EncodeData,
            Error::Io(_) => ErrorKind::Io,
            Error::SerdeJson(_) => ErrorKind::SerdeJson,
        }
    }

    /// Prefix the error message with `context`, keeping the error kind.
    ///
    /// `Io` and `SerdeJson` wrap foreign errors and are returned unchanged.
    pub fn wrap<C: std::fmt::Display>(self, context: C) -> Self {
        match self {
            Error::InvalidJson(msg) => Error::InvalidJson(format!("{}: {}", context, msg)),
            Error::InvalidRequest(msg) => Error::InvalidRequest(format!("{}: {}", context, msg)),
            Error::InvalidType(msg) => Error::InvalidType(format!("{}: {}", context, msg)),
            Error::InvalidChainId(msg) => Error::InvalidChainId(format!("{}: {}", context, msg)),
            Error::InternalFault(msg) => Error::InternalFault(format!("{}: {}", context, msg)),
            Error::EncodeData(msg) => Error::EncodeData(format!("{}: {}", context, msg)),
            err => err,
        }
    }
}

/// Result type for cosmos-eip712.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_keeps_kind() {
        let err = Error::InvalidRequest("no messages found".to_owned())
            .wrap("failed to flatten payload JSON messages");

        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(
            err.to_string(),
            "invalid request: failed to flatten payload JSON messages: no messages found"
        );
    }

    #[test]
    fn test_wrap_foreign() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();

        assert_eq!(err.wrap("context").kind(), ErrorKind::SerdeJson);
    }
}
