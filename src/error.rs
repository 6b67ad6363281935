use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of one of the exposed operations.
///
/// Every variant carries the message that ends up in both the command response and the
/// outbound notification, so operators see the same text in either place.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    DuplicateKey(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MalformedPayload(String),

    #[error("unsupported protocol '{0}'")]
    UnsupportedProtocol(String),

    #[error("stored code for {device}.{action} has no protocol field")]
    MissingProtocol { device: String, action: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Stable, machine-readable code for the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::DuplicateKey(_) => "duplicate_key",
            Error::NotFound(_) => "not_found",
            Error::MalformedPayload(_) => "malformed_payload",
            Error::UnsupportedProtocol(_) => "unsupported_protocol",
            Error::MissingProtocol { .. } => "missing_protocol",
            Error::Storage(_) => "storage",
            Error::Transport(_) => "transport",
        }
    }

    /// Converts an error coming back from the database worker.
    ///
    /// Typed errors raised inside a DB task are recovered as-is; anything else is a
    /// storage failure.
    pub fn from_storage(err: anyhow::Error) -> Self {
        match err.downcast::<Error>() {
            Ok(typed) => typed,
            Err(other) => Error::Storage(format!("{other:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_from_storage_recovers_typed_error() {
        let err = anyhow::Error::new(Error::DuplicateKey("dup".into()));
        let converted = Error::from_storage(err);
        assert!(matches!(converted, Error::DuplicateKey(ref msg) if msg == "dup"));
    }

    #[test]
    fn test_from_storage_wraps_other_errors() {
        let err: anyhow::Result<()> =
            Err(anyhow::anyhow!("disk full")).context("failed to insert IR code");
        let converted = Error::from_storage(err.unwrap_err());
        assert_eq!(converted.kind(), "storage");
        assert!(converted.to_string().contains("disk full"));
    }
}
