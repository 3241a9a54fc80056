//! Error types for sf-auth.
//!
//! Error messages never carry token values.

/// Result type alias for sf-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-auth operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }
}

/// The kind of error that occurred.
///
/// `Clone` so a single authority outcome can be handed to every caller
/// waiting on a coalesced lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// A host name or instance URL that cannot be normalized.
    #[error("Invalid host: {0}")]
    InvalidHost(String),

    /// A redirect fragment that is not valid `application/x-www-form-urlencoded`.
    #[error("Invalid redirect fragment: {0}")]
    InvalidFragment(String),

    /// Token store failure.
    #[error("Token store error: {0}")]
    Store(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),

    /// Salesforce CLI error.
    #[error("sf CLI error: {0}")]
    SfCli(String),

    /// External authority failure.
    #[error("Authority error: {0}")]
    Authority(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<serde_urlencoded::de::Error> for Error {
    fn from(err: serde_urlencoded::de::Error) -> Self {
        Error::with_source(ErrorKind::InvalidFragment(err.to_string()), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidHost(err.to_string()), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        let err = ErrorKind::EnvVar("SF_ACCESS_TOKEN".to_string());
        assert_eq!(
            err.to_string(),
            "Environment variable not set: SF_ACCESS_TOKEN"
        );

        let err = Error::new(ErrorKind::SfCli("org not found".to_string()));
        assert_eq!(err.to_string(), "sf CLI error: org not found");
    }

    #[test]
    fn test_io_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from(io);
        assert!(matches!(err.kind, ErrorKind::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
