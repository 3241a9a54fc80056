//! Error types for sf-client.

/// Result type alias for sf-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for transport and API operations.
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

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns true if the server rejected the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.kind, ErrorKind::Unauthorized(_))
    }

    /// Returns true if the call was aborted by the caller.
    pub fn is_aborted(&self) -> bool {
        matches!(self.kind, ErrorKind::Aborted)
    }

    /// The HTTP status of a protocol error.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Protocol { status, .. } => Some(*status),
            ErrorKind::Unauthorized(_) => Some(401),
            ErrorKind::Forbidden(_) => Some(403),
            _ => None,
        }
    }
}

/// One entry of a Salesforce error payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFault {
    /// `errorCode` (REST) or `faultcode` (SOAP).
    pub code: String,
    pub message: String,
    /// Fields the error refers to, if any.
    pub fields: Vec<String>,
}

impl std::fmt::Display for ApiFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.code.is_empty() {
            write!(f, "{}", self.message)?;
        } else {
            write!(f, "{}: {}", self.code, self.message)?;
        }
        if !self.fields.is_empty() {
            write!(f, " [{}]", self.fields.join(", "))?;
        }
        Ok(())
    }
}

/// The kind of error that occurred.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// The session is missing, expired or revoked (HTTP 401, or a SOAP
    /// `INVALID_SESSION_ID` fault).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The session lacks permission (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// No HTTP response was received: offline, DNS, connect failure or
    /// timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// The caller aborted the request before it settled.
    #[error("Request aborted")]
    Aborted,

    /// The server answered with an error (or an unreadable success).
    #[error("{message}")]
    Protocol {
        status: u16,
        message: String,
        errors: Vec<ApiFault>,
        /// The response body, verbatim.
        raw_body: String,
    },

    /// Session discovery or storage failed before any request was sent.
    #[error("Session error: {0}")]
    Session(String),

    /// Invalid configuration or request.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ErrorKind {
    /// Only failures that never reached the server are retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Network(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // The URL may carry a token-bearing query in some flows.
        let err = err.without_url();
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            "Could not connect to server".to_string()
        } else {
            crate::response::sanitize_error_message(&err.to_string())
        };
        Error::with_source(ErrorKind::Network(message), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::Config(format!("Invalid URL: {}", err)), err)
    }
}

impl From<sf_inspector_xml::XmlError> for Error {
    fn from(err: sf_inspector_xml::XmlError) -> Self {
        Error::with_source(ErrorKind::Serialization(err.to_string()), err)
    }
}

impl From<sf_inspector_auth::Error> for Error {
    fn from(err: sf_inspector_auth::Error) -> Self {
        Error::with_source(ErrorKind::Session(err.kind.to_string()), err)
    }
}
