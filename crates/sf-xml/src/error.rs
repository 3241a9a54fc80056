//! Error types for sf-xml.

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, XmlError>;

/// Errors raised while encoding, parsing or decoding XML.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlError {
    /// The underlying writer failed.
    #[error("XML write error: {0}")]
    Write(String),

    /// The document is not well-formed.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// A child node that is neither character data nor an element.
    #[error("Unexpected {0} node in XML payload")]
    UnexpectedNode(&'static str),

    /// The document has no root element.
    #[error("XML document has no root element")]
    MissingRoot,

    /// A `$xsi:type` entry whose value is not a scalar.
    #[error("Value of '{0}' must be a scalar")]
    InvalidTypeTag(String),

    /// A `_` entry whose value is neither a scalar nor nil.
    #[error("Inline text of <{0}> must be a scalar or nil")]
    InvalidInlineValue(String),

    /// A JSON value that has no XML representation.
    #[error("Cannot convert JSON to XML: {0}")]
    UnsupportedJson(String),
}
