//! # sf-xml
//!
//! Schema-less conversion between an in-memory [`XmlValue`] tree and the XML
//! fragments exchanged with Salesforce SOAP endpoints.
//!
//! The codec is deliberately untyped: SOAP responses are decoded into nested
//! maps keyed by local element name, and request arguments are encoded from
//! the same shape. Two reserved keys give a node more than a plain value:
//!
//! - `$xsi:type` becomes an `xsi:type` attribute (polymorphic sObject values)
//! - `_` sets the text (or nil) of the element that owns the map
//!
//! ## Example
//!
//! ```rust
//! use sf_inspector_xml::{decode, encode, parse, XmlMap, XmlValue};
//!
//! let value = XmlValue::from(
//!     XmlMap::new()
//!         .with("queryString", "SELECT Id FROM Account")
//!         .with("batchSize", XmlValue::Null),
//! );
//!
//! let xml = encode(
//!     "query",
//!     r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#,
//!     &value,
//! )
//! .unwrap();
//!
//! let root = parse(&xml).unwrap();
//! assert_eq!(decode(&root).unwrap(), value);
//! ```

mod decode;
mod encode;
mod error;
mod json;
mod tree;
mod value;

pub use decode::decode;
pub use encode::encode;
pub use error::{Result, XmlError};
pub use tree::{parse, XmlAttribute, XmlElement, XmlNode};
pub use value::{XmlField, XmlMap, XmlValue};

/// Namespace URI of the XML Schema-Instance attributes (`xsi:nil`, `xsi:type`).
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Reserved map key carrying an `xsi:type` discriminator.
pub const TYPE_KEY: &str = "$xsi:type";

/// Reserved map key carrying the text (or nil marker) of the owning element.
pub const TEXT_KEY: &str = "_";
