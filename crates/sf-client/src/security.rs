//! Guards for caller-supplied values that end up in request paths.
//!
//! ```rust
//! use sf_inspector_client::security::{soql, url};
//!
//! assert!(soql::is_safe_sobject_name("Account"));
//! assert!(!soql::is_safe_sobject_name("Account/../limits"));
//! assert_eq!(url::encode_param("SELECT Id FROM User"), "SELECT%20Id%20FROM%20User");
//! ```

/// Identifier validation.
pub mod soql {
    /// Returns true for `[A-Za-z][A-Za-z0-9_]*`, which covers standard and
    /// custom (`__c`, `__mdt`, namespaced) API names.
    #[must_use]
    pub fn is_safe_field_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {
                chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
            }
            _ => false,
        }
    }

    /// SObject names follow the same rules as field names.
    #[must_use]
    pub fn is_safe_sobject_name(name: &str) -> bool {
        is_safe_field_name(name)
    }
}

/// URL encoding.
pub mod url {
    /// Percent-encode a value for use in a path segment or query parameter.
    #[must_use]
    pub fn encode_param(value: &str) -> String {
        urlencoding::encode(value).into_owned()
    }
}
