//! The bearer credential of a live session.

/// An opaque bearer token bound to the host it was issued for.
///
/// Immutable: a refresh produces a new value. The token is redacted in
/// `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    host: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("host", &self.host)
            .finish()
    }
}

impl Credential {
    /// Create a credential. `host` is expected to be normalized already.
    pub fn new(token: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            host: host.into(),
        }
    }

    /// The bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The instance host (`name[:port]`, no scheme).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns true if both parts are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.token.is_empty() && !self.host.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let cred = Credential::new("00Dxx0000001gPF!AQ4AQSecret", "acme.my.salesforce.com");
        let debug = format!("{:?}", cred);
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("acme.my.salesforce.com"));
        assert!(!debug.contains("Secret"));
    }

    #[test]
    fn test_is_valid() {
        assert!(Credential::new("t", "h").is_valid());
        assert!(!Credential::new("", "h").is_valid());
    }
}
