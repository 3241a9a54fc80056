//! External authorities: sources that can mint a session for a host when
//! no token was handed over or persisted.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::host::normalize_host;

/// A session handed out by an external authority.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorityGrant {
    /// The API host the key is valid for. May differ from the host asked
    /// about (e.g. a lightning host resolves to its API host).
    pub hostname: String,
    /// The session key (bearer token).
    pub key: String,
}

impl std::fmt::Debug for AuthorityGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorityGrant")
            .field("hostname", &self.hostname)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// A source of sessions outside this process.
///
/// Returning `Ok(None)` means the authority has no session for the host;
/// errors are reserved for failures to ask.
#[async_trait]
pub trait ExternalAuthority: Send + Sync {
    /// Look up a session for the normalized `host`.
    async fn lookup(&self, host: &str) -> Result<Option<AuthorityGrant>>;
}

/// An authority that never has a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuthority;

#[async_trait]
impl ExternalAuthority for NoAuthority {
    async fn lookup(&self, _host: &str) -> Result<Option<AuthorityGrant>> {
        Ok(None)
    }
}

/// Grants a fixed token for exactly one instance, typically read from the
/// environment.
#[derive(Clone)]
pub struct EnvAuthority {
    hostname: String,
    access_token: String,
}

impl std::fmt::Debug for EnvAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvAuthority")
            .field("hostname", &self.hostname)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl EnvAuthority {
    /// Create an authority for `instance_url` (host or URL).
    pub fn new(instance_url: &str, access_token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            hostname: normalize_host(instance_url)?,
            access_token: access_token.into(),
        })
    }

    /// Load from environment variables.
    ///
    /// Required:
    /// - `SF_INSTANCE_URL` or `SALESFORCE_INSTANCE_URL`
    /// - `SF_ACCESS_TOKEN` or `SALESFORCE_ACCESS_TOKEN`
    pub fn from_env() -> Result<Self> {
        let instance_url = std::env::var("SF_INSTANCE_URL")
            .or_else(|_| std::env::var("SALESFORCE_INSTANCE_URL"))
            .map_err(|_| Error::new(ErrorKind::EnvVar("SF_INSTANCE_URL".to_string())))?;

        let access_token = std::env::var("SF_ACCESS_TOKEN")
            .or_else(|_| std::env::var("SALESFORCE_ACCESS_TOKEN"))
            .map_err(|_| Error::new(ErrorKind::EnvVar("SF_ACCESS_TOKEN".to_string())))?;

        Self::new(&instance_url, access_token)
    }

    /// The host this authority grants sessions for.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

#[async_trait]
impl ExternalAuthority for EnvAuthority {
    async fn lookup(&self, host: &str) -> Result<Option<AuthorityGrant>> {
        if host != self.hostname {
            return Ok(None);
        }
        Ok(Some(AuthorityGrant {
            hostname: self.hostname.clone(),
            key: self.access_token.clone(),
        }))
    }
}

/// Asks the Salesforce CLI (`sf org display`) for the session of an
/// authenticated org alias or username.
#[derive(Debug, Clone)]
pub struct SfCliAuthority {
    target_org: String,
    program: String,
}

impl SfCliAuthority {
    /// Create an authority for an org alias or username.
    pub fn new(target_org: impl Into<String>) -> Self {
        Self {
            target_org: target_org.into(),
            program: "sf".to_string(),
        }
    }

    /// Use a different CLI executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Run `sf org display` for the target org and return its session,
    /// whatever host the org lives on.
    #[instrument(skip(self), fields(target_org = %self.target_org))]
    pub async fn org_display(&self) -> Result<AuthorityGrant> {
        use tokio::process::Command;

        let output = Command::new(&self.program)
            .args(["org", "display", "--target-org", &self.target_org, "--json"])
            .output()
            .await
            .map_err(|e| Error::new(ErrorKind::SfCli(format!("Failed to run sf CLI: {}", e))))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::new(ErrorKind::SfCli(format!(
                "sf org display failed: {}",
                stderr.trim()
            ))));
        }

        parse_org_display(&output.stdout)
    }
}

#[async_trait]
impl ExternalAuthority for SfCliAuthority {
    async fn lookup(&self, host: &str) -> Result<Option<AuthorityGrant>> {
        let grant = self.org_display().await?;
        if grant.hostname != host {
            debug!(granted = %grant.hostname, "sf CLI org is bound to another host");
        }
        Ok(Some(grant))
    }
}

/// Parse the JSON printed by `sf org display --json`.
pub fn parse_org_display(stdout: &[u8]) -> Result<AuthorityGrant> {
    let json: serde_json::Value = serde_json::from_slice(stdout)?;

    let result = json
        .get("result")
        .ok_or_else(|| Error::new(ErrorKind::SfCli("Missing 'result' in output".to_string())))?;

    let instance_url = result
        .get("instanceUrl")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::new(ErrorKind::SfCli("Missing instanceUrl".to_string())))?;

    let access_token = result
        .get("accessToken")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::new(ErrorKind::SfCli("Missing accessToken".to_string())))?;

    Ok(AuthorityGrant {
        hostname: normalize_host(instance_url)?,
        key: access_token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_authority() {
        assert_eq!(NoAuthority.lookup("acme.my.salesforce.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_env_authority_same_host_only() {
        let authority = EnvAuthority::new("https://acme.my.salesforce.com", "tok").unwrap();

        let grant = authority
            .lookup("acme.my.salesforce.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(grant.hostname, "acme.my.salesforce.com");
        assert_eq!(grant.key, "tok");

        assert_eq!(authority.lookup("other.my.salesforce.com").await.unwrap(), None);
    }

    #[test]
    fn test_env_authority_debug_redacts_token() {
        let authority = EnvAuthority::new("acme.my.salesforce.com", "sekrit").unwrap();
        assert!(!format!("{:?}", authority).contains("sekrit"));
    }

    #[test]
    fn test_parse_org_display() {
        let stdout = br#"{
            "status": 0,
            "result": {
                "id": "00Dxx0000001gPFEAY",
                "apiVersion": "62.0",
                "accessToken": "00Dxx!AQ4AQ",
                "instanceUrl": "https://acme.lightning.force.com",
                "username": "admin@acme.com"
            }
        }"#;
        let grant = parse_org_display(stdout).unwrap();
        assert_eq!(grant.hostname, "acme.my.salesforce.com");
        assert_eq!(grant.key, "00Dxx!AQ4AQ");
    }

    #[test]
    fn test_parse_org_display_missing_fields() {
        let err = parse_org_display(br#"{"status": 1}"#).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SfCli(_)));

        let err = parse_org_display(br#"{"result": {"instanceUrl": "https://a.my.salesforce.com"}}"#)
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SfCli(ref m) if m.contains("accessToken")));

        let err = parse_org_display(b"not json").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Json(_)));
    }

    #[tokio::test]
    async fn test_sf_cli_missing_program_is_an_error() {
        let authority = SfCliAuthority::new("acme").with_program("sf-inspector-no-such-binary");
        let err = authority.lookup("acme.my.salesforce.com").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SfCli(_)));

        let err = authority.org_display().await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SfCli(ref m) if m.contains("Failed to run")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_org_display_needs_no_host() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("sf");
        std::fs::write(
            &script,
            "#!/bin/sh\necho '{\"result\":{\"instanceUrl\":\"https://acme.my.salesforce.com\",\"accessToken\":\"00Dxx!AQ4AQ\"}}'\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let authority = SfCliAuthority::new("acme").with_program(script.to_string_lossy());
        let grant = authority.org_display().await.unwrap();
        assert_eq!(grant.hostname, "acme.my.salesforce.com");
        assert_eq!(grant.key, "00Dxx!AQ4AQ");

        let grant = authority.lookup("other.my.salesforce.com").await.unwrap();
        assert_eq!(grant.map(|g| g.hostname).as_deref(), Some("acme.my.salesforce.com"));
    }
}
