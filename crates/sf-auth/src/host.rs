//! Instance host normalization.

use url::Url;

use crate::error::{Error, ErrorKind, Result};

const LIGHTNING_DOMAIN: &str = ".lightning.force.";
const CLASSIC_DOMAIN: &str = ".my.salesforce.";
const SECURITY_GATEWAY_SUFFIX: &str = ".mcas.ms";

/// Normalize a host name or instance URL to the API host it stands for.
///
/// Accepts `acme.my.salesforce.com`, `https://acme.my.salesforce.com/path`
/// or `localhost:8080`. Lightning hosts are mapped to their `my.salesforce`
/// counterpart and a trailing security-gateway suffix is removed. A
/// non-default port is kept.
pub fn normalize_host(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::new(ErrorKind::InvalidHost("empty host".to_string())));
    }

    let url = if trimmed.contains("://") {
        Url::parse(trimmed)?
    } else {
        Url::parse(&format!("https://{trimmed}"))?
    };

    let name = url
        .host_str()
        .ok_or_else(|| Error::new(ErrorKind::InvalidHost(trimmed.to_string())))?;

    let mut name = name.replace(LIGHTNING_DOMAIN, CLASSIC_DOMAIN);
    if let Some(stripped) = name.strip_suffix(SECURITY_GATEWAY_SUFFIX) {
        name = stripped.to_string();
    }

    Ok(match url.port() {
        Some(port) => format!("{name}:{port}"),
        None => name,
    })
}
