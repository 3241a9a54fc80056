//! OAuth implicit-grant redirect fragments.

use std::collections::HashMap;

use crate::error::Result;

/// Token material carried by a redirect fragment such as
/// `#access_token=...&instance_url=https%3A%2F%2Facme.my.salesforce.com`.
#[derive(Clone, PartialEq, Eq)]
pub struct FragmentToken {
    /// The decoded access token.
    pub access_token: String,
    /// The `instance_url` parameter, if present (still carrying its scheme).
    pub instance_url: Option<String>,
}

impl std::fmt::Debug for FragmentToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentToken")
            .field("access_token", &"[REDACTED]")
            .field("instance_url", &self.instance_url)
            .finish()
    }
}

/// Extract the token from a redirect fragment.
///
/// A leading `#` is optional. Returns `Ok(None)` when the fragment has no
/// non-empty `access_token` parameter.
pub fn parse_fragment(fragment: &str) -> Result<Option<FragmentToken>> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    if fragment.is_empty() {
        return Ok(None);
    }

    let mut params: HashMap<String, String> = serde_urlencoded::from_str(fragment)?;
    let access_token = match params.remove("access_token") {
        Some(token) if !token.is_empty() => token,
        _ => return Ok(None),
    };
    let instance_url = params.remove("instance_url").filter(|url| !url.is_empty());

    Ok(Some(FragmentToken {
        access_token,
        instance_url,
    }))
}
