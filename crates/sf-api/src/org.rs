//! Cached facts about the connected org.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use sf_inspector_auth::{is_sandbox_key, org_instance_key, trial_expiration_key, TokenStore};

pub(crate) const ORG_METADATA_SOQL: &str =
    "SELECT IsSandbox, InstanceName, TrialExpirationDate FROM Organization";

/// Org facts shown next to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrgMetadata {
    #[serde(rename = "IsSandbox", default)]
    pub is_sandbox: bool,
    /// Instance the org lives on, e.g. `NA135`.
    #[serde(rename = "InstanceName", default)]
    pub instance_name: Option<String>,
    /// Raw `TrialExpirationDate`; `None` for non-trial orgs.
    #[serde(rename = "TrialExpirationDate", default)]
    pub trial_expiration_date: Option<String>,
}

impl OrgMetadata {
    /// The trial expiration as a timestamp.
    ///
    /// Salesforce writes offsets without a colon (`+0000`), so plain RFC 3339
    /// parsing is tried second.
    pub fn trial_expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.trial_expiration_date.as_deref()?;
        DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z")
            .or_else(|_| DateTime::parse_from_rfc3339(raw))
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Read the cached facts for `host`. `None` until they were fetched once.
    pub fn load(store: &dyn TokenStore, host: &str) -> sf_inspector_auth::Result<Option<Self>> {
        let Some(is_sandbox) = store.get(&is_sandbox_key(host))? else {
            return Ok(None);
        };
        Ok(Some(Self {
            is_sandbox: is_sandbox == "true",
            instance_name: store.get(&org_instance_key(host))?,
            trial_expiration_date: store.get(&trial_expiration_key(host))?,
        }))
    }

    /// Cache the facts for `host`. Absent values remove their key.
    pub fn save(&self, store: &dyn TokenStore, host: &str) -> sf_inspector_auth::Result<()> {
        store.set(&is_sandbox_key(host), if self.is_sandbox { "true" } else { "false" })?;
        put_or_remove(store, &org_instance_key(host), self.instance_name.as_deref())?;
        put_or_remove(
            store,
            &trial_expiration_key(host),
            self.trial_expiration_date.as_deref(),
        )
    }
}

fn put_or_remove(
    store: &dyn TokenStore,
    key: &str,
    value: Option<&str>,
) -> sf_inspector_auth::Result<()> {
    match value {
        Some(value) => store.set(key, value),
        None => store.remove(key),
    }
}
