//! Persistent key-value storage for tokens and per-org metadata.
//!
//! Keys are host-scoped strings (`"<host>_access_token"`, ...); see the key
//! helpers at the bottom of this module.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

/// Trait for key-value store implementations.
pub trait TokenStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Check if a value exists.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Process-local store, mostly useful in tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.values.read().contains_key(key))
    }
}

/// File-based store: one JSON document per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store under the default directory (`~/.sf-inspector/store/`).
    pub fn new() -> Result<Self> {
        Ok(Self {
            base_path: default_store_dir()?,
        })
    }

    /// Create a store under a custom directory.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            base_path: path.as_ref().to_path_buf(),
        }
    }

    /// The directory holding the value files.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn value_path(&self, key: &str) -> PathBuf {
        // Hosts may carry a port; keep file names portable.
        let safe_key = key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect::<String>();

        self.base_path.join(format!("{}.json", safe_key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.base_path.exists() {
            std::fs::create_dir_all(&self.base_path)?;
        }
        Ok(())
    }
}

impl TokenStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let json = std::fs::read_to_string(&path)?;
        let stored: StoredValue = serde_json::from_str(&json)?;
        if stored.key != key {
            return Err(Error::new(ErrorKind::Store(format!(
                "file {} belongs to a different key",
                path.display()
            ))));
        }
        Ok(Some(stored.value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;

        let path = self.value_path(key);
        let stored = StoredValue {
            key: key.to_string(),
            value: value.to_string(),
            stored_at: chrono::Utc::now(),
        };

        let json = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.value_path(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.value_path(key).exists())
    }
}

/// Value with storage metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredValue {
    key: String,
    value: String,
    stored_at: chrono::DateTime<chrono::Utc>,
}

/// Get the default store directory.
pub fn default_store_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| Error::new(ErrorKind::Config("Could not find home directory".to_string())))?;

    Ok(home.join(".sf-inspector").join("store"))
}

/// `"<host>_access_token"`
pub fn access_token_key(host: &str) -> String {
    format!("{host}_access_token")
}

/// `"<host>_isSandbox"`
pub fn is_sandbox_key(host: &str) -> String {
    format!("{host}_isSandbox")
}

/// `"<host>_orgInstance"`
pub fn org_instance_key(host: &str) -> String {
    format!("{host}_orgInstance")
}

/// `"<host>_trialExpirationDate"`
pub fn trial_expiration_key(host: &str) -> String {
    format!("{host}_trialExpirationDate")
}
