//! # sf-auth
//!
//! Session discovery for Salesforce inspection tools.
//!
//! A [`SessionProvider`] owns at most one live [`Credential`] and finds a new
//! one through ordered strategies: an OAuth redirect fragment, the live
//! session, a token persisted in a [`TokenStore`], and finally an
//! [`ExternalAuthority`] such as the `sf` CLI.
//!
//! ## Security
//!
//! - Tokens are redacted in Debug output
//! - Tracing skips credential parameters
//! - File-backed tokens are written with `0600` permissions on Unix
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sf_inspector_auth::{FileStore, SessionProvider, SfCliAuthority};
//!
//! # async fn example() -> Result<(), sf_inspector_auth::Error> {
//! let provider = SessionProvider::new(
//!     Arc::new(FileStore::new()?),
//!     Arc::new(SfCliAuthority::new("my-org")),
//! );
//!
//! if let Some(credential) = provider.resolve("acme.lightning.force.com", None).await? {
//!     println!("session for {}", credential.host());
//! }
//! # Ok(())
//! # }
//! ```

mod authority;
mod credential;
mod error;
mod fragment;
mod host;
mod provider;
mod store;

pub use authority::{
    parse_org_display, AuthorityGrant, EnvAuthority, ExternalAuthority, NoAuthority,
    SfCliAuthority,
};
pub use credential::Credential;
pub use error::{Error, ErrorKind, Result};
pub use fragment::{parse_fragment, FragmentToken};
pub use host::normalize_host;
pub use provider::SessionProvider;
pub use store::{
    access_token_key, default_store_dir, is_sandbox_key, org_instance_key, trial_expiration_key,
    FileStore, MemoryStore, TokenStore,
};
