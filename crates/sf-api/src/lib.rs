//! # sf-inspector-api
//!
//! Session-aware client for one Salesforce org.
//!
//! [`ApiClient`] finds a session through the [`SessionProvider`] and runs
//! queries, searches, describes and SOAP calls over the transport. Errors
//! are returned unchanged; when the server rejects the session it is
//! dropped, and a [`SessionEvent::TokenRejected`] is broadcast if the token
//! had been persisted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sf_inspector_api::{ApiClient, QueryOptions};
//! use sf_inspector_auth::{EnvAuthority, FileStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::builder("acme.my.salesforce.com")
//!     .with_store(Arc::new(FileStore::new()?))
//!     .with_authority(Arc::new(EnvAuthority::from_env()?))
//!     .build()?;
//!
//! client.connect(None).await?;
//! let accounts = client
//!     .query_all("SELECT Id, Name FROM Account", &QueryOptions::default())
//!     .await?;
//! println!("{} accounts", accounts.len());
//! # Ok(())
//! # }
//! ```
//!
//! [`SessionProvider`]: sf_inspector_auth::SessionProvider

mod client;
mod events;
mod org;
mod query;

pub use client::{ApiClient, ApiClientBuilder};
pub use events::SessionEvent;
pub use org::OrgMetadata;
pub use query::{QueryOptions, QueryPage};

pub use sf_inspector_client::{AbortHandle, Error, ErrorKind, RequestSpec, Result, SoapApi};
