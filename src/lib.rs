//! # sf-inspector
//!
//! Connection core for Salesforce inspection tools: session discovery, a
//! REST/SOAP transport and the XML codec behind the SOAP path.
//!
//! ## Security
//!
//! - Tokens are redacted in Debug output
//! - Tracing skips credential parameters
//! - Error messages have access tokens and session ids removed
//!
//! ## Crates
//!
//! - **sf-inspector-xml** - XML tree, `XmlValue` codec and JSON mapping
//! - **sf-inspector-auth** - Credentials, token stores, external authorities, `SessionProvider`
//! - **sf-inspector-client** - REST and SOAP transport with retry and cancellation
//! - **sf-inspector-api** - `ApiClient`: query, search, describe, SOAP invocation, session events
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sf_inspector::{ApiClient, QueryOptions, SfCliAuthority};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::builder("acme.my.salesforce.com")
//!         .with_authority(Arc::new(SfCliAuthority::new("my-org")))
//!         .build()?;
//!     client.connect(None).await?;
//!
//!     let page = client
//!         .query("SELECT Id, Name FROM Account LIMIT 10", &QueryOptions::default())
//!         .await?;
//!     for account in page["records"].as_array().into_iter().flatten() {
//!         println!("{}", account["Name"]);
//!     }
//!     Ok(())
//! }
//! ```

pub use sf_inspector_api as api;
pub use sf_inspector_auth as auth;
pub use sf_inspector_client as client;
pub use sf_inspector_xml as xml;

pub use sf_inspector_api::{ApiClient, ApiClientBuilder, OrgMetadata, QueryOptions, SessionEvent};
pub use sf_inspector_auth::{
    Credential, EnvAuthority, ExternalAuthority, FileStore, MemoryStore, SessionProvider,
    SfCliAuthority, TokenStore,
};
pub use sf_inspector_client::{
    AbortHandle, ClientConfig, Error, ErrorKind, RequestSpec, Result, SfTransport, SoapApi,
};
pub use sf_inspector_xml::{XmlField, XmlMap, XmlValue};
