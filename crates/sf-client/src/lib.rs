//! # sf-inspector-client
//!
//! HTTP transport for the Salesforce REST and SOAP APIs.
//!
//! [`SfTransport`] executes one call with a given [`Credential`] and turns
//! every outcome into either a parsed body or a classified [`Error`]:
//!
//! - REST calls return JSON; SOAP calls return the decoded `result` element
//! - 401 and `INVALID_SESSION_ID` faults become [`ErrorKind::Unauthorized`]
//! - transport failures become [`ErrorKind::Network`] and are the only
//!   errors that are retried
//! - an [`AbortHandle`] cancels a call that has not settled yet
//!
//! ## Example
//!
//! ```rust,no_run
//! use sf_inspector_auth::Credential;
//! use sf_inspector_client::{RequestSpec, SfTransport};
//!
//! # async fn run() -> Result<(), sf_inspector_client::Error> {
//! let transport = SfTransport::default_client()?;
//! let credential = Credential::new("00D...", "acme.my.salesforce.com");
//!
//! let limits = transport
//!     .execute_rest(&credential, &RequestSpec::get("/services/data/v62.0/limits"), None)
//!     .await?;
//! println!("{}", limits["DailyApiRequests"]["Remaining"]);
//! # Ok(())
//! # }
//! ```
//!
//! [`Credential`]: sf_inspector_auth::Credential

mod abort;
mod client;
mod config;
mod error;
mod request;
mod response;
mod retry;
pub mod security;
mod soap;
mod wsdl;

pub use abort::AbortHandle;
pub use client::SfTransport;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ApiFault, Error, ErrorKind, Result};
pub use request::{ApiFamily, RequestBody, RequestMethod, RequestSpec};
pub use response::{classify_rest_response, http_status_line};
pub use retry::{BackoffStrategy, RetryConfig, RetryPolicy};
pub use soap::{build_envelope, parse_soap_response, SoapRequest};
pub use wsdl::{SoapApi, WsdlDescriptor};

/// Default Salesforce API version.
pub const DEFAULT_API_VERSION: &str = "62.0";

/// Client name sent in `Sforce-Call-Options` and `CallOptions`.
pub const DEFAULT_CLIENT_ID: &str = "sf-inspector";

/// User-Agent string for the client.
pub const USER_AGENT: &str = concat!("sf-inspector/", env!("CARGO_PKG_VERSION"));
