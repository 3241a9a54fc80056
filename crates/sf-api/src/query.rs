//! SOQL query options and result pages.

use serde::Deserialize;

use sf_inspector_client::security::url::encode_param;
use sf_inspector_client::{Error, ErrorKind, RequestSpec, Result};

/// Options for query execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Query the Tooling API instead of the data API.
    pub use_tooling: bool,
    /// Include deleted and archived records (`queryAll` endpoint).
    pub include_deleted: bool,
    /// Page size hint (`Sforce-Query-Options: batchSize=<n>`).
    pub batch_size: Option<u32>,
}

impl QueryOptions {
    /// Options that query the Tooling API.
    pub fn tooling() -> Self {
        Self {
            use_tooling: true,
            ..Self::default()
        }
    }

    /// Options that also return deleted and archived records.
    pub fn include_deleted() -> Self {
        Self {
            include_deleted: true,
            ..Self::default()
        }
    }

    /// Ask the server for pages of about `size` records.
    pub fn with_batch_size(mut self, size: u32) -> Self {
        self.batch_size = Some(size);
        self
    }
}

/// Build the request for the first page of `soql`.
pub(crate) fn query_request(rest_prefix: &str, soql: &str, options: &QueryOptions) -> RequestSpec {
    let tooling = if options.use_tooling { "tooling/" } else { "" };
    let endpoint = if options.include_deleted {
        "queryAll"
    } else {
        "query"
    };
    let spec = RequestSpec::get(format!(
        "{rest_prefix}/{tooling}{endpoint}/?q={}",
        encode_param(soql)
    ));
    match options.batch_size {
        Some(size) => spec.header("Sforce-Query-Options", format!("batchSize={size}")),
        None => spec,
    }
}

/// One page of a query response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPage {
    /// Number of records matching the query, across all pages.
    #[serde(default)]
    pub total_size: u64,
    #[serde(default = "default_done")]
    pub done: bool,
    /// Path of the next page when `done` is false.
    #[serde(default)]
    pub next_records_url: Option<String>,
    #[serde(default)]
    pub records: Vec<serde_json::Value>,
}

fn default_done() -> bool {
    true
}

impl QueryPage {
    pub(crate) fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            Error::with_source(
                ErrorKind::Serialization(format!("Unexpected query response: {e}")),
                e,
            )
        })
    }

    /// The path of the next page, if there is one.
    pub fn next_page(&self) -> Option<&str> {
        if self.done {
            return None;
        }
        self.next_records_url.as_deref()
    }
}
