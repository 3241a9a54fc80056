//! The dual-protocol transport.

use std::future::Future;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use sf_inspector_auth::Credential;
use sf_inspector_xml::XmlField;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::abort::{abortable, AbortHandle};
use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{ApiFamily, RequestBody, RequestSpec};
use crate::response::classify_rest_response;
use crate::retry::RetryPolicy;
use crate::soap::{build_envelope, parse_soap_response, SoapRequest};

/// Executes REST and SOAP calls against one org with a given credential.
///
/// Holds no session state: every call is handed the credential to use.
#[derive(Debug, Clone)]
pub struct SfTransport {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl SfTransport {
    /// Create a transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Create a transport with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a REST call and return the parsed JSON body.
    #[instrument(
        skip(self, credential, spec, abort),
        fields(host = %credential.host(), method = ?spec.method, path = %spec.path)
    )]
    pub async fn execute_rest(
        &self,
        credential: &Credential,
        spec: &RequestSpec,
        abort: Option<&AbortHandle>,
    ) -> Result<serde_json::Value> {
        self.with_retry(abort, || self.rest_once(credential, spec))
            .await
    }

    /// Execute a SOAP call and return the `result` of `<method>Response`.
    #[instrument(
        skip(self, credential, request, abort),
        fields(host = %credential.host(), api = %request.api, method = %request.method)
    )]
    pub async fn execute_soap(
        &self,
        credential: &Credential,
        request: &SoapRequest,
        abort: Option<&AbortHandle>,
    ) -> Result<XmlField> {
        let wsdl = request.api.wsdl(&self.config.api_version);
        let envelope = build_envelope(&wsdl, credential.token(), request)?;
        let url = Url::parse(&format!(
            "{}{}",
            self.config.base_url(credential.host()),
            wsdl.service_path
        ))?;

        self.with_retry(abort, || self.soap_once(&url, &envelope, &request.method))
            .await
    }

    /// Build the URL of a REST call, adding the cache-busting parameter when
    /// enabled.
    pub fn rest_url(&self, host: &str, path: &str) -> Result<Url> {
        let separator = if path.starts_with('/') { "" } else { "/" };
        let mut url = Url::parse(&format!(
            "{}{}{}",
            self.config.base_url(host),
            separator,
            path
        ))?;
        if self.config.cache_busting {
            url.query_pairs_mut()
                .append_pair("cache", &rand::random::<u64>().to_string());
        }
        Ok(url)
    }

    async fn with_retry<T, F, Fut>(&self, abort: Option<&AbortHandle>, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut policy = self.config.retry.clone().map(RetryPolicy::new);

        loop {
            match abortable(abort, attempt()).await {
                Err(err) if err.is_retryable() => {
                    let Some(delay) = policy.as_mut().and_then(RetryPolicy::next_delay) else {
                        return Err(err);
                    };
                    warn!(
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Request failed, retrying"
                    );
                    abortable(abort, async {
                        tokio::time::sleep(delay).await;
                        Ok(())
                    })
                    .await?;
                }
                settled => return settled,
            }
        }
    }

    async fn rest_once(
        &self,
        credential: &Credential,
        spec: &RequestSpec,
    ) -> Result<serde_json::Value> {
        let url = self.rest_url(credential.host(), &spec.path)?;

        let mut req = self
            .inner
            .request(spec.method.to_reqwest(), url)
            .header(ACCEPT, "application/json")
            .header(
                "Sforce-Call-Options",
                format!("client={}", self.config.client_id),
            );

        req = match spec.api_family {
            ApiFamily::Normal => req.bearer_auth(credential.token()),
            ApiFamily::Bulk => req.header("X-SFDC-Session", credential.token()),
        };

        if let Some(body) = &spec.body {
            req = match body {
                RequestBody::Json(value) => req.json(value),
                RequestBody::Raw { content_type, body } => req
                    .header(CONTENT_TYPE, content_type.as_str())
                    .body(body.clone()),
            };
        }

        for (name, value) in &spec.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if self.config.enable_tracing {
            debug!("Sending REST request");
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if self.config.enable_tracing {
            if (200..300).contains(&status) {
                debug!(status, bytes = body.len(), "Response received");
            } else {
                info!(status, bytes = body.len(), "Non-success response");
            }
        }

        classify_rest_response(status, &body)
    }

    async fn soap_once(&self, url: &Url, envelope: &str, method: &str) -> Result<XmlField> {
        let req = self
            .inner
            .post(url.clone())
            .header(CONTENT_TYPE, "text/xml")
            .header("SOAPAction", "\"\"")
            .header("CallOptions", format!("client:{}", self.config.client_id))
            .body(envelope.to_string());

        if self.config.enable_tracing {
            debug!("Sending SOAP request");
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if self.config.enable_tracing {
            if status == 200 {
                debug!(status, bytes = body.len(), "Response received");
            } else {
                info!(status, bytes = body.len(), "SOAP fault or HTTP error");
            }
        }

        parse_soap_response(status, &body, method)
    }
}
