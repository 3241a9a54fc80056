//! The session-aware API client.

use std::sync::Arc;

use sf_inspector_auth::{
    normalize_host, Credential, ExternalAuthority, MemoryStore, NoAuthority, SessionProvider,
    TokenStore,
};
use sf_inspector_client::security::soql;
use sf_inspector_client::{
    AbortHandle, ClientConfig, Error, ErrorKind, RequestSpec, Result, SfTransport, SoapApi,
    SoapRequest,
};
use sf_inspector_xml::{XmlField, XmlMap, XmlValue};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

use crate::events::SessionEvent;
use crate::org::{OrgMetadata, ORG_METADATA_SOQL};
use crate::query::{query_request, QueryOptions, QueryPage};

const EVENT_CAPACITY: usize = 16;

/// Client for one Salesforce org.
///
/// Combines a [`SessionProvider`] with an [`SfTransport`]. Clones share the
/// session, the transport and the event channel.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    host: String,
    provider: SessionProvider,
    transport: SfTransport,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("host", &self.inner.host)
            .field("session", &self.inner.provider.current())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `host` with default configuration, an in-memory
    /// store and no external authority.
    pub fn new(host: &str) -> Result<Self> {
        Self::builder(host).build()
    }

    /// Create a builder for `host` (host name or instance URL).
    pub fn builder(host: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(host)
    }

    /// The normalized host this client was created for.
    pub fn host(&self) -> &str {
        &self.inner.host
    }

    /// The live session, if one was established.
    pub fn current_session(&self) -> Option<Credential> {
        self.inner.provider.current()
    }

    /// The transport configuration.
    pub fn config(&self) -> &ClientConfig {
        self.inner.transport.config()
    }

    /// Receive [`SessionEvent`]s emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Establish the session, taking the token from an OAuth redirect
    /// fragment when one is given.
    ///
    /// Starts a background fetch of the org metadata when it is not cached
    /// yet; that fetch never fails this call.
    #[instrument(skip(self, redirect_fragment), fields(host = %self.inner.host))]
    pub async fn connect(&self, redirect_fragment: Option<&str>) -> Result<Credential> {
        let credential = self
            .inner
            .provider
            .resolve(&self.inner.host, redirect_fragment)
            .await?
            .ok_or_else(session_not_found)?;

        let _ = self.inner.events.send(SessionEvent::Connected {
            host: credential.host().to_string(),
        });
        self.spawn_org_metadata_refresh(credential.host());

        Ok(credential)
    }

    /// Run a SOQL query and return the first page.
    #[instrument(skip(self))]
    pub async fn query(&self, soql: &str, options: &QueryOptions) -> Result<serde_json::Value> {
        self.query_abortable(soql, options, None).await
    }

    /// [`query`](Self::query) that `abort` can cancel while it is in flight.
    pub async fn query_abortable(
        &self,
        soql: &str,
        options: &QueryOptions,
        abort: Option<&AbortHandle>,
    ) -> Result<serde_json::Value> {
        let credential = self.session().await?;
        let spec = query_request(&self.config().rest_prefix(), soql, options);
        self.send_rest(&credential, &spec, abort).await
    }

    /// Run a SOQL query and follow `nextRecordsUrl` until every record was
    /// fetched.
    #[instrument(skip(self))]
    pub async fn query_all(
        &self,
        soql: &str,
        options: &QueryOptions,
    ) -> Result<Vec<serde_json::Value>> {
        let credential = self.session().await?;
        let spec = query_request(&self.config().rest_prefix(), soql, options);
        let mut page = QueryPage::from_value(self.send_rest(&credential, &spec, None).await?)?;
        let mut records = std::mem::take(&mut page.records);

        while let Some(next) = page.next_page().map(str::to_string) {
            debug!(fetched = records.len(), total = page.total_size, "Fetching next page");
            let spec = RequestSpec::get(next);
            page = QueryPage::from_value(self.send_rest(&credential, &spec, None).await?)?;
            records.append(&mut page.records);
        }

        Ok(records)
    }

    /// Run a SOSL search.
    #[instrument(skip(self))]
    pub async fn search(&self, sosl: &str) -> Result<serde_json::Value> {
        let path = format!(
            "{}/search/?q={}",
            self.config().rest_prefix(),
            sf_inspector_client::security::url::encode_param(sosl)
        );
        self.rest(&RequestSpec::get(path)).await
    }

    /// Describe one SObject.
    #[instrument(skip(self))]
    pub async fn describe(&self, object: &str) -> Result<serde_json::Value> {
        if !soql::is_safe_sobject_name(object) {
            return Err(Error::new(ErrorKind::Config(format!(
                "Invalid SObject name: {object}"
            ))));
        }
        let path = format!("{}/sobjects/{object}/describe", self.config().rest_prefix());
        self.rest(&RequestSpec::get(path)).await
    }

    /// List the org's SObjects (describe global).
    #[instrument(skip(self))]
    pub async fn list_objects(&self) -> Result<serde_json::Value> {
        let path = format!("{}/sobjects", self.config().rest_prefix());
        self.rest(&RequestSpec::get(path)).await
    }

    /// Execute an arbitrary REST call.
    pub async fn rest(&self, spec: &RequestSpec) -> Result<serde_json::Value> {
        self.rest_abortable(spec, None).await
    }

    /// [`rest`](Self::rest) that `abort` can cancel while it is in flight.
    pub async fn rest_abortable(
        &self,
        spec: &RequestSpec,
        abort: Option<&AbortHandle>,
    ) -> Result<serde_json::Value> {
        let credential = self.session().await?;
        self.send_rest(&credential, spec, abort).await
    }

    /// Invoke a SOAP method and return its `result`.
    #[instrument(skip(self, args))]
    pub async fn invoke(
        &self,
        api: SoapApi,
        method: &str,
        args: impl Into<XmlValue>,
    ) -> Result<XmlField> {
        self.invoke_request(&SoapRequest::new(api, method, args), None)
            .await
    }

    /// [`invoke`](Self::invoke) with extra SOAP headers (`AllOrNoneHeader`,
    /// `DebuggingHeader`, ...).
    #[instrument(skip(self, args, headers))]
    pub async fn invoke_with_headers(
        &self,
        api: SoapApi,
        method: &str,
        args: impl Into<XmlValue>,
        headers: XmlMap,
    ) -> Result<XmlField> {
        let request = SoapRequest::new(api, method, args).with_headers(headers);
        self.invoke_request(&request, None).await
    }

    /// Send a prepared [`SoapRequest`] and return its `result`.
    pub async fn invoke_request(
        &self,
        request: &SoapRequest,
        abort: Option<&AbortHandle>,
    ) -> Result<XmlField> {
        let credential = self.session().await?;
        let result = self
            .inner
            .transport
            .execute_soap(&credential, request, abort)
            .await;
        self.observe(&credential, result)
    }

    /// Fetch the org metadata and update the cache.
    #[instrument(skip(self))]
    pub async fn refresh_org_metadata(&self) -> Result<OrgMetadata> {
        let credential = self.session().await?;
        let spec = query_request(
            &self.config().rest_prefix(),
            ORG_METADATA_SOQL,
            &QueryOptions::default(),
        );
        let page = QueryPage::from_value(self.send_rest(&credential, &spec, None).await?)?;

        let record = page.records.into_iter().next().ok_or_else(|| {
            Error::new(ErrorKind::Serialization(
                "Organization query returned no rows".to_string(),
            ))
        })?;
        let org: OrgMetadata = serde_json::from_value(record).map_err(|e| {
            Error::with_source(ErrorKind::Serialization(e.to_string()), e)
        })?;

        org.save(self.inner.provider.store().as_ref(), credential.host())?;
        debug!(host = %credential.host(), sandbox = org.is_sandbox, "Org metadata cached");
        Ok(org)
    }

    /// The cached org metadata, if it was fetched before.
    pub fn org_metadata(&self) -> Result<Option<OrgMetadata>> {
        Ok(OrgMetadata::load(
            self.inner.provider.store().as_ref(),
            &self.session_host(),
        )?)
    }

    /// Drop the session and delete its persisted token.
    pub fn logout(&self) -> Result<()> {
        let host = self.session_host();
        self.inner.provider.logout(&host)?;
        let _ = self.inner.events.send(SessionEvent::LoggedOut { host });
        Ok(())
    }

    async fn session(&self) -> Result<Credential> {
        if let Some(credential) = self.inner.provider.current() {
            return Ok(credential);
        }
        self.inner
            .provider
            .resolve(&self.inner.host, None)
            .await?
            .ok_or_else(session_not_found)
    }

    fn session_host(&self) -> String {
        self.inner
            .provider
            .current()
            .map(|c| c.host().to_string())
            .unwrap_or_else(|| self.inner.host.clone())
    }

    async fn send_rest(
        &self,
        credential: &Credential,
        spec: &RequestSpec,
        abort: Option<&AbortHandle>,
    ) -> Result<serde_json::Value> {
        let result = self
            .inner
            .transport
            .execute_rest(credential, spec, abort)
            .await;
        self.observe(credential, result)
    }

    /// Errors pass through unchanged; a rejected session is dropped first.
    fn observe<T>(&self, credential: &Credential, result: Result<T>) -> Result<T> {
        if let Err(Error {
            kind: ErrorKind::Unauthorized(message),
            ..
        }) = &result
        {
            self.reject_session(credential.host(), message);
        }
        result
    }

    fn reject_session(&self, host: &str, message: &str) {
        let provider = &self.inner.provider;

        let persisted = provider.has_persisted_token(host).unwrap_or_else(|err| {
            warn!(host, error = %err, "Could not read token store");
            false
        });
        if let Err(err) = provider.invalidate(host) {
            warn!(host, error = %err, "Could not invalidate session");
        }

        if persisted {
            debug!(host, "Persisted token rejected");
            let _ = self.inner.events.send(SessionEvent::TokenRejected {
                host: host.to_string(),
                message: message.to_string(),
            });
        }
    }

    fn spawn_org_metadata_refresh(&self, host: &str) {
        match OrgMetadata::load(self.inner.provider.store().as_ref(), host) {
            Ok(None) => {}
            Ok(Some(_)) => return,
            Err(err) => {
                warn!(host, error = %err, "Could not read cached org metadata");
                return;
            }
        }

        let client = self.clone();
        tokio::spawn(async move {
            if let Err(err) = client.refresh_org_metadata().await {
                warn!(error = %err, "Could not load org metadata");
            }
        });
    }
}

fn session_not_found() -> Error {
    Error::new(ErrorKind::Unauthorized("Session not found".to_string()))
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    host: String,
    config: ClientConfig,
    store: Option<Arc<dyn TokenStore>>,
    authority: Option<Arc<dyn ExternalAuthority>>,
    durable_invalidation: bool,
}

impl ApiClientBuilder {
    fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            config: ClientConfig::default(),
            store: None,
            authority: None,
            durable_invalidation: false,
        }
    }

    /// Transport settings. Defaults to [`ClientConfig::default`].
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Where tokens and org metadata are persisted. Defaults to memory.
    pub fn with_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Who to ask for a session when none is stored.
    pub fn with_authority(mut self, authority: Arc<dyn ExternalAuthority>) -> Self {
        self.authority = Some(authority);
        self
    }

    /// Also delete the persisted token when the server rejects it.
    pub fn with_durable_invalidation(mut self, durable: bool) -> Self {
        self.durable_invalidation = durable;
        self
    }

    /// Build the client. Fails on an unusable host or transport configuration.
    pub fn build(self) -> Result<ApiClient> {
        let host = normalize_host(&self.host)
            .map_err(|e| Error::with_source(ErrorKind::Config(e.kind.to_string()), e))?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn TokenStore>);
        let authority = self
            .authority
            .unwrap_or_else(|| Arc::new(NoAuthority) as Arc<dyn ExternalAuthority>);
        let provider = SessionProvider::new(store, authority)
            .with_durable_invalidation(self.durable_invalidation);

        let transport = SfTransport::new(self.config)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(ApiClient {
            inner: Arc::new(Inner {
                host,
                provider,
                transport,
                events,
            }),
        })
    }
}
