//! Session discovery and lifetime.
//!
//! [`SessionProvider::resolve`] walks an ordered list of strategies and stops
//! at the first one that yields a credential:
//!
//! 1. an OAuth redirect fragment carrying `access_token` (always wins and is
//!    persisted),
//! 2. the live in-memory session for the same host,
//! 3. a token persisted for the host,
//! 4. the external authority.
//!
//! Concurrent authority lookups for one host share a single in-flight future.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, instrument};

use crate::authority::{AuthorityGrant, ExternalAuthority, NoAuthority};
use crate::credential::Credential;
use crate::error::{Error, ErrorKind, Result};
use crate::fragment::parse_fragment;
use crate::host::normalize_host;
use crate::store::{access_token_key, MemoryStore, TokenStore};

type LookupOutcome = std::result::Result<Option<AuthorityGrant>, ErrorKind>;
type InFlightLookup = Shared<BoxFuture<'static, LookupOutcome>>;

/// Owns the (single) live session and knows how to find a new one.
pub struct SessionProvider {
    store: Arc<dyn TokenStore>,
    authority: Arc<dyn ExternalAuthority>,
    session: RwLock<Option<Credential>>,
    in_flight: Mutex<HashMap<String, InFlightLookup>>,
    durable_invalidation: bool,
}

impl std::fmt::Debug for SessionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionProvider")
            .field("session", &*self.session.read())
            .field("durable_invalidation", &self.durable_invalidation)
            .finish_non_exhaustive()
    }
}

impl Default for SessionProvider {
    fn default() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(NoAuthority))
    }
}

impl SessionProvider {
    /// Create a provider over a store and an authority.
    pub fn new(store: Arc<dyn TokenStore>, authority: Arc<dyn ExternalAuthority>) -> Self {
        Self {
            store,
            authority,
            session: RwLock::new(None),
            in_flight: Mutex::new(HashMap::new()),
            durable_invalidation: false,
        }
    }

    /// When enabled, [`invalidate`](Self::invalidate) also deletes the
    /// persisted token, so the next `resolve` skips straight to the
    /// authority. Disabled by default.
    pub fn with_durable_invalidation(mut self, durable: bool) -> Self {
        self.durable_invalidation = durable;
        self
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// The live session, if any.
    pub fn current(&self) -> Option<Credential> {
        self.session.read().clone()
    }

    /// Find a credential for `host`.
    ///
    /// Returns `Ok(None)` when every strategy came up empty.
    #[instrument(skip(self, redirect_fragment))]
    pub async fn resolve(
        &self,
        host: &str,
        redirect_fragment: Option<&str>,
    ) -> Result<Option<Credential>> {
        let host = normalize_host(host)?;

        if let Some(fragment) = redirect_fragment {
            if let Some(token) = parse_fragment(fragment)? {
                let session_host = match token.instance_url.as_deref() {
                    Some(instance_url) => normalize_host(instance_url)?,
                    None => host.clone(),
                };
                self.store
                    .set(&access_token_key(&session_host), &token.access_token)?;
                debug!(host = %session_host, "session taken from redirect fragment");
                return Ok(Some(
                    self.install(Credential::new(token.access_token, session_host)),
                ));
            }
        }

        if let Some(current) = self.current().filter(|c| c.host() == host) {
            return Ok(Some(current));
        }

        if let Some(token) = self.store.get(&access_token_key(&host))? {
            debug!(host = %host, "session restored from store");
            return Ok(Some(self.install(Credential::new(token, host))));
        }

        match self.lookup_authority(&host).await? {
            Some(grant) => {
                let granted_host = normalize_host(&grant.hostname)?;
                debug!(host = %granted_host, "session granted by authority");
                Ok(Some(self.install(Credential::new(grant.key, granted_host))))
            }
            None => {
                debug!(host = %host, "no session found");
                Ok(None)
            }
        }
    }

    /// Drop the in-memory session for `host`.
    ///
    /// The persisted token survives unless durable invalidation is enabled.
    pub fn invalidate(&self, host: &str) -> Result<()> {
        let host = normalize_host(host)?;
        self.clear_session(&host);
        if self.durable_invalidation {
            self.store.remove(&access_token_key(&host))?;
        }
        Ok(())
    }

    /// Drop the session and delete the persisted token for `host`.
    pub fn logout(&self, host: &str) -> Result<()> {
        let host = normalize_host(host)?;
        self.clear_session(&host);
        self.store.remove(&access_token_key(&host))
    }

    /// Returns true if a token is persisted for `host`.
    pub fn has_persisted_token(&self, host: &str) -> Result<bool> {
        let host = normalize_host(host)?;
        self.store.contains(&access_token_key(&host))
    }

    fn install(&self, credential: Credential) -> Credential {
        *self.session.write() = Some(credential.clone());
        credential
    }

    fn clear_session(&self, host: &str) {
        let mut session = self.session.write();
        if session.as_ref().is_some_and(|c| c.host() == host) {
            *session = None;
        }
    }

    async fn lookup_authority(&self, host: &str) -> Result<Option<AuthorityGrant>> {
        let lookup = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.get(host) {
                Some(existing) => existing.clone(),
                None => {
                    let authority = Arc::clone(&self.authority);
                    let key = host.to_string();
                    let lookup = async move { authority.lookup(&key).await.map_err(|e| e.kind) }
                        .boxed()
                        .shared();
                    in_flight.insert(host.to_string(), lookup.clone());
                    lookup
                }
            }
        };

        let outcome = lookup.clone().await;

        let mut in_flight = self.in_flight.lock();
        if in_flight
            .get(host)
            .is_some_and(|current| current.ptr_eq(&lookup))
        {
            in_flight.remove(host);
        }

        outcome.map_err(Error::new)
    }
}
