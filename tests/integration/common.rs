use std::sync::Arc;

use sf_inspector::auth::access_token_key;
use sf_inspector::{ApiClient, ClientConfig, FileStore, TokenStore};
use tempfile::TempDir;
use wiremock::MockServer;

/// A mocked org plus a client whose token store lives in a temp directory.
pub struct MockOrg {
    pub server: MockServer,
    pub store: Arc<FileStore>,
    // Held so the store directory outlives the test.
    _dir: TempDir,
}

impl MockOrg {
    pub async fn start() -> Self {
        let dir = TempDir::new().unwrap();
        Self {
            server: MockServer::start().await,
            store: Arc::new(FileStore::with_path(dir.path())),
            _dir: dir,
        }
    }

    /// `127.0.0.1:<port>`, the normalized host of the mock org.
    pub fn host(&self) -> String {
        self.server.address().to_string()
    }

    pub fn persist_token(&self, token: &str) {
        self.store.set(&access_token_key(&self.host()), token).unwrap();
    }

    pub fn persisted_token(&self) -> Option<String> {
        self.store.get(&access_token_key(&self.host())).unwrap()
    }

    pub fn config() -> ClientConfig {
        ClientConfig::builder()
            .with_scheme("http")
            .without_retry()
            .build()
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::builder(self.host())
            .with_config(Self::config())
            .with_store(self.store.clone())
            .build()
            .unwrap()
    }
}
