//! Caller-side cancellation of in-flight requests.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, ErrorKind, Result};

/// Aborts the requests it is passed to.
///
/// Cheap to clone; all clones share one cancellation state. Aborting after
/// a request settled has no effect on its result.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    token: CancellationToken,
}

impl AbortHandle {
    /// Create a handle that is not aborted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort every request using this handle that has not settled yet.
    pub fn abort(&self) {
        self.token.cancel();
    }

    /// Returns true once [`abort`](Self::abort) was called.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run `future` unless the handle is aborted first.
    pub async fn run<T, F>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Error::new(ErrorKind::Aborted)),
            result = future => result,
        }
    }
}

/// [`AbortHandle::run`] for an optional handle.
pub(crate) async fn abortable<T, F>(handle: Option<&AbortHandle>, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match handle {
        Some(handle) => handle.run(future).await,
        None => future.await,
    }
}
