//! Structured cancellation for the requests issued on behalf of one click.

use std::future::Future;

use ogc_common::{DiscoveryError, DiscoveryResult};
use tokio_util::sync::CancellationToken;

/// Owns a cancellation token. Cancelling a scope cancels every child scope
/// and every query carrying one of their tokens. A scope cancels itself when
/// dropped.
#[derive(Debug, Default)]
pub struct CancellationScope {
    token: CancellationToken,
}

impl CancellationScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A nested scope, cancelled together with this one.
    pub fn child(&self) -> CancellationScope {
        CancellationScope {
            token: self.token.child_token(),
        }
    }

    /// Token to attach to a query issued inside this scope.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drive `fut` until it completes or the scope is cancelled.
    pub async fn run<F>(&self, fut: F) -> DiscoveryResult<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(DiscoveryError::Cancelled),
            out = fut => Ok(out),
        }
    }
}

impl Drop for CancellationScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
