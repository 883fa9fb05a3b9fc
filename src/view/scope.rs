//! Liveness scope tied to a view's lifetime.

use std::sync::{Arc, RwLock};

use tokio_util::sync::CancellationToken;

/// Live from creation until [`ViewScope::teardown`] is called (or the guard
/// returned by [`ViewScope::guard`] is dropped).
///
/// Clones share one liveness flag. Teardown waits for any work running under
/// [`ViewScope::while_live`] to finish, and no such work starts afterwards.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    token: CancellationToken,
    gate: Arc<RwLock<()>>,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Mark the view as gone. Idempotent.
    ///
    /// Must not be called from inside [`ViewScope::while_live`].
    pub fn teardown(&self) {
        let _gate = self.gate.write().unwrap_or_else(|e| e.into_inner());
        self.token.cancel();
    }

    /// Run `f` only if the scope is live, holding off teardown until it
    /// returns.
    pub fn while_live<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        let _gate = self.gate.read().unwrap_or_else(|e| e.into_inner());
        if self.token.is_cancelled() {
            return None;
        }
        Some(f())
    }

    /// A scope that is torn down with this one but can also be torn down on
    /// its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            gate: self.gate.clone(),
        }
    }

    /// Tear the scope down when the returned guard is dropped.
    pub fn guard(&self) -> ScopeGuard {
        ScopeGuard(self.clone())
    }

    /// Resolves once the scope is torn down.
    pub async fn torn_down(&self) {
        self.token.cancelled().await;
    }
}

/// Tears its scope down on drop.
#[derive(Debug)]
#[must_use = "the scope is torn down as soon as the guard is dropped"]
pub struct ScopeGuard(ViewScope);

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.0.teardown();
    }
}
