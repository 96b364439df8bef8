//! # Single-resolution deferred signal.
//!
//! [`Deferred`] settles exactly once, when [`Deferred::resolve`] is first called.
//! Every clone observes the same resolution; resolving again has no effect and
//! there is no failure path.
//!
//! Backed by [`CancellationToken`], which already provides cheap clones,
//! idempotent firing and an awaitable "fired" future.

use tokio_util::sync::CancellationToken;

/// Single-resolution gate.
///
/// ## Example
/// ```rust
/// use editorvisor::sync::Deferred;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gate = Deferred::new();
/// let waiter = gate.clone();
///
/// gate.resolve();
/// gate.resolve(); // no-op
///
/// waiter.wait().await;
/// assert!(waiter.is_resolved());
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct Deferred {
    token: CancellationToken,
}

impl Deferred {
    /// Creates a pending deferred.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Creates a deferred that is already resolved.
    pub fn resolved() -> Self {
        let d = Self::new();
        d.resolve();
        d
    }

    /// Resolves the deferred. Later calls do nothing.
    #[inline]
    pub fn resolve(&self) {
        self.token.cancel();
    }

    /// Returns `true` once [`resolve`](Self::resolve) has been called.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the deferred is resolved.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn pending_until_resolved() {
        let d = Deferred::new();
        let waiter = d.clone();
        let handle = tokio::spawn(async move { waiter.wait().await });

        tokio::task::yield_now().await;
        assert!(!handle.is_finished());
        assert!(!d.is_resolved());

        d.resolve();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter settles")
            .expect("waiter joins");
    }

    #[tokio::test]
    async fn resolving_twice_is_harmless() {
        let d = Deferred::new();
        d.resolve();
        d.resolve();
        d.wait().await;
        assert!(d.is_resolved());
    }

    #[tokio::test]
    async fn resolved_constructor_does_not_block() {
        Deferred::resolved().wait().await;
    }
}
