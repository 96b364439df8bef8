//! # Lifecycle operators.
//!
//! [`LifecycleOperators`] is the seam between the semaphore and the resource it
//! serializes. The semaphore decides *when* each operator runs; the operators
//! decide *what* mounting and unmounting mean.

use async_trait::async_trait;

use super::MountPoint;
use crate::error::LifecycleError;

/// Arguments passed to [`LifecycleOperators::after_mount`].
#[derive(Debug)]
pub struct MountContext<'a, R> {
    /// Mount point the result is attached to.
    pub element: &'a MountPoint,
    /// Result returned by the mount operator.
    pub mount_result: &'a R,
}

/// Arguments passed to [`LifecycleOperators::unmount`].
#[derive(Debug)]
pub struct UnmountContext<'a, R> {
    /// Mount point the result is attached to.
    pub element: &'a MountPoint,
    /// Current value of the semaphore (may have been hot-swapped since mount).
    pub mount_result: &'a R,
}

/// Produces and disposes of the resource guarded by a semaphore.
///
/// Errors are logged by the semaphore and never propagated; a failing
/// operator cannot leave the mount point blocked.
#[async_trait]
pub trait LifecycleOperators<R>: Send + Sync + 'static
where
    R: Send + Sync + 'static,
{
    /// Creates the resource.
    async fn mount(&self) -> Result<R, LifecycleError>;

    /// Disposes of the resource. Called at most once, after `mount` settled.
    async fn unmount(&self, ctx: UnmountContext<'_, R>) -> Result<(), LifecycleError>;

    /// Runs after a successful mount, before the semaphore waits for release.
    async fn after_mount(&self, _ctx: MountContext<'_, R>) -> Result<(), LifecycleError> {
        Ok(())
    }
}
