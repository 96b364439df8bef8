//! # LifecycleSemaphore: per-mount-point serialization of mount/unmount.
//!
//! A rendering layer may ask for "a resource on mount point M" and "no resource
//! on M" many times in quick, overlapping succession. Each request pair becomes
//! one semaphore: constructing it locks M, [`release`](LifecycleSemaphore::release)
//! unlocks it. Semaphores on the same mount point form a chain through the
//! process-wide registry, so at most one of them is ever mounted.
//!
//! ## Architecture
//! ```text
//! new(M, ops) ─► registry::occupy(M)  (synchronous publish)
//!                   │ prior occupancy
//!                   ▼
//!        spawn ─► wait prior.vacated
//!                   ├─ released already? ──────────────┐ (mount never runs)
//!                   ├─► ops.mount() ─► unsafe_set_value  │
//!                   ├─► ops.after_mount()                │
//!                   ▼                                    ▼
//!                wait release_gate ◄────────────── release()
//!                   ├─► registry::vacate(M)   (only if still ours)
//!                   └─► vacated.resolve()     (wakes the successor)
//!
//! release() ─► mount started? ─ yes ─► spawn: wait mount settled
//!                   │                          ├─► ops.unmount()
//!                   │                          ├─► clear value
//!                   │                          └─► release_gate.resolve()
//!                   └─ no ──► release_gate.resolve()
//! ```
//!
//! ## Rules
//! - Operations on one mount point are **totally ordered** by construction order.
//! - A release issued before the semaphore's turn means the mount operator
//!   **never** runs; everything between the first and last request is skipped.
//! - A release issued after mount began runs unmount **exactly once**, after
//!   mount (and `after_mount`) settled.
//! - Operator failures and panics are logged (`Semaphore mounting error:` /
//!   `Semaphore unmounting error:`) and swallowed; the mount point is always
//!   handed on.
//! - Construction and `release` must happen inside a tokio runtime.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::FutureExt;

use super::operators::{LifecycleOperators, MountContext, UnmountContext};
use super::registry::{self, Occupancy};
use super::state::{LifecycleState, Transition};
use super::MountPoint;
use crate::error::LifecycleError;
use crate::sync::{Deferred, Once};

type Callback<R> = Box<dyn FnOnce(R) + Send>;
type ReleaseFn = Box<dyn FnOnce() + Send>;

/// State guarded by one lock so that value, queue and phase change together.
struct Slot<R> {
    state: LifecycleState,
    value: Option<R>,
    pending: Vec<Callback<R>>,
}

struct Inner<R> {
    element: MountPoint,
    operators: Arc<dyn LifecycleOperators<R>>,
    slot: Mutex<Slot<R>>,
    /// Opened by `release()`; keeps the occupancy alive until then.
    release_gate: Deferred,
    /// Resolved once mount and after-mount returned.
    mount_settled: Deferred,
    /// Resolved once this semaphore left the mount point.
    vacated: Deferred,
}

/// Serializes mount/unmount of one resource on one [`MountPoint`].
///
/// Cloning yields another handle to the same semaphore; all handles share one
/// release trigger.
pub struct LifecycleSemaphore<R> {
    inner: Arc<Inner<R>>,
    release: Arc<Once<ReleaseFn>>,
}

/// Non-owning handle to a [`LifecycleSemaphore`].
pub struct WeakSemaphore<R> {
    inner: Weak<Inner<R>>,
    release: Weak<Once<ReleaseFn>>,
}

impl<R> LifecycleSemaphore<R>
where
    R: Clone + Send + Sync + 'static,
{
    /// Locks `element` and schedules `operators.mount()` for when the previous
    /// occupant has vacated it.
    pub fn new<O>(element: MountPoint, operators: O) -> Self
    where
        O: LifecycleOperators<R>,
    {
        Self::with_operators(element, Arc::new(operators))
    }

    /// Same as [`new`](Self::new) for already shared operators.
    pub fn with_operators(element: MountPoint, operators: Arc<dyn LifecycleOperators<R>>) -> Self {
        let (prior, occupancy) = registry::occupy(&element);

        let inner = Arc::new(Inner {
            element,
            operators,
            slot: Mutex::new(Slot {
                state: LifecycleState::AwaitingPriorOccupant,
                value: None,
                pending: Vec::new(),
            }),
            release_gate: Deferred::new(),
            mount_settled: Deferred::new(),
            vacated: occupancy.vacated().clone(),
        });

        tokio::spawn(Arc::clone(&inner).occupy(prior, occupancy));

        let me = Arc::clone(&inner);
        let release: ReleaseFn = Box::new(move || me.release());

        Self {
            inner,
            release: Arc::new(Once::new(release)),
        }
    }

    /// The mounted result, if mount succeeded and release has not completed.
    pub fn value(&self) -> Option<R> {
        self.inner.lock().value.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.inner.lock().state
    }

    /// The mount point this semaphore locks.
    pub fn element(&self) -> &MountPoint {
        &self.inner.element
    }

    /// Stores `value` without going through the lock chain and flushes every
    /// queued [`run_after_mount`](Self::run_after_mount) callback with it.
    ///
    /// Used by the mount chain itself and by crash recovery to hot-swap a
    /// restarted resource. Ignored once the semaphore is released.
    pub fn unsafe_set_value(&self, value: R) {
        self.inner.set_value(value);
    }

    /// Runs `callback` with the mounted value: immediately if it is already
    /// set, otherwise the first time it becomes set. Callbacks fire in
    /// registration order.
    pub fn run_after_mount<F>(&self, callback: F)
    where
        F: FnOnce(R) + Send + 'static,
    {
        let mut slot = self.inner.lock();
        match slot.value.clone() {
            Some(value) => {
                drop(slot);
                invoke(callback, value);
            }
            None => slot.pending.push(Box::new(callback)),
        }
    }

    /// Releases the mount point. Only the first call has an effect.
    pub fn release(&self) {
        self.release.call();
    }

    /// Returns `true` once [`release`](Self::release) has been called.
    pub fn is_release_requested(&self) -> bool {
        self.release.is_called()
    }

    /// Waits until this semaphore has fully left its mount point.
    pub async fn released(&self) {
        self.inner.vacated.wait().await;
    }

    /// Creates a non-owning handle.
    pub fn downgrade(&self) -> WeakSemaphore<R> {
        WeakSemaphore {
            inner: Arc::downgrade(&self.inner),
            release: Arc::downgrade(&self.release),
        }
    }
}

impl<R> Inner<R>
where
    R: Clone + Send + Sync + 'static,
{
    fn lock(&self) -> MutexGuard<'_, Slot<R>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn advance(&self, input: Transition) -> Option<LifecycleState> {
        let mut slot = self.lock();
        let next = slot.state.next(input)?;
        slot.state = next;
        Some(next)
    }

    fn set_value(&self, value: R) {
        let pending = {
            let mut slot = self.lock();
            if slot.state == LifecycleState::Released {
                return;
            }
            slot.value = Some(value.clone());
            std::mem::take(&mut slot.pending)
        };
        for callback in pending {
            invoke(callback, value.clone());
        }
    }

    /// Occupancy chain: wait for the predecessor, mount, hold until released.
    async fn occupy(self: Arc<Self>, prior: Deferred, occupancy: Occupancy) {
        prior.wait().await;

        if self.advance(Transition::PriorVacated) == Some(LifecycleState::Mounting) {
            self.mount().await;
            self.mount_settled.resolve();
        } else {
            tracing::debug!(element = %self.element, "released before its turn; mount skipped");
        }

        self.release_gate.wait().await;
        registry::vacate(&self.element, &occupancy);
        occupancy.vacated().resolve();
    }

    async fn mount(&self) {
        let mounted = AssertUnwindSafe(self.operators.mount())
            .catch_unwind()
            .await
            .unwrap_or_else(|p| Err(LifecycleError::from_panic(p)));

        let result = match mounted {
            Ok(result) => result,
            Err(error) => {
                self.advance(Transition::MountSettled);
                tracing::error!(
                    element = %self.element,
                    label = error.as_label(),
                    %error,
                    "Semaphore mounting error:"
                );
                return;
            }
        };

        self.set_value(result.clone());
        self.advance(Transition::MountSettled);

        let ctx = MountContext {
            element: &self.element,
            mount_result: &result,
        };
        let after = AssertUnwindSafe(self.operators.after_mount(ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|p| Err(LifecycleError::from_panic(p)));

        if let Err(error) = after {
            tracing::error!(
                element = %self.element,
                label = error.as_label(),
                %error,
                "Semaphore mounting error:"
            );
        }
    }

    fn release(self: Arc<Self>) {
        match self.advance(Transition::ReleaseRequested) {
            Some(state) if state.mount_started() => {
                tokio::spawn(self.unmount());
            }
            // never mounted: hand the mount point on right away
            _ => {
                {
                    let mut slot = self.lock();
                    slot.value = None;
                    slot.pending.clear();
                }
                self.release_gate.resolve();
            }
        }
    }

    async fn unmount(self: Arc<Self>) {
        self.mount_settled.wait().await;

        let current = self.lock().value.clone();
        if let Some(result) = current {
            let ctx = UnmountContext {
                element: &self.element,
                mount_result: &result,
            };
            let unmounted = AssertUnwindSafe(self.operators.unmount(ctx))
                .catch_unwind()
                .await
                .unwrap_or_else(|p| Err(LifecycleError::from_panic(p)));

            if let Err(error) = unmounted {
                tracing::error!(
                    element = %self.element,
                    label = error.as_label(),
                    %error,
                    "Semaphore unmounting error:"
                );
            }
        }

        {
            let mut slot = self.lock();
            slot.value = None;
            slot.pending.clear();
            if let Some(next) = slot.state.next(Transition::UnmountSettled) {
                slot.state = next;
            }
        }
        self.release_gate.resolve();
    }
}

/// Runs a mount callback, isolating panics.
fn invoke<R, F>(callback: F, value: R)
where
    F: FnOnce(R),
{
    if std::panic::catch_unwind(AssertUnwindSafe(|| callback(value))).is_err() {
        tracing::error!("mount callback panicked");
    }
}

impl<R> WeakSemaphore<R> {
    /// Upgrades to a full handle while the semaphore is alive.
    pub fn upgrade(&self) -> Option<LifecycleSemaphore<R>> {
        Some(LifecycleSemaphore {
            inner: self.inner.upgrade()?,
            release: self.release.upgrade()?,
        })
    }
}

impl<R> Clone for LifecycleSemaphore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            release: Arc::clone(&self.release),
        }
    }
}

impl<R> Clone for WeakSemaphore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
            release: Weak::clone(&self.release),
        }
    }
}

impl<R> std::fmt::Debug for LifecycleSemaphore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self
            .inner
            .slot
            .lock()
            .map(|s| s.state)
            .unwrap_or(LifecycleState::Released);
        f.debug_struct("LifecycleSemaphore")
            .field("element", &self.inner.element)
            .field("state", &state)
            .finish()
    }
}
