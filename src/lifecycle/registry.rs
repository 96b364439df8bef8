//! # Process-wide mount point registry.
//!
//! Maps a mount point id to the occupancy of whichever semaphore most recently
//! locked it. A new semaphore reads the current occupancy (its predecessor),
//! publishes its own in the same step, and later waits for the predecessor to
//! vacate before mounting.
//!
//! ## Rules
//! - Entries are **replaced**, never merged.
//! - Removal is **conditional**: an occupancy only removes the entry if it is
//!   still the current one for that mount point.
//! - The lock is never held across an `.await`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use super::MountPoint;
use crate::sync::Deferred;

static OCCUPANCY_SEQ: AtomicU64 = AtomicU64::new(1);

static REGISTRY: LazyLock<Mutex<HashMap<u64, Occupancy>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// "Whoever holds this mount point will eventually vacate it."
#[derive(Clone, Debug)]
pub(crate) struct Occupancy {
    id: u64,
    vacated: Deferred,
}

impl Occupancy {
    fn new() -> Self {
        Self {
            id: OCCUPANCY_SEQ.fetch_add(1, Ordering::Relaxed),
            vacated: Deferred::new(),
        }
    }

    /// Signal resolved once this occupant has left the mount point.
    pub(crate) fn vacated(&self) -> &Deferred {
        &self.vacated
    }
}

fn registry() -> MutexGuard<'static, HashMap<u64, Occupancy>> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Publishes a fresh occupancy for `element`.
///
/// Returns `(prior, this)`. `prior` is an already-resolved signal when nobody
/// held the mount point.
pub(crate) fn occupy(element: &MountPoint) -> (Deferred, Occupancy) {
    let this = Occupancy::new();
    let prior = registry()
        .insert(element.id(), this.clone())
        .map(|o| o.vacated)
        .unwrap_or_else(Deferred::resolved);
    (prior, this)
}

/// Removes the entry for `element` if it still belongs to `occupancy`.
pub(crate) fn vacate(element: &MountPoint, occupancy: &Occupancy) {
    let mut map = registry();
    if map.get(&element.id()).is_some_and(|o| o.id == occupancy.id) {
        map.remove(&element.id());
    }
}

/// Returns `true` while some semaphore holds an entry for `element`.
#[cfg(test)]
pub(crate) fn is_occupied(element: &MountPoint) -> bool {
    registry().contains_key(&element.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occupant_sees_resolved_prior() {
        let el = MountPoint::new("registry-first");
        let (prior, this) = occupy(&el);
        assert!(prior.is_resolved());
        assert!(is_occupied(&el));

        vacate(&el, &this);
        assert!(!is_occupied(&el));
    }

    #[test]
    fn stale_occupant_does_not_remove_newer_entry() {
        let el = MountPoint::new("registry-stale");
        let (_, first) = occupy(&el);
        let (prior, second) = occupy(&el);
        assert!(!prior.is_resolved());

        vacate(&el, &first);
        assert!(is_occupied(&el));

        vacate(&el, &second);
        assert!(!is_occupied(&el));
    }

    #[test]
    fn successor_waits_on_predecessor_signal() {
        let el = MountPoint::new("registry-chain");
        let (_, first) = occupy(&el);
        let (prior, _second) = occupy(&el);

        first.vacated().resolve();
        assert!(prior.is_resolved());
    }
}
