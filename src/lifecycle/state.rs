//! # Lifecycle state machine.
//!
//! ```text
//!                    PriorVacated           MountSettled
//! AwaitingPriorOccupant ────────► Mounting ────────────► Mounted
//!          │                          │                     │
//!          │ ReleaseRequested         │ ReleaseRequested    │ ReleaseRequested
//!          ▼                          ▼                     ▼
//!       Released ◄──────────────── Unmounting ◄─────────────┘
//!                  UnmountSettled
//! ```
//!
//! A release that arrives while mounting moves straight to `Unmounting`; the
//! unmount operator still waits for the mount to settle before running.

/// Conceptual state of one semaphore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Waiting for the previous occupant of the mount point to vacate.
    AwaitingPriorOccupant,
    /// Mount operator is running.
    Mounting,
    /// Mount operator finished (successfully or not).
    Mounted,
    /// Release requested after mount began; unmount pending or running.
    Unmounting,
    /// Terminal.
    Released,
}

/// Inputs driving [`LifecycleState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The previous occupant vacated the mount point.
    PriorVacated,
    /// The mount operator returned.
    MountSettled,
    /// `release()` was called.
    ReleaseRequested,
    /// The unmount sequence completed.
    UnmountSettled,
}

impl LifecycleState {
    /// Returns the state reached by applying `input`, or `None` if the input
    /// is not accepted in the current state.
    pub fn next(self, input: Transition) -> Option<LifecycleState> {
        use LifecycleState::*;
        use Transition::*;

        match (self, input) {
            (AwaitingPriorOccupant, PriorVacated) => Some(Mounting),
            (AwaitingPriorOccupant, ReleaseRequested) => Some(Released),
            // destroyed before initialization: stay released, never mount
            (Released, PriorVacated) => Some(Released),
            (Mounting, MountSettled) => Some(Mounted),
            (Mounting, ReleaseRequested) => Some(Unmounting),
            (Mounted, ReleaseRequested) => Some(Unmounting),
            (Unmounting, MountSettled) => Some(Unmounting),
            (Unmounting, UnmountSettled) => Some(Released),
            _ => None,
        }
    }

    /// Returns `true` once the mount operator has been started.
    #[inline]
    pub fn mount_started(self) -> bool {
        matches!(
            self,
            LifecycleState::Mounting | LifecycleState::Mounted | LifecycleState::Unmounting
        )
    }
}
