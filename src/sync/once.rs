//! # At-most-once trigger.
//!
//! [`Once`] owns a closure and runs it on the first [`Once::call`]. The closure is
//! taken out of its slot *before* it runs, so a re-entrant or concurrent call made
//! while the closure is still executing finds the slot empty and does nothing.

use std::sync::{Mutex, PoisonError};

/// Wraps `f` so that it executes at most once.
///
/// ## Example
/// ```rust
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use editorvisor::sync::Once;
///
/// let hits = AtomicU32::new(0);
/// let trigger = Once::new(|| hits.fetch_add(1, Ordering::SeqCst));
///
/// assert_eq!(trigger.call(), Some(0));
/// assert_eq!(trigger.call(), None);
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
pub struct Once<F> {
    slot: Mutex<Option<F>>,
}

impl<F, R> Once<F>
where
    F: FnOnce() -> R,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self {
            slot: Mutex::new(Some(f)),
        }
    }

    /// Runs the wrapped closure on the first call; returns `None` afterwards.
    pub fn call(&self) -> Option<R> {
        let f = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        f.map(|f| f())
    }

    /// Returns `true` once the closure has been taken.
    pub fn is_called(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl<F> std::fmt::Debug for Once<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let called = self
            .slot
            .lock()
            .map(|s| s.is_none())
            .unwrap_or(true);
        f.debug_struct("Once").field("called", &called).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Weak};
    use std::sync::atomic::{AtomicU32, Ordering};

    type Trigger = Once<Box<dyn FnOnce() + Send>>;

    #[test]
    fn reentrant_call_is_a_noop() {
        let hits = Arc::new(AtomicU32::new(0));
        let trigger: Arc<Trigger> = Arc::new_cyclic(|weak: &Weak<Trigger>| {
            let weak = weak.clone();
            let hits = Arc::clone(&hits);
            Once::new(Box::new(move || {
                hits.fetch_add(1, Ordering::SeqCst);
                if let Some(me) = weak.upgrade() {
                    assert!(me.is_called());
                    assert!(me.call().is_none());
                }
            }) as Box<dyn FnOnce() + Send>)
        });

        trigger.call();
        trigger.call();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_calls_run_once() {
        let hits = Arc::new(AtomicU32::new(0));
        let h = Arc::clone(&hits);
        let trigger = Arc::new(Once::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        }));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let t = Arc::clone(&trigger);
                std::thread::spawn(move || {
                    t.call();
                })
            })
            .collect();
        for t in threads {
            t.join().expect("thread joins");
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
