//! # Mount point handles.
//!
//! A [`MountPoint`] is the stable attachment target an editor is created on.
//! Handles compare by identity: two clones of the same handle are equal, two
//! separately created handles never are, even with equal labels.

use std::borrow::Cow;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

static MOUNT_POINT_SEQ: AtomicU64 = AtomicU64::new(1);

struct Inner {
    id: u64,
    label: Cow<'static, str>,
    content: Mutex<String>,
}

/// Identity-compared handle to an attachment target.
///
/// The handle also carries the target's rendered content, which editors write
/// on creation and the binding clears on teardown.
#[derive(Clone)]
pub struct MountPoint {
    inner: Arc<Inner>,
}

impl MountPoint {
    /// Creates a fresh mount point with a unique identity.
    pub fn new(label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: MOUNT_POINT_SEQ.fetch_add(1, Ordering::Relaxed),
                label: label.into(),
                content: Mutex::new(String::new()),
            }),
        }
    }

    /// Process-unique identity of this handle.
    #[inline]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Human-readable label (for logs).
    #[inline]
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Current content of the attachment target.
    pub fn content(&self) -> String {
        self.lock().clone()
    }

    /// Replaces the content of the attachment target.
    pub fn set_content(&self, content: impl Into<String>) {
        *self.lock() = content.into();
    }

    /// Empties the attachment target.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, String> {
        self.inner
            .content
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl PartialEq for MountPoint {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for MountPoint {}

impl Hash for MountPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl std::fmt::Debug for MountPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountPoint")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .finish()
    }
}

impl std::fmt::Display for MountPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.inner.label, self.inner.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_not_label_decides_equality() {
        let a = MountPoint::new("root");
        let b = MountPoint::new("root");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.to_string(), format!("root#{}", a.id()));
    }

    #[test]
    fn content_is_shared_between_clones() {
        let a = MountPoint::new("root");
        let b = a.clone();
        a.set_content("<p>hi</p>");
        assert_eq!(b.content(), "<p>hi</p>");
        b.clear();
        assert!(a.content().is_empty());
    }
}
