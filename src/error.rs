//! Error types used by the editorvisor runtime.
//!
//! This module defines three error enums:
//!
//! - [`EditorError`] failures reported by the editor engine itself.
//! - [`WatchdogError`] failures of the crash-recovery layer.
//! - [`LifecycleError`] failures returned by lifecycle operators and logged by the semaphore.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

/// # Errors reported by the editor engine.
///
/// Carried on the watchdog event bus, therefore `Clone`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// The engine failed to construct an editor.
    #[error("editor creation failed: {error}")]
    Create {
        /// The underlying error message.
        error: String,
    },

    /// The editor failed to tear itself down.
    #[error("editor destroy failed: {error}")]
    Destroy {
        /// The underlying error message.
        error: String,
    },

    /// The editor hit an unexpected fault while running.
    #[error("editor crashed: {error}")]
    Crashed {
        /// The underlying error message.
        error: String,
    },
}

impl EditorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use editorvisor::EditorError;
    ///
    /// let err = EditorError::Crashed { error: "boom".into() };
    /// assert_eq!(err.as_label(), "editor_crashed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EditorError::Create { .. } => "editor_create_failed",
            EditorError::Destroy { .. } => "editor_destroy_failed",
            EditorError::Crashed { .. } => "editor_crashed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EditorError::Create { error } => format!("create: {error}"),
            EditorError::Destroy { error } => format!("destroy: {error}"),
            EditorError::Crashed { error } => format!("crash: {error}"),
        }
    }
}

/// # Errors produced by the crash-recovery layer.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchdogError {
    /// `create` was called before a creator was bound.
    #[error("watchdog has no creator bound")]
    MissingCreator,

    /// The watchdog (or its shared context) was already destroyed.
    #[error("watchdog already destroyed")]
    Destroyed,

    /// A shared watchdog already tracks an item with this id.
    #[error("item {id:?} already exists")]
    DuplicateItem {
        /// Correlation id of the item.
        id: String,
    },

    /// A shared watchdog does not track an item with this id.
    #[error("item {id:?} not found")]
    ItemNotFound {
        /// Correlation id of the item.
        id: String,
    },

    /// The wrapped editor failed.
    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl WatchdogError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WatchdogError::MissingCreator => "watchdog_missing_creator",
            WatchdogError::Destroyed => "watchdog_destroyed",
            WatchdogError::DuplicateItem { .. } => "watchdog_duplicate_item",
            WatchdogError::ItemNotFound { .. } => "watchdog_item_not_found",
            WatchdogError::Editor(e) => e.as_label(),
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WatchdogError::Editor(e) => e.as_message(),
            other => other.to_string(),
        }
    }

    /// Collapses the error into the editor error reported to consumers.
    ///
    /// Recovery-layer failures that did not originate in the engine are
    /// reported as creation failures.
    pub fn into_editor_error(self) -> EditorError {
        match self {
            WatchdogError::Editor(e) => e,
            other => EditorError::Create {
                error: other.to_string(),
            },
        }
    }
}

/// # Errors returned by lifecycle operators.
///
/// The semaphore never propagates these; it logs them and keeps the mount
/// point usable.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The mount operator could not produce a result.
    #[error("mount failed: {error}")]
    Mount {
        /// The underlying error message.
        error: String,
    },

    /// The unmount operator could not dispose of the result.
    #[error("unmount failed: {error}")]
    Unmount {
        /// The underlying error message.
        error: String,
    },

    /// An operator panicked; the panic was caught.
    #[error("operator panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },

    /// The editor engine failed.
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// The recovery layer failed.
    #[error(transparent)]
    Watchdog(#[from] WatchdogError),
}

impl LifecycleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use editorvisor::LifecycleError;
    ///
    /// let err = LifecycleError::Mount { error: "nope".into() };
    /// assert_eq!(err.as_label(), "lifecycle_mount_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LifecycleError::Mount { .. } => "lifecycle_mount_failed",
            LifecycleError::Unmount { .. } => "lifecycle_unmount_failed",
            LifecycleError::Panicked { .. } => "lifecycle_operator_panicked",
            LifecycleError::Editor(e) => e.as_label(),
            LifecycleError::Watchdog(e) => e.as_label(),
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LifecycleError::Mount { error } => format!("mount: {error}"),
            LifecycleError::Unmount { error } => format!("unmount: {error}"),
            LifecycleError::Panicked { info } => format!("panic: {info}"),
            LifecycleError::Editor(e) => e.as_message(),
            LifecycleError::Watchdog(e) => e.as_message(),
        }
    }

    /// Builds a [`LifecycleError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let info = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        LifecycleError::Panicked { info }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watchdog_error_collapses_into_editor_error() {
        let inner = EditorError::Crashed { error: "x".into() };
        assert_eq!(
            WatchdogError::Editor(inner.clone()).into_editor_error(),
            inner
        );

        let collapsed = WatchdogError::MissingCreator.into_editor_error();
        assert_eq!(collapsed.as_label(), "editor_create_failed");
    }

    #[test]
    fn panic_payloads_are_rendered() {
        let err = LifecycleError::from_panic(Box::new("static"));
        assert_eq!(err.as_message(), "panic: static");

        let err = LifecycleError::from_panic(Box::new(String::from("owned")));
        assert_eq!(err.as_message(), "panic: owned");

        let err = LifecycleError::from_panic(Box::new(7_u8));
        assert_eq!(err.as_label(), "lifecycle_operator_panicked");
    }

    #[test]
    fn labels_pass_through_wrapped_errors() {
        let err = LifecycleError::from(WatchdogError::Destroyed);
        assert_eq!(err.as_label(), "watchdog_destroyed");
    }
}
