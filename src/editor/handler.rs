//! Consumer callbacks.

use crate::editor::{EditorEvent, EditorRef};
use crate::error::EditorError;

/// When an editor error happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPhase {
    /// The engine failed to create the editor.
    Initialization,
    /// A live editor faulted.
    Runtime,
}

impl ErrorPhase {
    /// Stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ErrorPhase::Initialization => "initialization",
            ErrorPhase::Runtime => "runtime",
        }
    }
}

/// Details passed to [`EditorHandler::on_error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorDetails {
    pub phase: ErrorPhase,
    /// Whether the watchdog restarts the editor (runtime faults only).
    pub will_editor_restart: Option<bool>,
}

/// Callbacks a component receives from its [`EditorBinding`](crate::EditorBinding).
///
/// Every method has a default; implement only what you need. Callbacks run on
/// runtime worker threads and must not block.
pub trait EditorHandler: Send + Sync + 'static {
    /// Once per successfully created editor, restarts included.
    fn on_ready(&self, _editor: &EditorRef) {}

    /// The document changed.
    fn on_change(&self, _event: &EditorEvent, _editor: &EditorRef) {}

    fn on_focus(&self, _event: &EditorEvent, _editor: &EditorRef) {}

    fn on_blur(&self, _event: &EditorEvent, _editor: &EditorRef) {}

    /// Once per destroyed editor, including ones replaced by a restart.
    fn on_after_destroy(&self, _editor: &EditorRef) {}

    /// Creation failures and runtime faults. Logs by default.
    fn on_error(&self, error: &EditorError, details: ErrorDetails) {
        tracing::error!(
            phase = details.phase.as_label(),
            will_editor_restart = ?details.will_editor_restart,
            label = error.as_label(),
            %error,
            "editor error"
        );
    }
}

/// Handler that only keeps the default error logging.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHandler;

impl EditorHandler for NoopHandler {}
