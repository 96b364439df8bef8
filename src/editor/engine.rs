//! # External editor engine.
//!
//! The crate never renders or parses content itself. An [`EditorEngine`]
//! constructs [`Editor`] instances attached to a [`MountPoint`]; the editor
//! reports what happens to it through [`EditorEvent`]s delivered to listeners.
//!
//! Faults are *detected* by the engine: an editor that hits an unexpected
//! error emits [`EditorEvent::Fault`]. Watchdogs only decide what to do next.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::EditorConfig;
use crate::error::EditorError;
use crate::lifecycle::MountPoint;

/// Lock id used to toggle read-only mode from the `disabled` prop.
pub const READ_ONLY_LOCK: &str = "editorvisor-read-only";

/// Notification emitted by a running editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    /// The document changed.
    DataChanged,
    /// The editable surface gained focus.
    Focus,
    /// The editable surface lost focus.
    Blur,
    /// The editor hit an unexpected error and may be unusable.
    Fault(EditorError),
}

/// Listener registered with [`Editor::listen`].
pub type EditorListener = Arc<dyn Fn(&EditorEvent) + Send + Sync>;

/// Shared handle to a live editor.
pub type EditorRef = Arc<dyn Editor>;

/// A stateful editor instance produced by an [`EditorEngine`].
#[async_trait]
pub trait Editor: Send + Sync + 'static {
    /// Engine-assigned identifier (for logs).
    fn id(&self) -> &str;

    /// Current document.
    fn get_data(&self) -> String;

    /// Replaces the document.
    fn set_data(&self, data: &str);

    /// Adds a read-only lock; the editor stays read-only while any lock is held.
    fn enable_read_only_mode(&self, lock: &str);

    /// Removes a read-only lock.
    fn disable_read_only_mode(&self, lock: &str);

    /// `true` while at least one read-only lock is held.
    fn is_read_only(&self) -> bool;

    /// Registers a listener for every future [`EditorEvent`].
    fn listen(&self, listener: EditorListener);

    /// Tears the editor down. Always settles.
    async fn destroy(&self) -> Result<(), EditorError>;
}

impl fmt::Debug for dyn Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor").field("id", &self.id()).finish()
    }
}

/// Constructs editors. Always settles.
#[async_trait]
pub trait EditorEngine: Send + Sync + 'static {
    /// Creates an editor attached to `element`.
    async fn create(&self, element: MountPoint, config: EditorConfig)
    -> Result<EditorRef, EditorError>;
}
