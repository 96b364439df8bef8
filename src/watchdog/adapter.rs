//! # Uniform watchdog surface.
//!
//! [`WatchdogAdapter`] is what an [`EditorBinding`](crate::EditorBinding)
//! talks to. The dedicated [`EditorWatchdog`](super::EditorWatchdog) implements
//! it as a pass-through; [`ContextItemAdapter`](super::ContextItemAdapter)
//! translates it into item operations on a shared
//! [`ContextWatchdog`](super::ContextWatchdog).
//!
//! Error and restart handlers are fed by an internal [`Subscribe`]
//! implementation that filters `EditorCrashed` / `EditorRestarted` events for
//! one item off the watchdog's bus. Restart handlers therefore run after the
//! restarted editor has been installed.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::editor::{EditorConfig, EditorRef};
use crate::error::{EditorError, WatchdogError};
use crate::events::{Bus, Event, EventKind};
use crate::lifecycle::MountPoint;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::WatchdogState;

/// Builds an editor for a watchdog, on first creation and on every restart.
pub type Creator = Arc<
    dyn Fn(MountPoint, EditorConfig) -> BoxFuture<'static, Result<EditorRef, EditorError>>
        + Send
        + Sync,
>;

/// A runtime fault as seen by error handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrashReport {
    pub error: EditorError,
    /// Whether the watchdog restarts the editor.
    pub causes_restart: bool,
    /// Item id (shared mode only).
    pub item: Option<Arc<str>>,
}

/// Handler registered with [`WatchdogAdapter::on_error`].
pub type ErrorHandler = Arc<dyn Fn(&CrashReport) + Send + Sync>;

/// Handler registered with [`WatchdogAdapter::on_restart`]; receives the
/// restart attempt.
pub type RestartHandler = Arc<dyn Fn(u32) + Send + Sync>;

/// Create/destroy surface shared by dedicated and shared watchdogs.
#[async_trait]
pub trait WatchdogAdapter: Send + Sync + 'static {
    /// Binds the function that builds editors.
    fn set_creator(&self, creator: Creator);

    /// Creates the editor through the bound creator.
    async fn create(&self, element: MountPoint, config: EditorConfig)
    -> Result<(), WatchdogError>;

    /// Registers a handler for runtime faults of this adapter's editor.
    fn on_error(&self, handler: ErrorHandler);

    /// Registers a handler called once a restarted editor is live.
    fn on_restart(&self, handler: RestartHandler);

    /// Destroys the editor and stops watching it.
    async fn destroy(&self) -> Result<(), WatchdogError>;

    /// The live editor, if any.
    fn editor(&self) -> Option<EditorRef>;

    /// Recovery state of this adapter's editor.
    fn state(&self) -> WatchdogState;
}

enum Forward {
    Crash(ErrorHandler),
    Restart(RestartHandler),
}

struct Forwarder {
    item: Option<Arc<str>>,
    forward: Forward,
}

impl Forwarder {
    fn owns(&self, event: &Event) -> bool {
        match &self.item {
            Some(id) => event.is_for_item(id),
            None => event.item.is_none(),
        }
    }
}

#[async_trait]
impl Subscribe for Forwarder {
    async fn on_event(&self, event: &Event) {
        if !self.owns(event) {
            return;
        }
        match (&self.forward, event.kind) {
            (Forward::Crash(handler), EventKind::EditorCrashed) => {
                let Some(error) = event.error.clone() else {
                    return;
                };
                handler(&CrashReport {
                    error,
                    causes_restart: event.causes_restart.unwrap_or(false),
                    item: event.item.clone(),
                });
            }
            (Forward::Restart(handler), EventKind::EditorRestarted) => {
                handler(event.attempt.unwrap_or_default());
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        match self.forward {
            Forward::Crash(_) => "crash-forwarder",
            Forward::Restart(_) => "restart-forwarder",
        }
    }
}

fn forward(bus: &Bus, item: Option<Arc<str>>, forward: Forward, token: CancellationToken) {
    let forwarder: Arc<dyn Subscribe> = Arc::new(Forwarder { item, forward });
    let _ = SubscriberSet::new(vec![forwarder], bus.clone()).listen(token);
}

/// Feeds `EditorCrashed` events for `item` from `bus` into `handler` until
/// `token` is cancelled.
pub(crate) fn forward_crashes(
    bus: &Bus,
    item: Option<Arc<str>>,
    handler: ErrorHandler,
    token: CancellationToken,
) {
    forward(bus, item, Forward::Crash(handler), token);
}

/// Feeds `EditorRestarted` events for `item` from `bus` into `handler` until
/// `token` is cancelled.
pub(crate) fn forward_restarts(
    bus: &Bus,
    item: Option<Arc<str>>,
    handler: RestartHandler,
    token: CancellationToken,
) {
    forward(bus, item, Forward::Restart(handler), token);
}
