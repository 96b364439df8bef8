//! # Dedicated watchdog: one editor, restarted on faults.
//!
//! ## Fault handling
//! ```text
//! Editor ── EditorEvent::Fault ──► handle_fault(generation)
//!                                    │
//!                                    ├─ state != Ready or stale generation → ignore
//!                                    ├─ record crash time
//!                                    ├─ publish EditorCrashed { causes_restart }
//!                                    │
//!                                    ├─ policy gives up → CrashedPermanently
//!                                    └─ spawn restart:
//!                                         backoff.next(n) (cancelled by destroy)
//!                                         preserve data → initial_data
//!                                         destroy crashed editor
//!                                         creator(element, config) → Ready
//! ```
//!
//! Restarts are serialized; `destroy()` waits for an in-flight restart so no
//! editor outlives its watchdog.
//!
//! Fault listeners are called from the editor and spawn the restart, so faults
//! must be reported from within a tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::adapter::{
    Creator, ErrorHandler, RestartHandler, WatchdogAdapter, forward_crashes, forward_restarts,
};
use super::{WatchdogConfig, WatchdogState};
use crate::config::Config;
use crate::editor::{EditorConfig, EditorEvent, EditorRef};
use crate::error::{EditorError, WatchdogError};
use crate::events::{Bus, Event, EventKind};
use crate::lifecycle::MountPoint;
use crate::subscribers::{Subscribe, SubscriberSet};

struct Watched {
    state: WatchdogState,
    creator: Option<Creator>,
    editor: Option<EditorRef>,
    element: Option<MountPoint>,
    config: EditorConfig,
    crashes: Vec<Instant>,
    restarts: u32,
    generation: u64,
}

struct Inner {
    policy: WatchdogConfig,
    item: Option<Arc<str>>,
    bus: Bus,
    /// Lifetime of listeners attached to the bus.
    token: CancellationToken,
    /// Interrupts a pending restart delay.
    halt: CancellationToken,
    watched: Mutex<Watched>,
    restart_lock: tokio::sync::Mutex<()>,
}

/// Watches a single editor and restarts it after faults.
///
/// Cheap to clone; clones watch the same editor.
#[derive(Clone)]
pub struct EditorWatchdog {
    inner: Arc<Inner>,
}

impl EditorWatchdog {
    /// Creates a watchdog with its own event bus.
    pub fn new(config: &Config) -> Self {
        Self::build(
            config.watchdog,
            Bus::new(config.bus_capacity()),
            None,
            CancellationToken::new(),
        )
    }

    /// Watchdog for one item of a shared context; publishes on the context bus.
    pub(crate) fn for_item(
        policy: WatchdogConfig,
        bus: Bus,
        item: Arc<str>,
        token: CancellationToken,
    ) -> Self {
        Self::build(policy, bus, Some(item), token)
    }

    fn build(
        policy: WatchdogConfig,
        bus: Bus,
        item: Option<Arc<str>>,
        token: CancellationToken,
    ) -> Self {
        let halt = token.child_token();
        Self {
            inner: Arc::new(Inner {
                policy,
                item,
                bus,
                token,
                halt,
                watched: Mutex::new(Watched {
                    state: WatchdogState::Initializing,
                    creator: None,
                    editor: None,
                    element: None,
                    config: EditorConfig::default(),
                    crashes: Vec::new(),
                    restarts: 0,
                    generation: 0,
                }),
                restart_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Attaches subscribers to this watchdog's events until it is destroyed.
    ///
    /// Must be called inside a tokio runtime.
    pub fn with_subscribers(self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        if !subscribers.is_empty() {
            let set = SubscriberSet::new(subscribers, self.inner.bus.clone());
            let _ = set.listen(self.inner.token.child_token());
        }
        self
    }

    /// Current state.
    pub fn state(&self) -> WatchdogState {
        self.inner.lock().state
    }

    /// Number of faults recorded so far.
    pub fn crash_count(&self) -> usize {
        self.inner.lock().crashes.len()
    }

    /// Receiver for events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    pub(crate) fn same_as(&self, other: &EditorWatchdog) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Watched> {
        self.watched.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_item_opt(self.item.as_ref())
    }

    /// Makes `editor` the watched editor, unless the watchdog was destroyed
    /// meanwhile, in which case the editor is torn down.
    async fn install(self: &Arc<Self>, editor: EditorRef, attempt: u32) -> Result<(), WatchdogError> {
        let installed = {
            let mut w = self.lock();
            if w.state == WatchdogState::Destroyed {
                None
            } else {
                w.generation += 1;
                w.editor = Some(Arc::clone(&editor));
                w.state = WatchdogState::Ready;
                Some(w.generation)
            }
        };
        let Some(generation) = installed else {
            if let Err(error) = editor.destroy().await {
                tracing::warn!(item = ?self.item, %error, "late editor failed to destroy");
            }
            return Err(WatchdogError::Destroyed);
        };

        let weak = Arc::downgrade(self);
        editor.listen(Arc::new(move |event: &EditorEvent| {
            if let EditorEvent::Fault(error) = event {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_fault(generation, error.clone());
                }
            }
        }));

        self.bus
            .publish(self.event(EventKind::EditorCreated).with_attempt(attempt));
        Ok(())
    }

    fn handle_fault(self: &Arc<Self>, generation: u64, error: EditorError) {
        let restart = {
            let mut w = self.lock();
            if w.state != WatchdogState::Ready || w.generation != generation {
                return;
            }
            w.crashes.push(Instant::now());
            let restart = self.policy.restart.should_restart(&w.crashes);
            w.state = if restart {
                WatchdogState::Crashed
            } else {
                WatchdogState::CrashedPermanently
            };
            restart
        };

        tracing::warn!(item = ?self.item, %error, restart, "editor crashed");
        self.bus.publish(
            self.event(EventKind::EditorCrashed)
                .with_error(error.clone())
                .with_causes_restart(restart),
        );

        if restart {
            tokio::spawn(Arc::clone(self).restart());
        } else {
            tracing::error!(item = ?self.item, %error, "editor crashed permanently");
            self.bus
                .publish(self.event(EventKind::CrashedPermanently).with_error(error));
        }
    }

    async fn restart(self: Arc<Self>) {
        let _serial = self.restart_lock.lock().await;

        let attempt = {
            let mut w = self.lock();
            if w.state != WatchdogState::Crashed {
                return;
            }
            w.restarts += 1;
            w.restarts
        };

        let delay = self.policy.backoff.next(attempt);
        self.bus.publish(
            self.event(EventKind::RestartScheduled)
                .with_attempt(attempt)
                .with_delay(delay),
        );
        if !delay.is_zero() {
            tokio::select! {
                _ = self.halt.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        let taken = {
            let mut w = self.lock();
            match (w.state, w.creator.clone(), w.element.clone()) {
                (WatchdogState::Crashed, Some(creator), Some(element)) => {
                    Some((w.editor.take(), creator, element, w.config.clone()))
                }
                _ => None,
            }
        };
        let Some((crashed, creator, element, mut config)) = taken else {
            return;
        };

        if let Some(crashed) = crashed {
            config.initial_data = Some(crashed.get_data());
            if let Err(error) = crashed.destroy().await {
                tracing::warn!(item = ?self.item, %error, "crashed editor failed to destroy");
            }
        }

        match creator(element, config.clone()).await {
            Ok(editor) => {
                self.lock().config = config;
                if self.install(editor, attempt).await.is_ok() {
                    tracing::info!(item = ?self.item, attempt, "editor restarted");
                    self.bus
                        .publish(self.event(EventKind::EditorRestarted).with_attempt(attempt));
                }
            }
            Err(error) => {
                {
                    let mut w = self.lock();
                    if w.state == WatchdogState::Crashed {
                        w.state = WatchdogState::CrashedPermanently;
                    }
                }
                tracing::error!(item = ?self.item, attempt, %error, "editor restart failed");
                self.bus
                    .publish(self.event(EventKind::CrashedPermanently).with_error(error));
            }
        }
    }
}

#[async_trait]
impl WatchdogAdapter for EditorWatchdog {
    fn set_creator(&self, creator: Creator) {
        self.inner.lock().creator = Some(creator);
    }

    async fn create(&self, element: MountPoint, config: EditorConfig) -> Result<(), WatchdogError> {
        let creator = {
            let mut w = self.inner.lock();
            if w.state == WatchdogState::Destroyed {
                return Err(WatchdogError::Destroyed);
            }
            let Some(creator) = w.creator.clone() else {
                return Err(WatchdogError::MissingCreator);
            };
            w.state = WatchdogState::Initializing;
            w.element = Some(element.clone());
            w.config = config.clone();
            creator
        };

        let editor = creator(element, config).await?;
        self.inner.install(editor, 0).await
    }

    fn on_error(&self, handler: ErrorHandler) {
        forward_crashes(
            &self.inner.bus,
            self.inner.item.clone(),
            handler,
            self.inner.token.child_token(),
        );
    }

    fn on_restart(&self, handler: RestartHandler) {
        forward_restarts(
            &self.inner.bus,
            self.inner.item.clone(),
            handler,
            self.inner.token.child_token(),
        );
    }

    async fn destroy(&self) -> Result<(), WatchdogError> {
        let editor = {
            let mut w = self.inner.lock();
            if w.state == WatchdogState::Destroyed {
                return Ok(());
            }
            w.state = WatchdogState::Destroyed;
            w.creator = None;
            w.editor.take()
        };
        self.inner.halt.cancel();

        // An in-flight restart sees the new state and disposes of its editor.
        let _serial = self.inner.restart_lock.lock().await;

        let result = match editor {
            Some(editor) => editor.destroy().await.map_err(WatchdogError::from),
            None => Ok(()),
        };

        self.inner
            .bus
            .publish(self.inner.event(EventKind::WatchdogDestroyed));
        self.inner.token.cancel();
        result
    }

    fn editor(&self) -> Option<EditorRef> {
        self.inner.lock().editor.clone()
    }

    fn state(&self) -> WatchdogState {
        self.inner.lock().state
    }
}

impl std::fmt::Debug for EditorWatchdog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorWatchdog")
            .field("item", &self.inner.item)
            .field("state", &self.state())
            .finish()
    }
}
