//! # Shared watchdog for many editors.
//!
//! A [`ContextWatchdog`] tracks any number of items, each an editor watched by
//! its own [`EditorWatchdog`] that publishes on the context's bus tagged with
//! the item id. [`ContextItemAdapter`] lets a binding use one item of a context
//! through the ordinary [`WatchdogAdapter`] surface.
//!
//! ```text
//! ContextItemAdapter("editor-3")
//!     create  ──► context.add(ContextItem { id: "editor-3", .. })
//!     destroy ──► context.remove("editor-3")   (only while the context is Ready)
//!     on_error ─► EditorCrashed events where item == "editor-3"
//! ```
//!
//! Handlers registered through an adapter live until the adapter is destroyed
//! (or the context, whichever comes first).
//!
//! The context itself is `Ready` from construction until `destroy()`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::adapter::{
    Creator, ErrorHandler, RestartHandler, WatchdogAdapter, forward_crashes, forward_restarts,
};
use super::{EditorWatchdog, WatchdogConfig, WatchdogState};
use crate::config::Config;
use crate::editor::{EditorConfig, EditorRef};
use crate::error::WatchdogError;
use crate::events::{Bus, Event, EventKind};
use crate::lifecycle::MountPoint;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Description of one editor added to a [`ContextWatchdog`].
pub struct ContextItem {
    /// Correlation id, unique within the context.
    pub id: String,
    pub element: MountPoint,
    pub config: EditorConfig,
    pub creator: Creator,
}

struct Tracked {
    state: WatchdogState,
    items: HashMap<Arc<str>, EditorWatchdog>,
}

struct ContextInner {
    policy: WatchdogConfig,
    bus: Bus,
    token: CancellationToken,
    tracked: Mutex<Tracked>,
}

impl ContextInner {
    fn lock(&self) -> MutexGuard<'_, Tracked> {
        self.tracked.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Watches many editors on one bus.
///
/// Cheap to clone; clones share the same items.
#[derive(Clone)]
pub struct ContextWatchdog {
    inner: Arc<ContextInner>,
}

impl ContextWatchdog {
    pub fn new(config: &Config) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                policy: config.watchdog,
                bus: Bus::new(config.bus_capacity()),
                token: CancellationToken::new(),
                tracked: Mutex::new(Tracked {
                    state: WatchdogState::Ready,
                    items: HashMap::new(),
                }),
            }),
        }
    }

    /// Attaches subscribers to the events of every item until the context is
    /// destroyed. Must be called inside a tokio runtime.
    pub fn with_subscribers(self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        if !subscribers.is_empty() {
            let set = SubscriberSet::new(subscribers, self.inner.bus.clone());
            let _ = set.listen(self.inner.token.child_token());
        }
        self
    }

    pub fn state(&self) -> WatchdogState {
        self.inner.lock().state
    }

    /// Receiver for events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Starts tracking `item` and creates its editor.
    ///
    /// The item is dropped again if creation fails.
    pub async fn add(&self, item: ContextItem) -> Result<(), WatchdogError> {
        let id: Arc<str> = Arc::from(item.id);
        let watchdog = {
            let mut tracked = self.inner.lock();
            if tracked.state != WatchdogState::Ready {
                return Err(WatchdogError::Destroyed);
            }
            if tracked.items.contains_key(&id) {
                return Err(WatchdogError::DuplicateItem { id: id.to_string() });
            }
            let watchdog = EditorWatchdog::for_item(
                self.inner.policy,
                self.inner.bus.clone(),
                Arc::clone(&id),
                self.inner.token.child_token(),
            );
            tracked.items.insert(Arc::clone(&id), watchdog.clone());
            watchdog
        };

        self.inner
            .bus
            .publish(Event::new(EventKind::ItemAdded).with_item(Arc::clone(&id)));
        watchdog.set_creator(item.creator);

        if let Err(err) = watchdog.create(item.element, item.config).await {
            tracing::warn!(item = %id, error = %err, "context item failed to start");
            let removed = {
                let mut tracked = self.inner.lock();
                let same = tracked
                    .items
                    .get(&id)
                    .is_some_and(|w| w.same_as(&watchdog));
                if same { tracked.items.remove(&id) } else { None }
            };
            if removed.is_some() {
                self.inner
                    .bus
                    .publish(Event::new(EventKind::ItemRemoved).with_item(id));
            }
            return Err(err);
        }
        Ok(())
    }

    /// Stops tracking the item and destroys its editor.
    pub async fn remove(&self, id: &str) -> Result<(), WatchdogError> {
        let watchdog = self.inner.lock().items.remove(id);
        let Some(watchdog) = watchdog else {
            return Err(WatchdogError::ItemNotFound { id: id.to_string() });
        };
        self.inner
            .bus
            .publish(Event::new(EventKind::ItemRemoved).with_item(id));
        watchdog.destroy().await
    }

    /// The live editor of item `id`.
    pub fn get_item(&self, id: &str) -> Option<EditorRef> {
        let watchdog = self.inner.lock().items.get(id).cloned();
        watchdog.and_then(|w| w.editor())
    }

    /// Recovery state of item `id`, while tracked.
    pub fn item_state(&self, id: &str) -> Option<WatchdogState> {
        let watchdog = self.inner.lock().items.get(id).cloned();
        watchdog.map(|w| w.state())
    }

    /// Ids of the tracked items, sorted.
    pub fn items(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .inner
            .lock()
            .items
            .keys()
            .map(|id| id.to_string())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Destroys every item and stops the context.
    ///
    /// Every item is torn down even if some fail; the first failure is returned.
    pub async fn destroy(&self) -> Result<(), WatchdogError> {
        let items: Vec<EditorWatchdog> = {
            let mut tracked = self.inner.lock();
            if tracked.state == WatchdogState::Destroyed {
                return Ok(());
            }
            tracked.state = WatchdogState::Destroyed;
            tracked.items.drain().map(|(_, w)| w).collect()
        };

        let mut first_error = None;
        for watchdog in items {
            if let Err(err) = watchdog.destroy().await {
                tracing::warn!(error = %err, "context item failed to destroy");
                first_error.get_or_insert(err);
            }
        }

        self.inner
            .bus
            .publish(Event::new(EventKind::WatchdogDestroyed));
        self.inner.token.cancel();
        first_error.map_or(Ok(()), Err)
    }

    fn bus(&self) -> &Bus {
        &self.inner.bus
    }
}

impl std::fmt::Debug for ContextWatchdog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextWatchdog")
            .field("state", &self.state())
            .field("items", &self.items())
            .finish()
    }
}

static ITEM_SEQ: AtomicU64 = AtomicU64::new(1);

/// One item of a [`ContextWatchdog`], seen through [`WatchdogAdapter`].
pub struct ContextItemAdapter {
    context: ContextWatchdog,
    id: Arc<str>,
    creator: Mutex<Option<Creator>>,
    /// Lifetime of this adapter's handlers.
    token: CancellationToken,
}

impl ContextItemAdapter {
    /// Adapter with a fresh `editor-N` id.
    pub fn new(context: &ContextWatchdog) -> Self {
        let n = ITEM_SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            context: context.clone(),
            id: Arc::from(format!("editor-{n}")),
            creator: Mutex::new(None),
            token: context.inner.token.child_token(),
        }
    }

    /// Correlation id of this item.
    pub fn id(&self) -> &str {
        &self.id
    }
}

#[async_trait]
impl WatchdogAdapter for ContextItemAdapter {
    fn set_creator(&self, creator: Creator) {
        *self.creator.lock().unwrap_or_else(PoisonError::into_inner) = Some(creator);
    }

    async fn create(&self, element: MountPoint, config: EditorConfig) -> Result<(), WatchdogError> {
        let creator = self
            .creator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(creator) = creator else {
            return Err(WatchdogError::MissingCreator);
        };
        self.context
            .add(ContextItem {
                id: self.id.to_string(),
                element,
                config,
                creator,
            })
            .await
    }

    fn on_error(&self, handler: ErrorHandler) {
        forward_crashes(
            self.context.bus(),
            Some(Arc::clone(&self.id)),
            handler,
            self.token.child_token(),
        );
    }

    fn on_restart(&self, handler: RestartHandler) {
        forward_restarts(
            self.context.bus(),
            Some(Arc::clone(&self.id)),
            handler,
            self.token.child_token(),
        );
    }

    async fn destroy(&self) -> Result<(), WatchdogError> {
        if self.context.state() != WatchdogState::Ready {
            self.token.cancel();
            return Ok(());
        }
        let removed = match self.context.remove(&self.id).await {
            Err(WatchdogError::ItemNotFound { .. }) => Ok(()),
            other => other,
        };
        self.token.cancel();
        removed
    }

    fn editor(&self) -> Option<EditorRef> {
        self.context.get_item(&self.id)
    }

    fn state(&self) -> WatchdogState {
        if self.token.is_cancelled() {
            return WatchdogState::Destroyed;
        }
        self.context
            .item_state(&self.id)
            .unwrap_or(WatchdogState::Initializing)
    }
}
