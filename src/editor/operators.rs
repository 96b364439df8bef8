//! # Editor mount/unmount operators.
//!
//! [`EditorLifecycle`] is what a binding hands to its [`LifecycleSemaphore`]:
//! mounting creates an editor (directly, or through a watchdog) and unmounting
//! destroys it. Consumer callbacks are fired from here.
//!
//! ```text
//! mount ─┬─ watchdog disabled ─► engine.create ──────────────────────► MountResult { instance, None }
//!        └─ watchdog ──► set_creator(creator) ─► on_error(runtime) ─► create ─► MountResult { instance, Some(watchdog) }
//!
//! creator (restart n > 0) ─► on_after_destroy(crashed) ─► engine.create ─► unsafe_set_value
//! watchdog EditorRestarted ─► on_ready(restarted)
//!
//! unmount ─► teardown pause ─► watchdog.destroy() | instance.destroy() ─► element.clear() ─► on_after_destroy
//! ```
//!
//! A creation failure is reported to [`EditorHandler::on_error`] in the
//! initialization phase and the binding stays mounted without an editor.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use async_trait::async_trait;
use futures::FutureExt;

use super::{
    EditorConfig, EditorEngine, EditorEvent, EditorHandler, EditorProps, EditorRef, ErrorDetails,
    ErrorPhase, READ_ONLY_LOCK,
};
use crate::config::Config;
use crate::error::{EditorError, LifecycleError};
use crate::lifecycle::{
    LifecycleOperators, LifecycleSemaphore, MountContext, MountPoint, UnmountContext, WeakSemaphore,
};
use crate::watchdog::{
    ContextItemAdapter, ContextWatchdog, CrashReport, Creator, EditorWatchdog, RestartHandler,
    WatchdogAdapter,
};

/// What a mounted binding holds: the editor and the watchdog owning it.
#[derive(Clone, Default)]
pub struct MountResult {
    /// The live editor. Replaced in place when the watchdog restarts it.
    pub instance: Option<EditorRef>,
    /// `None` when the watchdog was disabled.
    pub watchdog: Option<Arc<dyn WatchdogAdapter>>,
}

impl std::fmt::Debug for MountResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountResult")
            .field("instance", &self.instance.as_ref().map(|e| e.id().to_string()))
            .field("watchdog", &self.watchdog.is_some())
            .finish()
    }
}

/// State shared by a binding and every semaphore it creates.
pub(crate) struct BindingShared {
    pub(crate) engine: Arc<dyn EditorEngine>,
    pub(crate) handler: Arc<dyn EditorHandler>,
    pub(crate) props: RwLock<EditorProps>,
    pub(crate) element: MountPoint,
    pub(crate) context: Option<ContextWatchdog>,
    pub(crate) config: Config,
}

impl BindingShared {
    pub(crate) fn props(&self) -> EditorProps {
        self.props
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn replace_props(&self, next: EditorProps) -> EditorProps {
        let mut props = self.props.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *props, next)
    }

    /// Creates an editor and wires the consumer callbacks to it.
    async fn create_editor(
        &self,
        element: MountPoint,
        config: EditorConfig,
    ) -> Result<EditorRef, EditorError> {
        let editor = self.engine.create(element, config).await?;

        let handler = Arc::clone(&self.handler);
        let weak = Arc::downgrade(&editor);
        editor.listen(Arc::new(move |event: &EditorEvent| {
            let Some(editor) = weak.upgrade() else {
                return;
            };
            match event {
                EditorEvent::DataChanged => handler.on_change(event, &editor),
                EditorEvent::Focus => handler.on_focus(event, &editor),
                EditorEvent::Blur => handler.on_blur(event, &editor),
                // reported through the watchdog
                EditorEvent::Fault(_) => {}
            }
        }));

        if let Some(disabled) = self.props().disabled {
            set_read_only(&editor, disabled);
        }
        Ok(editor)
    }

    fn report_initialization(&self, error: &EditorError) {
        self.handler.on_error(
            error,
            ErrorDetails {
                phase: ErrorPhase::Initialization,
                will_editor_restart: None,
            },
        );
    }
}

pub(crate) fn set_read_only(editor: &EditorRef, disabled: bool) {
    if disabled {
        editor.enable_read_only_mode(READ_ONLY_LOCK);
    } else {
        editor.disable_read_only_mode(READ_ONLY_LOCK);
    }
}

/// Handle to the semaphore an [`EditorLifecycle`] belongs to, filled in right
/// after the semaphore is constructed.
pub(crate) type SemaphoreSlot = Arc<OnceLock<WeakSemaphore<MountResult>>>;

/// Restarted editors waiting for their watchdog to report them live.
type AwaitingReady = Arc<Mutex<VecDeque<EditorRef>>>;

/// Mount/unmount operators of one binding semaphore.
pub(crate) struct EditorLifecycle {
    pub(crate) shared: Arc<BindingShared>,
    pub(crate) semaphore: SemaphoreSlot,
}

impl EditorLifecycle {
    fn semaphore(&self) -> Option<LifecycleSemaphore<MountResult>> {
        self.semaphore.get().and_then(WeakSemaphore::upgrade)
    }

    /// Builds editors for a watchdog. Every creation after the first is a
    /// restart and hot-swaps the semaphore value.
    fn creator(&self, awaiting: &AwaitingReady) -> Creator {
        let shared = Arc::clone(&self.shared);
        let slot = Arc::clone(&self.semaphore);
        let awaiting = Arc::clone(awaiting);
        let created = Arc::new(AtomicU32::new(0));

        Arc::new(move |element: MountPoint, config: EditorConfig| {
            let shared = Arc::clone(&shared);
            let slot = Arc::clone(&slot);
            let awaiting = Arc::clone(&awaiting);
            let created = Arc::clone(&created);
            async move {
                let restart = created.load(Ordering::SeqCst) > 0;
                if restart {
                    crashed(&shared, &slot);
                }
                let editor = shared.create_editor(element, config).await?;
                created.fetch_add(1, Ordering::SeqCst);
                if restart {
                    restarted(&slot, &awaiting, &editor);
                }
                Ok(editor)
            }
            .boxed()
        })
    }

    /// Fires `on_ready` for restarted editors once the watchdog has them live.
    fn ready_on_restart(&self, awaiting: &AwaitingReady) -> RestartHandler {
        let handler = Arc::clone(&self.shared.handler);
        let slot = Arc::clone(&self.semaphore);
        let awaiting = Arc::clone(awaiting);
        Arc::new(move |_attempt: u32| {
            let next = awaiting
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some(editor) = next else {
                return;
            };
            let live = slot
                .get()
                .and_then(WeakSemaphore::upgrade)
                .is_some_and(|sem| !sem.is_release_requested());
            if live {
                handler.on_ready(&editor);
            }
        })
    }

    async fn mount_with_watchdog(&self, props: &EditorProps, config: EditorConfig) -> MountResult {
        let shared = &self.shared;
        let watchdog: Arc<dyn WatchdogAdapter> = match &shared.context {
            Some(context) => Arc::new(ContextItemAdapter::new(context)),
            None => {
                let mut cfg = shared.config.clone();
                if let Some(policy) = props.watchdog_config {
                    cfg.watchdog = policy;
                }
                Arc::new(EditorWatchdog::new(&cfg))
            }
        };

        let awaiting = AwaitingReady::default();
        watchdog.set_creator(self.creator(&awaiting));
        let handler = Arc::clone(&shared.handler);
        watchdog.on_error(Arc::new(move |report: &CrashReport| {
            handler.on_error(
                &report.error,
                ErrorDetails {
                    phase: ErrorPhase::Runtime,
                    will_editor_restart: Some(report.causes_restart),
                },
            );
        }));
        watchdog.on_restart(self.ready_on_restart(&awaiting));

        if let Err(err) = watchdog.create(shared.element.clone(), config).await {
            shared.report_initialization(&err.into_editor_error());
            if let Err(err) = watchdog.destroy().await {
                tracing::warn!(error = %err, "failed to dispose of an unused watchdog");
            }
            return MountResult::default();
        }

        MountResult {
            instance: watchdog.editor(),
            watchdog: Some(watchdog),
        }
    }
}

/// The watchdog destroyed the crashed editor and is about to create a new
/// one: report the old one gone and stop exposing it.
fn crashed(shared: &BindingShared, slot: &SemaphoreSlot) {
    let Some(sem) = slot.get().and_then(WeakSemaphore::upgrade) else {
        return;
    };
    if sem.is_release_requested() {
        return;
    }
    let previous = sem.value().unwrap_or_default();
    if let Some(crashed) = &previous.instance {
        shared.handler.on_after_destroy(crashed);
        sem.unsafe_set_value(MountResult {
            instance: None,
            watchdog: previous.watchdog,
        });
    }
}

/// Publishes a restarted editor through the semaphore. `on_ready` follows
/// once the watchdog reports the restart.
fn restarted(slot: &SemaphoreSlot, awaiting: &AwaitingReady, editor: &EditorRef) {
    let Some(sem) = slot.get().and_then(WeakSemaphore::upgrade) else {
        return;
    };
    if sem.is_release_requested() {
        return;
    }
    let previous = sem.value().unwrap_or_default();
    sem.unsafe_set_value(MountResult {
        instance: Some(Arc::clone(editor)),
        watchdog: previous.watchdog,
    });
    awaiting
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(Arc::clone(editor));
}

#[async_trait]
impl LifecycleOperators<MountResult> for EditorLifecycle {
    async fn mount(&self) -> Result<MountResult, LifecycleError> {
        let props = self.shared.props();
        let config = props.resolved_config();

        if !props.disable_watchdog {
            return Ok(self.mount_with_watchdog(&props, config).await);
        }

        match self
            .shared
            .create_editor(self.shared.element.clone(), config)
            .await
        {
            Ok(editor) => Ok(MountResult {
                instance: Some(editor),
                watchdog: None,
            }),
            Err(error) => {
                self.shared.report_initialization(&error);
                Ok(MountResult::default())
            }
        }
    }

    async fn after_mount(&self, ctx: MountContext<'_, MountResult>) -> Result<(), LifecycleError> {
        let current = self
            .semaphore()
            .is_none_or(|sem| !sem.is_release_requested());
        if !current {
            return Ok(());
        }
        if let Some(editor) = &ctx.mount_result.instance {
            self.shared.handler.on_ready(editor);
        }
        Ok(())
    }

    async fn unmount(&self, ctx: UnmountContext<'_, MountResult>) -> Result<(), LifecycleError> {
        let MountResult { instance, watchdog } = ctx.mount_result.clone();
        if instance.is_none() && watchdog.is_none() {
            return Ok(());
        }
        self.shared.config.teardown_pause().await;

        let outcome = match (&watchdog, &instance) {
            (Some(watchdog), _) => watchdog.destroy().await.map_err(LifecycleError::from),
            (None, Some(editor)) => editor.destroy().await.map_err(LifecycleError::from),
            (None, None) => Ok(()),
        };

        if outcome.is_ok() {
            ctx.element.clear();
        }
        if let Some(editor) = &instance {
            self.shared.handler.on_after_destroy(editor);
        }
        outcome
    }
}
