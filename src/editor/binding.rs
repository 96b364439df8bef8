//! # EditorBinding: a component's handle on its editor.
//!
//! The rendering framework drives a binding with three signals:
//!
//! ```text
//! attach()        ─► new LifecycleSemaphore(element, EditorLifecycle)
//! update(props)   ─► identity changed (id / disable_watchdog)?
//!                      ├─ yes: release current semaphore, attach a new one
//!                      └─ no:  run_after_mount: set_data (if changed), read-only lock
//! detach()        ─► release current semaphore
//! ```
//!
//! Every semaphore the binding releases is kept until it has left the mount
//! point; [`EditorBinding::settled`] waits for all of them.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use editorvisor::{EditorBinding, EditorEngine, EditorProps, MountPoint};
//!
//! async fn render(engine: Arc<dyn EditorEngine>) {
//!     let binding = EditorBinding::builder(engine, MountPoint::new("editor"))
//!         .with_props(EditorProps::with_data("<p>Hello</p>"))
//!         .build();
//!
//!     binding.attach();
//!     binding.update(EditorProps::with_data("<p>Hello, world</p>"));
//!     binding.detach();
//!     binding.settled().await;
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock};

use super::operators::{BindingShared, EditorLifecycle, MountResult, set_read_only};
use super::{EditorEngine, EditorHandler, EditorProps, EditorRef, NoopHandler};
use crate::config::Config;
use crate::lifecycle::{LifecycleSemaphore, MountPoint};
use crate::watchdog::{ContextWatchdog, WatchdogAdapter};

type Semaphore = LifecycleSemaphore<MountResult>;

#[derive(Default)]
struct Slots {
    current: Option<Semaphore>,
    retired: Vec<Semaphore>,
}

/// Binds one editor's lifecycle to a mount point.
pub struct EditorBinding {
    shared: Arc<BindingShared>,
    slots: Mutex<Slots>,
}

impl EditorBinding {
    /// Starts building a binding for `element`.
    pub fn builder(engine: Arc<dyn EditorEngine>, element: MountPoint) -> EditorBindingBuilder {
        EditorBindingBuilder {
            engine,
            element,
            props: EditorProps::default(),
            handler: Arc::new(NoopHandler),
            context: None,
            config: Config::default(),
        }
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_semaphore(&self) -> Semaphore {
        let slot = Arc::new(OnceLock::new());
        let sem = LifecycleSemaphore::new(
            self.shared.element.clone(),
            EditorLifecycle {
                shared: Arc::clone(&self.shared),
                semaphore: Arc::clone(&slot),
            },
        );
        let _ = slot.set(sem.downgrade());
        sem
    }

    /// The component appeared: create an editor. No-op while attached.
    ///
    /// Must be called inside a tokio runtime.
    pub fn attach(&self) {
        let mut slots = self.slots();
        if slots.current.is_none() {
            slots.current = Some(self.lock_semaphore());
        }
    }

    /// The component re-rendered with `props`.
    pub fn update(&self, props: EditorProps) {
        let previous = self.shared.replace_props(props.clone());

        if previous.identity_changed(&props) {
            let mut slots = self.slots();
            if let Some(old) = slots.current.take() {
                tracing::debug!(element = %self.shared.element, "editor identity changed, replacing editor");
                old.release();
                slots.retired.push(old);
                slots.current = Some(self.lock_semaphore());
            }
            return;
        }

        let current = self.slots().current.clone();
        let Some(sem) = current else {
            return;
        };
        sem.run_after_mount(move |value: MountResult| {
            let Some(editor) = value.instance else {
                return;
            };
            if previous.data != props.data && editor.get_data() != props.data {
                editor.set_data(&props.data);
            }
            if let Some(disabled) = props.disabled {
                set_read_only(&editor, disabled);
            }
        });
    }

    /// The component disappeared: destroy the editor.
    pub fn detach(&self) {
        let mut slots = self.slots();
        if let Some(sem) = slots.current.take() {
            sem.release();
            slots.retired.push(sem);
        }
    }

    /// `true` between [`attach`](Self::attach) and [`detach`](Self::detach).
    pub fn is_attached(&self) -> bool {
        self.slots().current.is_some()
    }

    /// The live editor, once created.
    pub fn editor(&self) -> Option<EditorRef> {
        self.value().and_then(|v| v.instance)
    }

    /// The watchdog owning the editor, unless disabled.
    pub fn watchdog(&self) -> Option<Arc<dyn WatchdogAdapter>> {
        self.value().and_then(|v| v.watchdog)
    }

    /// Latest props.
    pub fn props(&self) -> EditorProps {
        self.shared.props()
    }

    /// The mount point this binding attaches editors to.
    pub fn element(&self) -> &MountPoint {
        &self.shared.element
    }

    /// Semaphore backing the current editor.
    pub fn semaphore(&self) -> Option<LifecycleSemaphore<MountResult>> {
        self.slots().current.clone()
    }

    /// Waits until every editor this binding released is fully torn down.
    pub async fn settled(&self) {
        let retired = std::mem::take(&mut self.slots().retired);
        for sem in retired {
            sem.released().await;
        }
    }

    fn value(&self) -> Option<MountResult> {
        self.slots().current.as_ref().and_then(Semaphore::value)
    }
}

impl std::fmt::Debug for EditorBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBinding")
            .field("element", &self.shared.element)
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Builder for [`EditorBinding`].
pub struct EditorBindingBuilder {
    engine: Arc<dyn EditorEngine>,
    element: MountPoint,
    props: EditorProps,
    handler: Arc<dyn EditorHandler>,
    context: Option<ContextWatchdog>,
    config: Config,
}

impl EditorBindingBuilder {
    /// Initial props. Defaults to [`EditorProps::default`].
    pub fn with_props(mut self, props: EditorProps) -> Self {
        self.props = props;
        self
    }

    /// Consumer callbacks. Defaults to [`NoopHandler`].
    pub fn with_handler<H: EditorHandler>(mut self, handler: H) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    /// Runs the editor as an item of a shared watchdog instead of a dedicated one.
    pub fn with_context(mut self, context: &ContextWatchdog) -> Self {
        self.context = Some(context.clone());
        self
    }

    /// Teardown delay, bus capacity and default recovery policy.
    ///
    /// `EditorProps::watchdog_config` still takes precedence for the policy.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Finishes the binding. Nothing is created until [`EditorBinding::attach`].
    pub fn build(self) -> EditorBinding {
        EditorBinding {
            shared: Arc::new(BindingShared {
                engine: self.engine,
                handler: self.handler,
                props: RwLock::new(self.props),
                element: self.element,
                context: self.context,
                config: self.config,
            }),
            slots: Mutex::new(Slots::default()),
        }
    }
}
