//! Test helpers: journals, log capture, an in-memory editor engine.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing_subscriber::fmt::MakeWriter;

use crate::editor::{
    Editor, EditorConfig, EditorEngine, EditorEvent, EditorHandler, EditorListener, EditorRef,
    ErrorDetails,
};
use crate::error::EditorError;
use crate::events::{Event, EventKind};
use crate::lifecycle::{LifecycleSemaphore, MountPoint};
use crate::subscribers::Subscribe;
use crate::sync::Deferred;

/// Ordered, shareable record of what happened.
#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }
}

/// Fails the test if `fut` takes longer than five seconds.
pub(crate) async fn within<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("timed out waiting for background work")
}

/// Yields until `cond` holds (bounded by [`within`]).
pub(crate) async fn eventually(mut cond: impl FnMut() -> bool) {
    within(async {
        while !cond() {
            tokio::task::yield_now().await;
        }
    })
    .await;
}

/// Waits for the semaphore's first value.
pub(crate) async fn mounted<R>(sem: &LifecycleSemaphore<R>) -> R
where
    R: Clone + Send + Sync + 'static,
{
    let (tx, rx) = oneshot::channel();
    sem.run_after_mount(move |value: R| {
        let _ = tx.send(value);
    });
    within(rx).await.expect("semaphore dropped the callback")
}

#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Captured tracing output; capture stops when dropped.
pub(crate) struct LogCapture {
    logs: CapturedLogs,
    _guard: tracing::subscriber::DefaultGuard,
}

impl LogCapture {
    pub(crate) fn contents(&self) -> String {
        let logs = self.logs.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

/// Captures tracing output of the current thread (current-thread runtimes
/// run every spawned task on it).
pub(crate) fn capture_logs() -> LogCapture {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    LogCapture {
        logs,
        _guard: tracing::subscriber::set_default(subscriber),
    }
}

/// In-memory editor.
pub(crate) struct FakeEditor {
    id: String,
    data: Mutex<String>,
    locks: Mutex<BTreeSet<String>>,
    listeners: Mutex<Vec<EditorListener>>,
    destroyed: AtomicBool,
    fail_destroy: bool,
    journal: Journal,
}

impl FakeEditor {
    fn emit(&self, event: &EditorEvent) {
        let listeners = self.listeners.lock().unwrap().clone();
        for listener in listeners {
            listener(event);
        }
    }

    /// Simulates user typing.
    pub(crate) fn type_text(&self, data: &str) {
        *self.data.lock().unwrap() = data.to_string();
        self.emit(&EditorEvent::DataChanged);
    }

    pub(crate) fn focus(&self) {
        self.emit(&EditorEvent::Focus);
    }

    pub(crate) fn blur(&self) {
        self.emit(&EditorEvent::Blur);
    }

    /// Reports a runtime fault.
    pub(crate) fn crash(&self, error: &str) {
        self.emit(&EditorEvent::Fault(EditorError::Crashed {
            error: error.to_string(),
        }));
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Editor for FakeEditor {
    fn id(&self) -> &str {
        &self.id
    }

    fn get_data(&self) -> String {
        self.data.lock().unwrap().clone()
    }

    fn set_data(&self, data: &str) {
        self.journal.push(format!("set_data:{}:{data}", self.id));
        *self.data.lock().unwrap() = data.to_string();
    }

    fn enable_read_only_mode(&self, lock: &str) {
        self.locks.lock().unwrap().insert(lock.to_string());
    }

    fn disable_read_only_mode(&self, lock: &str) {
        self.locks.lock().unwrap().remove(lock);
    }

    fn is_read_only(&self) -> bool {
        !self.locks.lock().unwrap().is_empty()
    }

    fn listen(&self, listener: EditorListener) {
        self.listeners.lock().unwrap().push(listener);
    }

    async fn destroy(&self) -> Result<(), EditorError> {
        self.journal.push(format!("destroy:{}", self.id));
        self.destroyed.store(true, Ordering::SeqCst);
        if self.fail_destroy {
            return Err(EditorError::Destroy {
                error: format!("{} refused to die", self.id),
            });
        }
        Ok(())
    }
}

/// In-memory engine producing [`FakeEditor`]s named `ed1`, `ed2`, ...
#[derive(Clone, Default)]
pub(crate) struct FakeEngine {
    inner: Arc<EngineInner>,
}

#[derive(Default)]
struct EngineInner {
    journal: Journal,
    created: Mutex<Vec<Arc<FakeEditor>>>,
    fail_create: AtomicUsize,
    fail_destroy: AtomicBool,
    gate: Mutex<Option<Deferred>>,
}

impl FakeEngine {
    pub(crate) fn new(journal: &Journal) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                journal: journal.clone(),
                ..EngineInner::default()
            }),
        }
    }

    /// Makes the next `n` creations fail.
    pub(crate) fn fail_creates(&self, n: usize) {
        self.inner.fail_create.store(n, Ordering::SeqCst);
    }

    /// Editors created from now on fail to destroy.
    pub(crate) fn fail_destroys(&self) {
        self.inner.fail_destroy.store(true, Ordering::SeqCst);
    }

    /// Holds every creation until `gate` resolves.
    pub(crate) fn gate(&self, gate: &Deferred) {
        *self.inner.gate.lock().unwrap() = Some(gate.clone());
    }

    pub(crate) fn editors(&self) -> Vec<Arc<FakeEditor>> {
        self.inner.created.lock().unwrap().clone()
    }

    pub(crate) fn last(&self) -> Arc<FakeEditor> {
        self.editors().pop().expect("no editor created yet")
    }

    pub(crate) fn created(&self) -> usize {
        self.inner.created.lock().unwrap().len()
    }
}

#[async_trait]
impl EditorEngine for FakeEngine {
    async fn create(
        &self,
        element: MountPoint,
        config: EditorConfig,
    ) -> Result<EditorRef, EditorError> {
        let gate = self.inner.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.wait().await;
        }

        let refuse = self
            .inner
            .fail_create
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refuse {
            self.inner.journal.push("create_failed");
            return Err(EditorError::Create {
                error: "engine refused".into(),
            });
        }

        let mut created = self.inner.created.lock().unwrap();
        let editor = Arc::new(FakeEditor {
            id: format!("ed{}", created.len() + 1),
            data: Mutex::new(config.initial_data.unwrap_or_default()),
            locks: Mutex::default(),
            listeners: Mutex::default(),
            destroyed: AtomicBool::new(false),
            fail_destroy: self.inner.fail_destroy.load(Ordering::SeqCst),
            journal: self.inner.journal.clone(),
        });
        created.push(Arc::clone(&editor));
        drop(created);

        element.set_content(editor.get_data());
        self.inner.journal.push(format!("create:{}", editor.id));
        Ok(editor)
    }
}

/// Handler journaling every callback.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    pub(crate) journal: Journal,
}

impl Recorder {
    pub(crate) fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl EditorHandler for Recorder {
    fn on_ready(&self, editor: &EditorRef) {
        self.journal.push(format!("ready:{}", editor.id()));
    }

    fn on_change(&self, _event: &EditorEvent, editor: &EditorRef) {
        self.journal.push(format!("change:{}", editor.id()));
    }

    fn on_focus(&self, _event: &EditorEvent, editor: &EditorRef) {
        self.journal.push(format!("focus:{}", editor.id()));
    }

    fn on_blur(&self, _event: &EditorEvent, editor: &EditorRef) {
        self.journal.push(format!("blur:{}", editor.id()));
    }

    fn on_after_destroy(&self, editor: &EditorRef) {
        self.journal.push(format!("after_destroy:{}", editor.id()));
    }

    fn on_error(&self, _error: &EditorError, details: ErrorDetails) {
        self.journal.push(format!(
            "error:{}:{:?}",
            details.phase.as_label(),
            details.will_editor_restart
        ));
    }
}

/// Subscriber keeping every event it sees.
#[derive(Clone, Default)]
pub(crate) struct Collector {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Collector {
    pub(crate) fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Subscribe for Collector {
    async fn on_event(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}
