//! # LogWriter: watchdog event logger
//!
//! A minimal subscriber that renders incoming [`Event`]s through `tracing::info!`.
//!
//! ## Example output
//! ```text
//! [created] item=Some("editor-1") attempt=0
//! [crashed] item=Some("editor-1") err=editor crashed: boom restart=true
//! [restart-scheduled] item=Some("editor-1") attempt=1 delay_ms=0
//! [restarted] item=Some("editor-1") attempt=1
//! [crashed-permanently] item=None err=editor crashed: boom
//! [destroyed] item=None
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let err = e.error.as_ref().map(ToString::to_string);
        match e.kind {
            EventKind::EditorCreated => {
                tracing::info!("[created] item={:?} attempt={:?}", e.item, e.attempt);
            }
            EventKind::EditorCrashed => {
                tracing::info!(
                    "[crashed] item={:?} err={} restart={:?}",
                    e.item,
                    err.as_deref().unwrap_or("unknown"),
                    e.causes_restart
                );
            }
            EventKind::RestartScheduled => {
                tracing::info!(
                    "[restart-scheduled] item={:?} attempt={:?} delay_ms={:?}",
                    e.item,
                    e.attempt,
                    e.delay_ms
                );
            }
            EventKind::EditorRestarted => {
                tracing::info!("[restarted] item={:?} attempt={:?}", e.item, e.attempt);
            }
            EventKind::CrashedPermanently => {
                tracing::info!(
                    "[crashed-permanently] item={:?} err={}",
                    e.item,
                    err.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::WatchdogDestroyed => {
                tracing::info!("[destroyed] item={:?}", e.item);
            }
            EventKind::ItemAdded => {
                tracing::info!("[item-added] item={:?}", e.item);
            }
            EventKind::ItemRemoved => {
                tracing::info!("[item-removed] item={:?}", e.item);
            }
            EventKind::SubscriberOverflow => {
                tracing::info!("[subscriber-overflow] {:?}", e.reason);
            }
            EventKind::SubscriberPanicked => {
                tracing::info!(
                    "[subscriber-panicked] {}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditorError;
    use crate::testing::capture_logs;

    #[tokio::test]
    async fn crash_line_names_item_error_and_decision() {
        let logs = capture_logs();
        let ev = Event::new(EventKind::EditorCrashed)
            .with_item("editor-1")
            .with_error(EditorError::Crashed {
                error: "boom".into(),
            })
            .with_causes_restart(true);

        LogWriter::new().on_event(&ev).await;

        let out = logs.contents();
        assert!(out.contains("INFO"));
        assert!(out.contains(
            r#"[crashed] item=Some("editor-1") err=editor crashed: boom restart=Some(true)"#
        ));
    }

    #[tokio::test]
    async fn destroyed_line_without_item() {
        let logs = capture_logs();
        LogWriter::new()
            .on_event(&Event::new(EventKind::WatchdogDestroyed))
            .await;
        assert!(logs.contents().contains("[destroyed] item=None"));
    }
}
