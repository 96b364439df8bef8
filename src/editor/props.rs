//! Editor configuration and binding props.

use std::collections::BTreeMap;

use crate::watchdog::WatchdogConfig;

/// Configuration handed to [`EditorEngine::create`](crate::EditorEngine::create).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditorConfig {
    /// Document the editor starts with.
    pub initial_data: Option<String>,
    /// Engine-specific options, passed through untouched.
    pub options: BTreeMap<String, String>,
}

impl EditorConfig {
    /// Sets the initial document.
    pub fn with_initial_data(mut self, data: impl Into<String>) -> Self {
        self.initial_data = Some(data.into());
        self
    }

    /// Adds an engine option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Inputs of an [`EditorBinding`](crate::EditorBinding), as the rendering
/// framework passes them on every render.
///
/// `id` and `disable_watchdog` form the binding's identity: changing either
/// replaces the editor. Every other field is applied to the live editor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorProps {
    /// Identity of the editor; a new value recreates it.
    pub id: Option<String>,
    /// Document the editor should hold.
    pub data: String,
    /// `Some(true)` puts the editor in read-only mode, `Some(false)` lifts it.
    pub disabled: Option<bool>,
    /// Configuration passed to the engine.
    pub config: EditorConfig,
    /// Create the editor directly, without crash recovery.
    pub disable_watchdog: bool,
    /// Per-binding override of the recovery policy.
    pub watchdog_config: Option<WatchdogConfig>,
}

impl EditorProps {
    /// Props holding `data`.
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    /// Engine configuration with the initial document resolved.
    ///
    /// `config.initial_data` wins over `data`; setting both logs a warning.
    pub fn resolved_config(&self) -> EditorConfig {
        let mut config = self.config.clone();
        match &config.initial_data {
            Some(_) if !self.data.is_empty() => {
                tracing::warn!(
                    "editor initial data is set both in config.initial_data and data; \
                     config.initial_data is used"
                );
            }
            Some(_) => {}
            None => config.initial_data = Some(self.data.clone()),
        }
        config
    }

    /// `true` when switching from `self` to `next` needs a new editor.
    pub(crate) fn identity_changed(&self, next: &EditorProps) -> bool {
        self.id != next.id || self.disable_watchdog != next.disable_watchdog
    }
}
