//! Interactive session: selection, one summarize action, display, reset.
//!
//! The state is a single enum value that is replaced on every transition,
//! never patched field by field:
//!
//! ```text
//!            select                summarize
//!   Idle ───────────▶ Idle ───────────────▶ Busy ──┬── ok ──▶ Summarized
//!    ▲                 ▲                            │
//!    │                 └────────── error ───────────┘
//!    └──────────────── reset ◀───────────────────────────── (any)
//! ```
//!
//! A fatal error returns the session to `Idle` with the selection retained and
//! a user-facing message attached. So does dropping a summarize future before
//! it completes (a timeout or Ctrl-C). Summary and blocks live until the next
//! `select` or `reset`.

use crate::config::SummaryConfig;
use crate::error::SummaryError;
use crate::output::SummaryOutput;
use crate::pipeline::input::SelectedFile;
use crate::pipeline::llm::GenerationBackend;
use crate::pipeline::render::PdfEngine;
use crate::summarize::{resolve_backend, resolve_engine, summarize_with};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Error recorded when a summarize action is dropped before it finishes.
pub const CANCELLED_MESSAGE: &str = "Summary was cancelled.";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// Waiting for a summarize action. `error` holds the message of the last
    /// failed attempt, if any.
    Idle {
        files: Vec<SelectedFile>,
        error: Option<String>,
    },
    /// A summarize action is running on `files`.
    Busy { files: Vec<SelectedFile> },
    /// The model answered.
    Summarized {
        files: Vec<SelectedFile>,
        output: SummaryOutput,
    },
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle {
            files: Vec::new(),
            error: None,
        }
    }
}

impl SessionState {
    /// The current selection.
    pub fn files(&self) -> &[SelectedFile] {
        match self {
            SessionState::Idle { files, .. }
            | SessionState::Busy { files }
            | SessionState::Summarized { files, .. } => files,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::Idle { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    pub fn output(&self) -> Option<&SummaryOutput> {
        match self {
            SessionState::Summarized { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// One user session.
///
/// Owns the configuration plus the backend and PDF engine resolved from it.
/// All transitions take `&mut self`, so two summarize actions can never
/// overlap on the same session.
pub struct Session {
    config: SummaryConfig,
    backend: Arc<dyn GenerationBackend>,
    engine: Arc<dyn PdfEngine>,
    state: SessionState,
}

impl Session {
    /// Start a session.
    ///
    /// # Errors
    /// [`SummaryError::MissingCredential`] or
    /// [`SummaryError::ProviderNotConfigured`] when no backend can be built.
    pub fn new(config: SummaryConfig) -> Result<Self, SummaryError> {
        let backend = resolve_backend(&config)?;
        let engine = resolve_engine(&config);
        Ok(Self {
            config,
            backend,
            engine,
            state: SessionState::default(),
        })
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SessionState::Busy { .. })
    }

    /// Replace the selection. Any previous summary or error is discarded.
    pub fn select(&mut self, files: Vec<SelectedFile>) {
        info!("Selected {} file(s)", files.len());
        self.state = SessionState::Idle { files, error: None };
    }

    /// Run one summarize action over the current selection.
    ///
    /// Never fails: a fatal error is logged and recorded in
    /// the `Idle` state's `error`, keeping the selection for another try.
    pub async fn summarize(&mut self) -> &SessionState {
        let files = match std::mem::take(&mut self.state) {
            SessionState::Idle { files, .. } | SessionState::Summarized { files, .. } => files,
            busy @ SessionState::Busy { .. } => {
                self.state = busy;
                return &self.state;
            }
        };

        let guard = BusyGuard::enter(&mut self.state, files.clone());

        let result = summarize_with(&files, &self.backend, &self.engine, &self.config).await;

        guard.leave(match result {
            Ok(output) => SessionState::Summarized { files, output },
            Err(e) => {
                error!("Summarize failed: {}", e);
                SessionState::Idle {
                    files,
                    error: Some(e.to_string()),
                }
            }
        });
        &self.state
    }

    /// Clear selection, summary and error.
    pub fn reset(&mut self) {
        self.state = SessionState::default();
    }
}

/// Holds the session in `Busy` for the duration of one summarize action.
///
/// If the action is dropped before [`BusyGuard::leave`], the state falls back
/// to `Idle` with the selection and [`CANCELLED_MESSAGE`].
struct BusyGuard<'a> {
    state: &'a mut SessionState,
    done: bool,
}

impl<'a> BusyGuard<'a> {
    fn enter(state: &'a mut SessionState, files: Vec<SelectedFile>) -> Self {
        *state = SessionState::Busy { files };
        Self { state, done: false }
    }

    fn leave(mut self, next: SessionState) {
        *self.state = next;
        self.done = true;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let SessionState::Busy { files } = std::mem::take(self.state) {
            warn!("Summarize of {} file(s) was cancelled", files.len());
            *self.state = SessionState::Idle {
                files,
                error: Some(CANCELLED_MESSAGE.to_string()),
            };
        }
    }
}
