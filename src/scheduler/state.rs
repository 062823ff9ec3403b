//! Controller state machine and shared status.
//!
//! # States
//! ```text
//! Starting ──daemon started──▶ Running ──signal──▶ Stopping ──▶ Stopped
//!     └──────────daemon start failed─────────────────────────▶ Stopped
//! ```

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwapOption;
use serde::Serialize;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl ControllerState {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: ControllerState) -> bool {
        use ControllerState::*;
        matches!(
            (self, next),
            (Starting, Running) | (Starting, Stopped) | (Running, Stopping) | (Stopping, Stopped)
        )
    }
}

/// Summary of the most recent reconciliation cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub finished_at: u64,
    pub outcome: &'static str,
    pub table_version: u64,
    pub error: Option<String>,
}

impl CycleSummary {
    pub fn new(outcome: &'static str, table_version: u64, error: Option<String>) -> Self {
        let finished_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            finished_at,
            outcome,
            table_version,
            error,
        }
    }
}

/// Lifecycle state plus last-cycle summary, readable from anywhere.
#[derive(Debug)]
pub struct StatusBoard {
    state: watch::Sender<ControllerState>,
    last_cycle: ArcSwapOption<CycleSummary>,
}

impl StatusBoard {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ControllerState::Starting);
        Self {
            state,
            last_cycle: ArcSwapOption::empty(),
        }
    }

    pub fn state(&self) -> ControllerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    /// Move to `next`. Illegal transitions are logged and ignored.
    pub fn transition(&self, next: ControllerState) -> bool {
        let current = self.state();
        if !current.can_transition_to(next) {
            tracing::warn!(from = ?current, to = ?next, "Ignoring invalid state transition");
            return false;
        }
        self.state.send_replace(next);
        tracing::info!(from = ?current, to = ?next, "Controller state changed");
        true
    }

    pub fn record_cycle(&self, summary: CycleSummary) {
        self.last_cycle.store(Some(Arc::new(summary)));
    }

    pub fn last_cycle(&self) -> Option<Arc<CycleSummary>> {
        self.last_cycle.load_full()
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}
