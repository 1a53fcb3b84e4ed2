//! View state published by a poll session
//!
//! The whole struct is replaced under the watch channel's lock, so a
//! subscriber never sees a snapshot from one cycle paired with the status or
//! error of another.

use chrono::{DateTime, Utc};
use gq_core::Snapshot;
use std::sync::Arc;

/// Lifecycle phase of a poll session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollPhase {
    /// Created, not started
    Idle,
    /// Request in flight
    Loading,
    /// Holding live data
    Populated,
    /// Holding synthetic data
    Synthetic,
    /// Stopped; no further commits
    Terminal,
}

impl PollPhase {
    /// Whether the session has stopped
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }
}

/// Data freshness indicator shown next to a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataStatus {
    /// Backend data
    Live,
    /// Placeholder data after a failure
    Synthetic,
    /// Failure with synthesis disabled; previous snapshot retained
    Error,
}

impl DataStatus {
    /// Lowercase label
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Synthetic => "synthetic",
            Self::Error => "error",
        }
    }
}

/// Everything a view needs to render one panel
#[derive(Debug, Clone)]
pub struct ViewState<R, M> {
    /// Lifecycle phase
    pub phase: PollPhase,
    /// Status of the committed snapshot, `None` before the first commit
    pub status: Option<DataStatus>,
    /// Committed snapshot
    pub snapshot: Option<Arc<Snapshot<R, M>>>,
    /// Message from the most recent failure, cleared on live data
    pub last_error: Option<String>,
    /// Sequence number of the request that produced this state
    pub generation: u64,
    /// Commit time
    pub updated_at: Option<DateTime<Utc>>,
}

impl<R, M> ViewState<R, M> {
    /// Initial state
    #[must_use]
    pub fn idle() -> Self {
        Self {
            phase: PollPhase::Idle,
            status: None,
            snapshot: None,
            last_error: None,
            generation: 0,
            updated_at: None,
        }
    }

    /// Whether a loading indicator should show
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == PollPhase::Loading
    }

    /// Number of visible records
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |s| s.len())
    }
}

impl<R, M> Default for ViewState<R, M> {
    fn default() -> Self {
        Self::idle()
    }
}
