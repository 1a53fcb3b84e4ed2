//! Snapshot: one complete dataset plus derived metrics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a snapshot's records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    /// Accepted backend response
    Live,
    /// Locally generated placeholder data
    Synthetic,
}

impl SnapshotSource {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Synthetic => "synthetic",
        }
    }
}

/// Timestamped, internally consistent dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<R, M> {
    /// Domain records
    pub records: Vec<R>,
    /// Aggregate metrics derived from `records`
    pub metrics: M,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Live or synthetic
    pub source: SnapshotSource,
}

impl<R, M> Snapshot<R, M> {
    /// Create a snapshot stamped with the current time
    #[inline]
    #[must_use]
    pub fn new(records: Vec<R>, metrics: M, source: SnapshotSource) -> Self {
        Self {
            records,
            metrics,
            timestamp: Utc::now(),
            source,
        }
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the records are placeholder data
    #[inline]
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.source == SnapshotSource::Synthetic
    }
}
