//! GhostQuant Core - domain model for dashboard data
//!
//! Shared by every other crate in the workspace:
//! - Domain records for each dashboard panel
//! - The [`Dataset`] trait binding records to endpoints and metric reducers
//! - Snapshots (records + metrics + provenance)
//! - Query filters and client configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use gq_core::{ClientConfig, Correlations, Dataset, SnapshotSource};
//!
//! let config = ClientConfig::from_env()?;
//! let url = config.endpoint_url(Correlations::KIND.endpoint());
//!
//! let snapshot = Correlations::snapshot(pairs, SnapshotSource::Live);
//! println!("{} pairs, avg r = {}", snapshot.len(), snapshot.metrics.avg_coefficient);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod query;
pub mod snapshot;
pub mod types;

pub use config::{ClientConfig, DEFAULT_API_BASE};
pub use dataset::{
    ContractMetrics, Contracts, CorrelationMatrix, CorrelationMetrics, Correlations, Dataset,
    DatasetKind, Entities, EntityMetrics, ExposureMetrics, Exposures, ThreatMetrics, Threats,
};
pub use error::{ConfigError, UnknownDatasetError};
pub use query::Query;
pub use snapshot::{Snapshot, SnapshotSource};
pub use types::{
    ContractStatus, ContractSummary, CorrelationPair, CorrelationStrength, Entity, Exposure,
    Severity, ThreatEvent, Trend,
};

/// Snapshot type for a dataset
pub type DatasetSnapshot<D> = Snapshot<<D as Dataset>::Record, <D as Dataset>::Metrics>;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with dashboard datasets
    pub use crate::{
        ClientConfig, Dataset, DatasetKind, DatasetSnapshot, Query, Snapshot, SnapshotSource,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
