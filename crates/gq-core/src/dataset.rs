//! Dataset catalog
//!
//! A dataset binds a record type to its endpoint, its payload array key and
//! the reducer that derives summary-card metrics from the records. Marker
//! types (`Entities`, `Correlations`, ...) implement [`Dataset`] so the
//! validator, synthesizer and poll controller can stay generic.

use crate::error::UnknownDatasetError;
use crate::snapshot::{Snapshot, SnapshotSource};
use crate::types::{
    ContractStatus, ContractSummary, CorrelationPair, CorrelationStrength, Entity, Exposure,
    Severity, ThreatEvent,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::str::FromStr;
use std::time::Duration;

/// Risk score at or above which an entity counts as high risk
pub const HIGH_RISK_THRESHOLD: f64 = 70.0;

/// Kind of dashboard dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Tracked entities
    Entities,
    /// Correlation matrix pairs
    Correlation,
    /// Threat timeline
    Threats,
    /// Exchange exposures
    Exposures,
    /// Contract negotiation list
    Contracts,
}

impl DatasetKind {
    /// Every dataset kind
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::Entities,
        DatasetKind::Correlation,
        DatasetKind::Threats,
        DatasetKind::Exposures,
        DatasetKind::Contracts,
    ];

    /// Short name used on the command line and in export filenames
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entities => "entities",
            Self::Correlation => "correlation",
            Self::Threats => "threats",
            Self::Exposures => "exposures",
            Self::Contracts => "contracts",
        }
    }

    /// Endpoint path relative to the API base
    #[must_use]
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Entities => "/gq-core/entities",
            Self::Correlation => "/gq-core/correlation/matrix",
            Self::Threats => "/gq-core/threats/timeline",
            Self::Exposures => "/gq-core/exposures",
            Self::Contracts => "/contracts/list",
        }
    }

    /// Object key holding the record array in a response payload
    #[must_use]
    pub fn array_key(&self) -> &'static str {
        match self {
            Self::Entities => "entities",
            Self::Correlation => "pairs",
            Self::Threats => "events",
            Self::Exposures => "exposures",
            Self::Contracts => "contracts",
        }
    }

    /// Poll interval used when the configuration does not override it
    #[must_use]
    pub fn default_poll_interval(&self) -> Duration {
        let secs = match self {
            Self::Threats => 10,
            Self::Entities | Self::Exposures => 30,
            Self::Correlation | Self::Contracts => 60,
        };
        Duration::from_secs(secs)
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = UnknownDatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDatasetError(s.to_string()))
    }
}

/// Typed dataset served by one endpoint
pub trait Dataset: Send + Sync + 'static {
    /// One row of the dataset
    type Record: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Aggregate metrics shown on summary cards
    type Metrics: Clone + Debug + Default + PartialEq + Serialize + Send + Sync + 'static;

    /// Catalog entry
    const KIND: DatasetKind;

    /// Reduce records to metrics. Must return zeros for an empty slice.
    fn summarize(records: &[Self::Record]) -> Self::Metrics;

    /// Build a snapshot whose metrics are derived from `records`
    fn snapshot(
        records: Vec<Self::Record>,
        source: SnapshotSource,
    ) -> Snapshot<Self::Record, Self::Metrics>
    where
        Self: Sized,
    {
        let metrics = Self::summarize(&records);
        Snapshot::new(records, metrics, source)
    }
}

/// Mean that yields 0 for an empty set
#[inline]
fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Max/min that yield 0 for an empty set
fn extrema(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((max, min)) => Some((max.max(v), min.min(v))),
        })
        .unwrap_or((0.0, 0.0))
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Tracked entities dataset
#[derive(Debug, Clone, Copy, Default)]
pub struct Entities;

/// Entity summary metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetrics {
    /// Number of entities
    pub count: usize,
    /// Sum of 24h volume
    pub total_volume: f64,
    /// Mean risk score
    pub avg_risk: f64,
    /// Highest risk score
    pub max_risk: f64,
    /// Entities at or above [`HIGH_RISK_THRESHOLD`]
    pub high_risk_count: usize,
}

impl Dataset for Entities {
    type Record = Entity;
    type Metrics = EntityMetrics;
    const KIND: DatasetKind = DatasetKind::Entities;

    fn summarize(records: &[Entity]) -> EntityMetrics {
        let risk_sum: f64 = records.iter().map(|e| e.risk_score).sum();
        let (max_risk, _) = extrema(records.iter().map(|e| e.risk_score));
        EntityMetrics {
            count: records.len(),
            total_volume: records.iter().map(|e| e.volume_24h).sum(),
            avg_risk: mean(risk_sum, records.len()),
            max_risk,
            high_risk_count: records
                .iter()
                .filter(|e| e.risk_score >= HIGH_RISK_THRESHOLD)
                .count(),
        }
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Correlation matrix dataset
#[derive(Debug, Clone, Copy, Default)]
pub struct Correlations;

/// Correlation summary metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMetrics {
    /// Number of pairs
    pub pair_count: usize,
    /// Mean coefficient
    pub avg_coefficient: f64,
    /// Largest coefficient
    pub max_coefficient: f64,
    /// Smallest coefficient
    pub min_coefficient: f64,
    /// Pairs bucketed as strong
    pub strong_pair_count: usize,
}

impl Dataset for Correlations {
    type Record = CorrelationPair;
    type Metrics = CorrelationMetrics;
    const KIND: DatasetKind = DatasetKind::Correlation;

    fn summarize(records: &[CorrelationPair]) -> CorrelationMetrics {
        let sum: f64 = records.iter().map(|p| p.coefficient).sum();
        let (max, min) = extrema(records.iter().map(|p| p.coefficient));
        CorrelationMetrics {
            pair_count: records.len(),
            avg_coefficient: mean(sum, records.len()),
            max_coefficient: max,
            min_coefficient: min,
            strong_pair_count: records
                .iter()
                .filter(|p| p.strength == CorrelationStrength::Strong)
                .count(),
        }
    }
}

/// Square correlation matrix rebuilt from pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Row/column labels in first-appearance order
    pub assets: Vec<String>,
    /// Row-major coefficients
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Build a symmetric matrix with a unit diagonal.
    ///
    /// Cells with no matching pair are 0.0.
    #[must_use]
    pub fn from_pairs(pairs: &[CorrelationPair]) -> Self {
        let mut assets: Vec<String> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for pair in pairs {
            for asset in [&pair.asset_a, &pair.asset_b] {
                if !index.contains_key(asset.as_str()) {
                    index.insert(asset.as_str(), assets.len());
                    assets.push(asset.clone());
                }
            }
        }

        let n = assets.len();
        let mut values = vec![vec![0.0; n]; n];
        for (i, row) in values.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        for pair in pairs {
            let a = index[pair.asset_a.as_str()];
            let b = index[pair.asset_b.as_str()];
            if a != b {
                values[a][b] = pair.coefficient;
                values[b][a] = pair.coefficient;
            }
        }

        Self { assets, values }
    }

    /// Number of rows (and columns)
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.assets.len()
    }

    /// Coefficient between two assets
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.assets.iter().position(|x| x == a)?;
        let j = self.assets.iter().position(|x| x == b)?;
        Some(self.values[i][j])
    }
}

// ---------------------------------------------------------------------------
// Threats
// ---------------------------------------------------------------------------

/// Threat timeline dataset
#[derive(Debug, Clone, Copy, Default)]
pub struct Threats;

/// Threat summary metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreatMetrics {
    /// Number of events
    pub count: usize,
    /// Critical events
    pub critical: usize,
    /// High severity events
    pub high: usize,
    /// Medium severity events
    pub medium: usize,
    /// Low severity events
    pub low: usize,
    /// Sum of value at risk
    pub total_value_at_risk: f64,
}

impl Dataset for Threats {
    type Record = ThreatEvent;
    type Metrics = ThreatMetrics;
    const KIND: DatasetKind = DatasetKind::Threats;

    fn summarize(records: &[ThreatEvent]) -> ThreatMetrics {
        let mut metrics = ThreatMetrics {
            count: records.len(),
            ..ThreatMetrics::default()
        };
        for event in records {
            match event.severity {
                Severity::Critical => metrics.critical += 1,
                Severity::High => metrics.high += 1,
                Severity::Medium => metrics.medium += 1,
                Severity::Low => metrics.low += 1,
            }
            metrics.total_value_at_risk += event.value_at_risk;
        }
        metrics
    }
}

// ---------------------------------------------------------------------------
// Exposures
// ---------------------------------------------------------------------------

/// Exchange exposure dataset
#[derive(Debug, Clone, Copy, Default)]
pub struct Exposures;

/// Exposure summary metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureMetrics {
    /// Number of exposure rows
    pub count: usize,
    /// Total USD exposure
    pub total_usd: f64,
    /// Exchange with the largest aggregate exposure
    pub max_exchange: Option<String>,
    /// That exchange's aggregate exposure
    pub max_exchange_usd: f64,
    /// Distinct exchanges
    pub exchange_count: usize,
}

impl Dataset for Exposures {
    type Record = Exposure;
    type Metrics = ExposureMetrics;
    const KIND: DatasetKind = DatasetKind::Exposures;

    fn summarize(records: &[Exposure]) -> ExposureMetrics {
        // BTreeMap keeps ties deterministic (alphabetically first wins)
        let mut per_exchange: BTreeMap<&str, f64> = BTreeMap::new();
        for row in records {
            *per_exchange.entry(row.exchange.as_str()).or_insert(0.0) += row.amount_usd;
        }

        let top = per_exchange
            .iter()
            .fold(None, |best: Option<(&str, f64)>, (name, total)| match best {
                Some((_, best_total)) if best_total >= *total => best,
                _ => Some((name, *total)),
            });

        ExposureMetrics {
            count: records.len(),
            total_usd: records.iter().map(|r| r.amount_usd).sum(),
            max_exchange: top.map(|(name, _)| name.to_string()),
            max_exchange_usd: top.map_or(0.0, |(_, total)| total),
            exchange_count: per_exchange.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Contract negotiation dataset
#[derive(Debug, Clone, Copy, Default)]
pub struct Contracts;

/// Contract summary metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractMetrics {
    /// Number of contracts
    pub count: usize,
    /// Sum of contract values
    pub total_value_usd: f64,
    /// Signed contracts
    pub signed_count: usize,
    /// Contracts still in progress
    pub open_count: usize,
    /// Mean contract value
    pub avg_value_usd: f64,
}

impl Dataset for Contracts {
    type Record = ContractSummary;
    type Metrics = ContractMetrics;
    const KIND: DatasetKind = DatasetKind::Contracts;

    fn summarize(records: &[ContractSummary]) -> ContractMetrics {
        let total: f64 = records.iter().map(|c| c.value_usd).sum();
        ContractMetrics {
            count: records.len(),
            total_value_usd: total,
            signed_count: records
                .iter()
                .filter(|c| c.status == ContractStatus::Signed)
                .count(),
            open_count: records.iter().filter(|c| c.status.is_open()).count(),
            avg_value_usd: mean(total, records.len()),
        }
    }
}
