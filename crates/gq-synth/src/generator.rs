//! Fixture generator
//!
//! One generator serves every dataset. Each dataset implements
//! [`Synthesize`] to describe how its records are sampled; the generator
//! owns the RNG and the sampling parameters.

use crate::names::{
    CHAINS, CONTRACT_TITLES, COUNTERPARTIES, DEFAULT_ASSETS, ENTITY_LABELS, EXCHANGES,
    THREAT_CATEGORIES,
};
use chrono::{Duration as ChronoDuration, Utc};
use gq_core::{
    ContractStatus, ContractSummary, Contracts, CorrelationPair, CorrelationStrength,
    Correlations, Dataset, DatasetSnapshot, Entities, Entity, Exposure, Exposures, Severity,
    SnapshotSource, ThreatEvent, Threats, Trend,
};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Sampling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthParams {
    /// Records per dataset (correlation always covers the default universe)
    pub count: usize,
}

impl SynthParams {
    /// Create params with a record count
    #[inline]
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl Default for SynthParams {
    fn default() -> Self {
        Self { count: 12 }
    }
}

/// Dataset that can produce placeholder records
pub trait Synthesize: Dataset {
    /// Sample records the validator would accept
    fn synthesize<R: Rng + ?Sized>(rng: &mut R, params: &SynthParams) -> Vec<Self::Record>;
}

/// Parameterized fixture generator shared by all poll sessions
#[derive(Debug, Clone)]
pub struct FixtureGenerator {
    rng: StdRng,
    params: SynthParams,
}

impl FixtureGenerator {
    /// OS-seeded generator; output differs between runs
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            params: SynthParams::default(),
        }
    }

    /// Reproducible generator
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            params: SynthParams::default(),
        }
    }

    /// With sampling parameters
    #[inline]
    #[must_use]
    pub fn with_params(mut self, params: SynthParams) -> Self {
        self.params = params;
        self
    }

    /// Current parameters
    #[inline]
    #[must_use]
    pub fn params(&self) -> SynthParams {
        self.params
    }

    /// Sample records for dataset `D`
    pub fn generate<D: Synthesize>(&mut self) -> Vec<D::Record> {
        D::synthesize(&mut self.rng, &self.params)
    }

    /// Sample a synthetic snapshot with derived metrics
    pub fn snapshot<D: Synthesize>(&mut self) -> DatasetSnapshot<D> {
        let records = self.generate::<D>();
        D::snapshot(records, SnapshotSource::Synthetic)
    }
}

impl Default for FixtureGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn pick<R: Rng + ?Sized>(rng: &mut R, items: &[&str]) -> String {
    items.choose(rng).copied().unwrap_or_default().to_string()
}

fn hex_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let body: String = (0..20).map(|_| format!("{:02x}", rng.random::<u8>())).collect();
    format!("0x{body}")
}

impl Synthesize for Entities {
    fn synthesize<R: Rng + ?Sized>(rng: &mut R, params: &SynthParams) -> Vec<Entity> {
        (0..params.count)
            .map(|_| Entity {
                address: hex_address(rng),
                label: rng
                    .random_bool(0.6)
                    .then(|| pick(rng, &ENTITY_LABELS)),
                chain: pick(rng, &CHAINS),
                risk_score: round2(rng.random_range(0.0..=100.0)),
                trend: *Trend::ALL.choose(rng).unwrap_or(&Trend::Stable),
                volume_24h: round2(rng.random_range(10_000.0..50_000_000.0)),
            })
            .collect()
    }
}

impl Synthesize for Correlations {
    /// Always the full default universe: 45 unordered pairs over 10 assets
    fn synthesize<R: Rng + ?Sized>(rng: &mut R, _params: &SynthParams) -> Vec<CorrelationPair> {
        let mut pairs = Vec::with_capacity(DEFAULT_ASSETS.len() * (DEFAULT_ASSETS.len() - 1) / 2);
        for (i, a) in DEFAULT_ASSETS.iter().enumerate() {
            for b in &DEFAULT_ASSETS[i + 1..] {
                let coefficient = round2(rng.random_range(-0.3..=0.95));
                pairs.push(CorrelationPair {
                    asset_a: (*a).to_string(),
                    asset_b: (*b).to_string(),
                    coefficient,
                    strength: CorrelationStrength::classify(coefficient),
                });
            }
        }
        pairs
    }
}

impl Synthesize for Threats {
    /// Newest first, spread over the last 24 hours
    fn synthesize<R: Rng + ?Sized>(rng: &mut R, params: &SynthParams) -> Vec<ThreatEvent> {
        let now = Utc::now();
        let mut events: Vec<ThreatEvent> = (0..params.count)
            .map(|i| {
                let category = pick(rng, &THREAT_CATEGORIES);
                let chain = pick(rng, &CHAINS);
                ThreatEvent {
                    id: format!("synthetic-{i:04}"),
                    timestamp: now - ChronoDuration::minutes(rng.random_range(0..24 * 60)),
                    severity: *Severity::ALL.choose(rng).unwrap_or(&Severity::Low),
                    description: format!("{} activity detected on {}", category.replace('_', " "), chain),
                    category,
                    chain,
                    value_at_risk: round2(rng.random_range(0.0..5_000_000.0)),
                }
            })
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events
    }
}

impl Synthesize for Exposures {
    /// Shares are computed from the sampled amounts so they sum to ~100
    fn synthesize<R: Rng + ?Sized>(rng: &mut R, params: &SynthParams) -> Vec<Exposure> {
        let rows: Vec<(String, String, f64)> = (0..params.count)
            .map(|_| {
                (
                    pick(rng, &EXCHANGES),
                    pick(rng, &DEFAULT_ASSETS),
                    round2(rng.random_range(50_000.0..25_000_000.0)),
                )
            })
            .collect();
        let total: f64 = rows.iter().map(|(_, _, amount)| amount).sum();

        rows.into_iter()
            .map(|(exchange, asset, amount_usd)| Exposure {
                exchange,
                asset,
                amount_usd,
                share_pct: if total > 0.0 {
                    round2(amount_usd / total * 100.0).min(100.0)
                } else {
                    0.0
                },
            })
            .collect()
    }
}

impl Synthesize for Contracts {
    fn synthesize<R: Rng + ?Sized>(rng: &mut R, params: &SynthParams) -> Vec<ContractSummary> {
        let now = Utc::now();
        (0..params.count)
            .map(|i| ContractSummary {
                id: format!("synthetic-contract-{i:03}"),
                title: pick(rng, &CONTRACT_TITLES),
                counterparty: pick(rng, &COUNTERPARTIES),
                status: *ContractStatus::ALL
                    .choose(rng)
                    .unwrap_or(&ContractStatus::Draft),
                value_usd: round2(rng.random_range(5_000.0..2_000_000.0)),
                updated_at: now - ChronoDuration::hours(rng.random_range(0..24 * 30)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gq_core::CorrelationMatrix;

    #[test]
    fn correlation_covers_default_universe() {
        let mut generator = FixtureGenerator::seeded(7);
        let snapshot = generator.snapshot::<Correlations>();

        assert_eq!(snapshot.records.len(), 45);
        assert!(snapshot.is_synthetic());

        let matrix = CorrelationMatrix::from_pairs(&snapshot.records);
        assert_eq!(matrix.size(), 10);
        for i in 0..10 {
            assert_eq!(matrix.values[i][i], 1.0);
            for j in 0..10 {
                assert_eq!(matrix.values[i][j], matrix.values[j][i]);
            }
        }
        assert_eq!(matrix.assets, DEFAULT_ASSETS.map(String::from).to_vec());
    }

    #[test]
    fn record_count_follows_params() {
        let mut generator = FixtureGenerator::seeded(1).with_params(SynthParams::new(5));
        assert_eq!(generator.generate::<Entities>().len(), 5);
        assert_eq!(generator.generate::<Threats>().len(), 5);
        assert_eq!(generator.generate::<Exposures>().len(), 5);
        assert_eq!(generator.generate::<Contracts>().len(), 5);
    }

    #[test]
    fn seeded_generators_agree() {
        let a = FixtureGenerator::seeded(99).generate::<Correlations>();
        let b = FixtureGenerator::seeded(99).generate::<Correlations>();
        assert_eq!(a, b);
    }

    #[test]
    fn metrics_derived_from_records() {
        let mut generator = FixtureGenerator::seeded(3);
        let snapshot = generator.snapshot::<Entities>();
        assert_eq!(snapshot.metrics, Entities::summarize(&snapshot.records));
        assert_eq!(snapshot.metrics.count, snapshot.records.len());
    }

    #[test]
    fn threats_sorted_newest_first() {
        let events = FixtureGenerator::seeded(11).generate::<Threats>();
        assert!(events.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn exposure_shares_bounded() {
        let rows = FixtureGenerator::seeded(5).generate::<Exposures>();
        let total: f64 = rows.iter().map(|r| r.share_pct).sum();
        assert!(rows.iter().all(|r| (0.0..=100.0).contains(&r.share_pct)));
        assert!((total - 100.0).abs() < 1.0);
    }

    #[test]
    fn zero_count_yields_empty_records() {
        let mut generator = FixtureGenerator::seeded(2).with_params(SynthParams::new(0));
        let snapshot = generator.snapshot::<Exposures>();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.metrics.total_usd, 0.0);
    }
}
