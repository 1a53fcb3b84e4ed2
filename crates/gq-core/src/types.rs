//! Domain record types for dashboard datasets
//!
//! Each record mirrors one row of a dashboard panel:
//! - Tracked entities (wallets, contracts) with risk and trend
//! - Asset correlation pairs
//! - Threat timeline events
//! - Exchange exposures
//! - Contract negotiation summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of an entity's recent activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Activity increasing
    Up,
    /// Activity decreasing
    Down,
    /// No significant change
    Stable,
}

impl Trend {
    /// All variants in display order
    pub const ALL: [Trend; 3] = [Trend::Up, Trend::Down, Trend::Stable];

    /// Lowercase wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

/// Tracked on-chain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Wallet or contract address
    pub address: String,
    /// Human-readable label, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Chain the entity lives on
    pub chain: String,
    /// Risk score in `0..=100`
    #[serde(alias = "riskScore")]
    pub risk_score: f64,
    /// Activity trend
    pub trend: Trend,
    /// Trailing 24h volume in USD
    #[serde(alias = "volume24h")]
    pub volume_24h: f64,
}

/// Qualitative bucket for a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    /// |r| < 0.4
    Weak,
    /// 0.4 <= |r| < 0.7
    Moderate,
    /// |r| >= 0.7
    Strong,
}

impl CorrelationStrength {
    /// Bucket a coefficient by magnitude
    #[must_use]
    pub fn classify(coefficient: f64) -> Self {
        let magnitude = coefficient.abs();
        if magnitude >= 0.7 {
            Self::Strong
        } else if magnitude >= 0.4 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }

    /// Lowercase wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }
}

/// Correlation between two assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    /// First asset ticker
    #[serde(alias = "assetA")]
    pub asset_a: String,
    /// Second asset ticker
    #[serde(alias = "assetB")]
    pub asset_b: String,
    /// Pearson coefficient in `[-1, 1]`
    pub coefficient: f64,
    /// Strength bucket reported by the backend
    pub strength: CorrelationStrength,
}

/// Threat severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Low,
    /// Worth watching
    Medium,
    /// Needs attention
    High,
    /// Active incident
    Critical,
}

impl Severity {
    /// All variants, least severe first
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Lowercase wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Event on the threat timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatEvent {
    /// Event identifier
    pub id: String,
    /// When the event was observed
    pub timestamp: DateTime<Utc>,
    /// Severity level
    pub severity: Severity,
    /// Category, e.g. `wash_trading`
    pub category: String,
    /// Chain the event occurred on
    pub chain: String,
    /// Free-form summary
    pub description: String,
    /// USD value at risk
    #[serde(alias = "valueAtRisk")]
    pub value_at_risk: f64,
}

/// Holdings of one asset on one exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exposure {
    /// Exchange name
    pub exchange: String,
    /// Asset ticker
    pub asset: String,
    /// Exposure in USD
    #[serde(alias = "amountUsd")]
    pub amount_usd: f64,
    /// Share of total exposure, percent
    #[serde(alias = "sharePct")]
    pub share_pct: f64,
}

/// Lifecycle status of a negotiated contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Being drafted
    Draft,
    /// Terms under negotiation
    Negotiating,
    /// Awaiting sign-off
    PendingApproval,
    /// Executed
    Signed,
    /// Lapsed
    Expired,
}

impl ContractStatus {
    /// All variants in lifecycle order
    pub const ALL: [ContractStatus; 5] = [
        ContractStatus::Draft,
        ContractStatus::Negotiating,
        ContractStatus::PendingApproval,
        ContractStatus::Signed,
        ContractStatus::Expired,
    ];

    /// Whether the contract still needs work
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            Self::Draft | Self::Negotiating | Self::PendingApproval
        )
    }

    /// snake_case wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Negotiating => "negotiating",
            Self::PendingApproval => "pending_approval",
            Self::Signed => "signed",
            Self::Expired => "expired",
        }
    }
}

/// Row of the contract negotiation list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSummary {
    /// Contract identifier
    pub id: String,
    /// Contract title
    pub title: String,
    /// Other party
    pub counterparty: String,
    /// Lifecycle status
    pub status: ContractStatus,
    /// Contract value in USD
    #[serde(alias = "valueUsd")]
    pub value_usd: f64,
    /// Last modification time
    #[serde(alias = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
