//! Flattening records into table rows

use gq_core::{ContractSummary, CorrelationPair, Entity, Exposure, ThreatEvent};

/// Record that can be laid out as one table row
pub trait Tabular {
    /// Column headers, in cell order
    fn headers() -> &'static [&'static str];

    /// Cells for this record, one per header
    fn row(&self) -> Vec<String>;
}

impl Tabular for Entity {
    fn headers() -> &'static [&'static str] {
        &["address", "label", "chain", "risk_score", "trend", "volume_24h"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.address.clone(),
            self.label.clone().unwrap_or_default(),
            self.chain.clone(),
            self.risk_score.to_string(),
            self.trend.as_str().to_string(),
            self.volume_24h.to_string(),
        ]
    }
}

impl Tabular for CorrelationPair {
    fn headers() -> &'static [&'static str] {
        &["asset_a", "asset_b", "coefficient", "strength"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.asset_a.clone(),
            self.asset_b.clone(),
            self.coefficient.to_string(),
            self.strength.as_str().to_string(),
        ]
    }
}

impl Tabular for ThreatEvent {
    fn headers() -> &'static [&'static str] {
        &["id", "timestamp", "severity", "category", "chain", "description", "value_at_risk"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.timestamp.to_rfc3339(),
            self.severity.as_str().to_string(),
            self.category.clone(),
            self.chain.clone(),
            self.description.clone(),
            self.value_at_risk.to_string(),
        ]
    }
}

impl Tabular for Exposure {
    fn headers() -> &'static [&'static str] {
        &["exchange", "asset", "amount_usd", "share_pct"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.exchange.clone(),
            self.asset.clone(),
            self.amount_usd.to_string(),
            self.share_pct.to_string(),
        ]
    }
}

impl Tabular for ContractSummary {
    fn headers() -> &'static [&'static str] {
        &["id", "title", "counterparty", "status", "value_usd", "updated_at"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            self.counterparty.clone(),
            self.status.as_str().to_string(),
            self.value_usd.to_string(),
            self.updated_at.to_rfc3339(),
        ]
    }
}
