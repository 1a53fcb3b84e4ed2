//! Testing utilities for the GhostQuant workspace
//!
//! Scripted fetchers, payload fixtures and sample records.

#![allow(missing_docs)]

use async_trait::async_trait;
use gq_core::{DatasetKind, Query};
use gq_poll::{FetchError, Fetcher};
use gq_store::{InvestigationKind, SavedInvestigation};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted reply
#[derive(Debug, Clone)]
pub struct Reply {
    pub delay: Duration,
    pub result: Result<Value, FetchError>,
}

impl Reply {
    pub fn ok(value: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(value),
        }
    }

    pub fn err(error: FetchError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub fn status(status: u16) -> Self {
        Self::err(FetchError::Status {
            status,
            url: "http://scripted.test".into(),
        })
    }

    #[must_use]
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Fetcher that replays queued replies, then repeats a fallback reply
#[derive(Debug)]
pub struct ScriptedFetcher {
    queue: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls: AtomicUsize,
    paths: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    /// Always answer with `reply`
    pub fn always(reply: Reply) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: reply,
            calls: AtomicUsize::new(0),
            paths: Mutex::new(Vec::new()),
        }
    }

    /// Answer with `replies` in order, then with `fallback`
    pub fn sequence(replies: impl IntoIterator<Item = Reply>, fallback: Reply) -> Self {
        let fetcher = Self::always(fallback);
        fetcher.queue.lock().extend(replies);
        fetcher
    }

    /// Number of fetches started
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Paths requested, in call order
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, path: &str, _query: &Query) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().push(path.to_string());
        let reply = self.queue.lock().pop_front().unwrap_or_else(|| self.fallback.clone());

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

pub fn sample_pairs_payload() -> Value {
    json!({ "pairs": [
        { "asset_a": "BTC", "asset_b": "ETH", "coefficient": 0.82, "strength": "strong" },
        { "asset_a": "BTC", "asset_b": "SOL", "coefficient": 0.55, "strength": "moderate" },
        { "asset_a": "ETH", "asset_b": "SOL", "coefficient": -0.12, "strength": "weak" }
    ]})
}

pub fn sample_entities_payload() -> Value {
    json!({ "entities": [
        { "address": "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984", "label": "Market maker",
          "chain": "ethereum", "risk_score": 82.0, "trend": "up", "volume_24h": 1250000.0 },
        { "address": "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin",
          "chain": "solana", "riskScore": 35.5, "trend": "stable", "volume24h": 48000.0 }
    ]})
}

pub fn sample_threats_payload() -> Value {
    json!({ "events": [
        { "id": "evt-1", "timestamp": "2024-05-01T12:00:00Z", "severity": "critical",
          "category": "rug_pull", "chain": "bsc", "description": "LP withdrawn",
          "value_at_risk": 900000.0 }
    ]})
}

pub fn sample_exposures_payload() -> Value {
    json!({ "exposures": [
        { "exchange": "Binance", "asset": "BTC", "amount_usd": 750000.0, "share_pct": 75.0 },
        { "exchange": "Coinbase", "asset": "ETH", "amount_usd": 250000.0, "share_pct": 25.0 }
    ]})
}

pub fn sample_contracts_payload() -> Value {
    json!({ "contracts": [
        { "id": "c-1", "title": "OTC settlement", "counterparty": "Desk A",
          "status": "negotiating", "value_usd": 120000.0, "updated_at": "2024-05-01T09:30:00Z" },
        { "id": "c-2", "title": "Data license", "counterparty": "Vendor B",
          "status": "signed", "value_usd": 40000.0, "updated_at": "2024-04-20T10:00:00Z" }
    ]})
}

/// Valid payload for a dataset
pub fn sample_payload(kind: DatasetKind) -> Value {
    match kind {
        DatasetKind::Entities => sample_entities_payload(),
        DatasetKind::Correlation => sample_pairs_payload(),
        DatasetKind::Threats => sample_threats_payload(),
        DatasetKind::Exposures => sample_exposures_payload(),
        DatasetKind::Contracts => sample_contracts_payload(),
    }
}

/// Correlation payloads the validator must reject
pub fn malformed_pairs_payloads() -> Vec<Value> {
    vec![
        json!("not an object"),
        json!(42),
        json!({ "pairs": "nope" }),
        json!({ "unrelated": [] }),
        json!({ "pairs": [{ "asset_a": "BTC", "coefficient": 0.5, "strength": "weak" }] }),
        json!({ "pairs": [{ "asset_a": "BTC", "asset_b": "ETH", "coefficient": 0.5, "strength": "huge" }] }),
        json!({ "pairs": [{ "asset_a": "BTC", "asset_b": "ETH", "coefficient": "high", "strength": "weak" }] }),
        json!({ "pairs": [{ "asset_a": "BTC", "asset_b": "ETH", "coefficient": 3.0, "strength": "strong" }] }),
    ]
}

pub fn sample_investigation() -> SavedInvestigation {
    SavedInvestigation::new("Bridge exploit", "0xdeadbeef", InvestigationKind::Address)
        .with_notes("Funds moved through three mixers")
        .with_tags(["bridge", "urgent"])
}
