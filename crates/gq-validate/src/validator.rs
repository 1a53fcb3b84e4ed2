//! Per-dataset structural validation
//!
//! Validation runs in two passes over every element of the record array:
//! 1. Structural: serde decoding checks field presence, primitive types and
//!    enum membership.
//! 2. Rules: range checks serde cannot express (finite numbers, bounds,
//!    non-empty identifiers).
//!
//! There is no per-record quarantine. The first failing record rejects the
//! whole payload.

use crate::error::ValidationError;
use crate::payload::{extract_array, parse_body};
use gq_core::{
    ContractSummary, Contracts, CorrelationPair, Correlations, Dataset, Entities, Entity,
    Exposure, Exposures, ThreatEvent, Threats,
};
use serde_json::Value;

/// Result of a single rule check: offending field and reason
pub type RuleResult = Result<(), (&'static str, String)>;

/// Dataset that can narrow untrusted JSON into its records
pub trait Validate: Dataset {
    /// Range checks for one decoded record
    ///
    /// # Errors
    /// Returns the offending field and a reason.
    fn check_record(record: &Self::Record) -> RuleResult;

    /// Narrow a decoded JSON payload into records
    ///
    /// # Errors
    /// Returns the first shape, decoding or rule failure.
    fn validate(value: &Value) -> Result<Vec<Self::Record>, ValidationError>
    where
        Self: Sized,
    {
        let items = extract_array(value, Self::KIND)?;
        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let record: Self::Record = serde_json::from_value(item.clone()).map_err(|e| {
                ValidationError::MalformedRecord {
                    index,
                    message: e.to_string(),
                }
            })?;
            Self::check_record(&record)
                .map_err(|(field, reason)| ValidationError::RuleViolation { index, field, reason })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Parse and validate a raw response body
    ///
    /// # Errors
    /// Returns `EmptyBody`/`NotJson` before any structural failure.
    fn validate_body(body: &str) -> Result<Vec<Self::Record>, ValidationError>
    where
        Self: Sized,
    {
        let value = parse_body(body)?;
        Self::validate(&value)
    }
}

/// Validate `value` as dataset `D`
///
/// # Errors
/// See [`Validate::validate`].
#[inline]
pub fn validate<D: Validate>(value: &Value) -> Result<Vec<D::Record>, ValidationError> {
    D::validate(value)
}

/// Whether `value` is an acceptable payload for dataset `D`
#[inline]
#[must_use]
pub fn accepts<D: Validate>(value: &Value) -> bool {
    D::validate(value).is_ok()
}

fn non_empty(field: &'static str, value: &str) -> RuleResult {
    if value.trim().is_empty() {
        Err((field, "must not be empty".to_string()))
    } else {
        Ok(())
    }
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> RuleResult {
    if !value.is_finite() {
        return Err((field, format!("{value} is not finite")));
    }
    if value < min || value > max {
        return Err((field, format!("{value} outside [{min}, {max}]")));
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> RuleResult {
    if !value.is_finite() {
        return Err((field, format!("{value} is not finite")));
    }
    if value < 0.0 {
        return Err((field, format!("{value} is negative")));
    }
    Ok(())
}

impl Validate for Entities {
    fn check_record(record: &Entity) -> RuleResult {
        non_empty("address", &record.address)?;
        non_empty("chain", &record.chain)?;
        in_range("risk_score", record.risk_score, 0.0, 100.0)?;
        non_negative("volume_24h", record.volume_24h)
    }
}

impl Validate for Correlations {
    fn check_record(record: &CorrelationPair) -> RuleResult {
        non_empty("asset_a", &record.asset_a)?;
        non_empty("asset_b", &record.asset_b)?;
        in_range("coefficient", record.coefficient, -1.0, 1.0)
    }
}

impl Validate for Threats {
    fn check_record(record: &ThreatEvent) -> RuleResult {
        non_empty("id", &record.id)?;
        non_empty("category", &record.category)?;
        non_negative("value_at_risk", record.value_at_risk)
    }
}

impl Validate for Exposures {
    fn check_record(record: &Exposure) -> RuleResult {
        non_empty("exchange", &record.exchange)?;
        non_empty("asset", &record.asset)?;
        non_negative("amount_usd", record.amount_usd)?;
        in_range("share_pct", record.share_pct, 0.0, 100.0)
    }
}

impl Validate for Contracts {
    fn check_record(record: &ContractSummary) -> RuleResult {
        non_empty("id", &record.id)?;
        non_empty("title", &record.title)?;
        non_negative("value_usd", record.value_usd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gq_core::Trend;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entity_json() -> Value {
        json!({
            "address": "0xdeadbeef",
            "label": "Bridge exploiter",
            "chain": "ethereum",
            "risk_score": 91.5,
            "trend": "up",
            "volume_24h": 1250000.0
        })
    }

    #[test]
    fn accepts_valid_entities_unmodified() {
        let payload = json!({"entities": [entity_json()], "metrics": {"ignored": true}});
        let records = validate::<Entities>(&payload).unwrap();

        assert_eq!(
            records,
            vec![Entity {
                address: "0xdeadbeef".into(),
                label: Some("Bridge exploiter".into()),
                chain: "ethereum".into(),
                risk_score: 91.5,
                trend: Trend::Up,
                volume_24h: 1_250_000.0,
            }]
        );
    }

    #[test]
    fn rejects_wrong_enum_value() {
        let mut bad = entity_json();
        bad["trend"] = json!("sideways");
        let payload = json!({"entities": [entity_json(), bad]});

        let err = validate::<Entities>(&payload).unwrap_err();
        assert_eq!(err.record_index(), Some(1));
        assert!(matches!(err, ValidationError::MalformedRecord { .. }));
    }

    #[test]
    fn rejects_missing_field() {
        let mut bad = entity_json();
        bad.as_object_mut().unwrap().remove("chain");
        let payload = json!([bad]);

        assert!(matches!(
            validate::<Entities>(&payload),
            Err(ValidationError::MalformedRecord { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_wrong_primitive_type() {
        let mut bad = entity_json();
        bad["risk_score"] = json!("high");
        assert!(!accepts::<Entities>(&json!([bad])));
    }

    #[test]
    fn rejects_out_of_range_without_partial_recovery() {
        let good = json!({"asset_a": "BTC", "asset_b": "ETH", "coefficient": 0.8, "strength": "strong"});
        let bad = json!({"asset_a": "BTC", "asset_b": "SOL", "coefficient": 1.4, "strength": "strong"});
        let payload = json!({"pairs": [good, bad]});

        let err = validate::<Correlations>(&payload).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RuleViolation {
                index: 1,
                field: "coefficient",
                reason: "1.4 outside [-1, 1]".into(),
            }
        );
    }

    #[test]
    fn empty_pairs_is_valid() {
        let records = validate::<Correlations>(&json!({"pairs": []})).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn rejects_non_array_body() {
        assert!(matches!(
            validate::<Correlations>(&json!("error")),
            Err(ValidationError::UnexpectedShape { found: "string" })
        ));
        assert!(matches!(
            validate::<Correlations>(&json!({"pairs": {"BTC": 1}})),
            Err(ValidationError::NotAnArray { .. })
        ));
    }

    #[test]
    fn validate_body_surfaces_parse_errors_first() {
        assert_eq!(Threats::validate_body(""), Err(ValidationError::EmptyBody));
        assert!(matches!(
            Threats::validate_body("Internal Server Error"),
            Err(ValidationError::NotJson(_))
        ));
    }

    #[test]
    fn threat_events_decode_timestamps() {
        let payload = json!({"events": [{
            "id": "evt-1",
            "timestamp": "2024-05-01T12:00:00Z",
            "severity": "critical",
            "category": "flash_loan",
            "chain": "arbitrum",
            "description": "Oracle manipulation",
            "value_at_risk": 420000.0
        }]});
        let records = validate::<Threats>(&payload).unwrap();
        assert_eq!(records[0].severity, gq_core::Severity::Critical);
    }

    #[test]
    fn threat_with_bad_timestamp_rejected() {
        let payload = json!([{
            "id": "evt-1",
            "timestamp": "yesterday",
            "severity": "low",
            "category": "spam",
            "chain": "base",
            "description": "",
            "value_at_risk": 0.0
        }]);
        assert!(!accepts::<Threats>(&payload));
    }

    #[test]
    fn exposure_share_bounds() {
        let payload = json!([{"exchange": "Binance", "asset": "BTC", "amount_usd": 10.0, "share_pct": 101.0}]);
        assert!(matches!(
            validate::<Exposures>(&payload),
            Err(ValidationError::RuleViolation { field: "share_pct", .. })
        ));
    }

    #[test]
    fn contract_status_membership() {
        let payload = json!({"contracts": [{
            "id": "c-1",
            "title": "Data feed",
            "counterparty": "Acme",
            "status": "archived",
            "value_usd": 5000.0,
            "updated_at": "2024-05-01T12:00:00Z"
        }]});
        assert!(!accepts::<Contracts>(&payload));
    }

    #[test]
    fn blank_identifier_rejected() {
        let payload = json!([{"asset_a": " ", "asset_b": "ETH", "coefficient": 0.1, "strength": "weak"}]);
        let err = validate::<Correlations>(&payload).unwrap_err();
        assert!(matches!(err, ValidationError::RuleViolation { field: "asset_a", .. }));
    }
}
