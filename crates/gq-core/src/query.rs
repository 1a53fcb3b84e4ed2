//! Query filters encoded as URL query parameters

use serde::{Deserialize, Serialize};

/// Optional filters appended to a dataset request
///
/// Only parameters that are set are emitted, always in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Minimum correlation strength
    pub strength: Option<String>,
    /// Lookback window, e.g. `24h`
    pub timeframe: Option<String>,
    /// Chain filter
    pub chain: Option<String>,
    /// Contract status filter
    pub status: Option<String>,
    /// Minimum threat severity
    pub severity: Option<String>,
    /// Page size
    pub limit: Option<u32>,
    /// Page offset
    pub offset: Option<u32>,
}

impl Query {
    /// Empty query
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With strength filter
    #[inline]
    #[must_use]
    pub fn with_strength(mut self, strength: impl Into<String>) -> Self {
        self.strength = Some(strength.into());
        self
    }

    /// With timeframe filter
    #[inline]
    #[must_use]
    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }

    /// With chain filter
    #[inline]
    #[must_use]
    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = Some(chain.into());
        self
    }

    /// With status filter
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// With severity filter
    #[inline]
    #[must_use]
    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    /// With page size
    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// With page offset
    #[inline]
    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// With pagination
    #[inline]
    #[must_use]
    pub fn with_page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Whether no filter is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_pairs().is_empty()
    }

    /// Key/value pairs for the request URL
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let text = [
            ("strength", &self.strength),
            ("timeframe", &self.timeframe),
            ("chain", &self.chain),
            ("status", &self.status),
            ("severity", &self.severity),
        ];
        let numeric = [("limit", self.limit), ("offset", self.offset)];

        text.into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key, v.clone())))
            .chain(
                numeric
                    .into_iter()
                    .filter_map(|(key, value)| value.map(|v| (key, v.to_string()))),
            )
            .collect()
    }
}
