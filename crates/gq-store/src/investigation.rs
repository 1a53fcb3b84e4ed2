//! Saved investigation record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// What an investigation is about
///
/// Stored as a lowercase string. Kinds this client does not know are kept
/// verbatim in [`Other`](Self::Other) and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvestigationKind {
    /// Labelled entity
    #[default]
    Entity,
    /// Raw wallet address
    Address,
    /// Token or asset
    Token,
    /// Negotiated contract
    Contract,
    /// Threat timeline event
    Threat,
    /// Kind written by another client
    Other(String),
}

impl InvestigationKind {
    /// Kinds accepted on input
    pub const ALL: [InvestigationKind; 5] = [
        Self::Entity,
        Self::Address,
        Self::Token,
        Self::Contract,
        Self::Threat,
    ];

    /// Lowercase name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Entity => "entity",
            Self::Address => "address",
            Self::Token => "token",
            Self::Contract => "contract",
            Self::Threat => "threat",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl fmt::Display for InvestigationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<String> for InvestigationKind {
    fn from(raw: String) -> Self {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == raw)
            .unwrap_or(Self::Other(raw))
    }
}

impl From<InvestigationKind> for String {
    fn from(kind: InvestigationKind) -> Self {
        match kind {
            InvestigationKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for InvestigationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown investigation kind: {s}"))
    }
}

/// Investigation bookmarked by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedInvestigation {
    /// ULID for new records; legacy data may hold any string
    pub id: String,
    /// Display title
    pub title: String,
    /// Address, ticker or identifier under investigation
    pub target: String,
    /// Subject kind
    #[serde(default)]
    pub kind: InvestigationKind,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
    /// User tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation time
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Last save time
    #[serde(alias = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Fields this client does not model, preserved across rewrites
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SavedInvestigation {
    /// New investigation with a fresh id
    #[must_use]
    pub fn new(title: impl Into<String>, target: impl Into<String>, kind: InvestigationKind) -> Self {
        let now = Utc::now();
        Self {
            id: Ulid::new().to_string(),
            title: title.into(),
            target: target.into(),
            kind,
            notes: String::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            extra: Map::new(),
        }
    }

    /// With notes
    #[inline]
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// With tags
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the record may be written
    ///
    /// # Errors
    /// Returns a reason for an empty id, title or target.
    pub fn check(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("id is empty".into());
        }
        if self.title.trim().is_empty() {
            return Err("title is empty".into());
        }
        if self.target.trim().is_empty() {
            return Err("target is empty".into());
        }
        Ok(())
    }
}
