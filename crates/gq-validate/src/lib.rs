//! GhostQuant Response Validator
//!
//! The trusted boundary between untrusted backend JSON and typed dataset
//! records.
//!
//! # Contract
//!
//! - Accept: return every record, unmodified, in payload order.
//! - Reject: any shape problem or any bad record rejects the whole payload.
//!   The caller falls back to synthetic data.
//!
//! ```text
//! body ──parse_body──▶ Value ──extract_array──▶ [Value] ──serde + rules──▶ Vec<Record>
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use gq_core::Correlations;
//! use gq_validate::Validate;
//!
//! let pairs = Correlations::validate_body(&body)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod payload;
pub mod validator;

pub use error::ValidationError;
pub use payload::{extract_array, parse_body};
pub use validator::{accepts, validate, RuleResult, Validate};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
