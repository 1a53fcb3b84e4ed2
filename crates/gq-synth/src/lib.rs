//! GhostQuant Mock Data Synthesizer
//!
//! Produces plausible placeholder datasets when the backend is unreachable
//! or returns unusable data, so summary cards and tables never go blank.
//!
//! - Deterministic name lists (tickers, exchanges, chains) combined with
//!   random numeric fields
//! - Metrics derived by the dataset's own reducer
//! - OS-seeded by default (runs are not reproducible); seedable for tests
//!
//! Every synthesized dataset satisfies the same structural contract the
//! response validator enforces.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod generator;
pub mod names;

pub use generator::{FixtureGenerator, SynthParams, Synthesize};
pub use names::DEFAULT_ASSETS;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
