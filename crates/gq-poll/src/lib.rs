//! GhostQuant Polling Data Client
//!
//! Keeps each dashboard panel populated:
//! - Polls its endpoint on a fixed interval, first request immediately
//! - Narrows every payload through the validator
//! - Falls back to synthetic data on any failure
//! - Publishes snapshot, metrics and status as one unit
//! - Stops cleanly when the panel unmounts
//!
//! # Example
//!
//! ```rust,ignore
//! use gq_core::{ClientConfig, Correlations};
//! use gq_poll::{HttpFetcher, PollController};
//! use gq_synth::FixtureGenerator;
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let fetcher = Arc::new(HttpFetcher::new(&config)?);
//! let generator = Arc::new(Mutex::new(FixtureGenerator::new()));
//!
//! let handle = Arc::new(PollController::<Correlations>::new(&config, fetcher, generator)).spawn();
//! let mut rx = handle.subscribe();
//! rx.changed().await?;
//! println!("{} pairs", rx.borrow().record_count());
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod controller;
pub mod error;
pub mod registry;
pub mod state;
pub mod transport;

pub use controller::{
    DatasetViewState, MountedSession, PollController, PollHandle, SharedGenerator, TickOutcome,
    MIN_INTERVAL,
};
pub use error::{FetchError, PollFailure};
pub use registry::{RegistryStats, SessionRegistry};
pub use state::{DataStatus, PollPhase, ViewState};
pub use transport::{Fetcher, HttpFetcher};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running poll sessions
    pub use crate::{
        DataStatus, Fetcher, HttpFetcher, PollController, PollHandle, PollPhase, SessionRegistry,
        TickOutcome, ViewState,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
