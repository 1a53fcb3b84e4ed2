//! GhostQuant Saved Investigations
//!
//! Persists the user's bookmarked investigations under a single storage key.
//!
//! # Example
//!
//! ```rust,ignore
//! use gq_store::{FileBackend, InvestigationKind, InvestigationRepository, SavedInvestigation};
//!
//! let repo = InvestigationRepository::new(FileBackend::new(".ghostquant"));
//! let saved = repo.save(SavedInvestigation::new("Bridge drain", "0xdead", InvestigationKind::Address))?;
//! assert!(repo.delete(&saved.id)?);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod backend;
pub mod error;
pub mod investigation;
pub mod repository;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use error::StoreError;
pub use investigation::{InvestigationKind, SavedInvestigation};
pub use repository::{InvestigationRepository, ENVELOPE_VERSION, STORAGE_KEY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
