//! Saved investigations repository
//!
//! All investigations live under one storage key as a versioned envelope:
//!
//! ```json
//! { "version": 1, "investigations": [ ... ] }
//! ```
//!
//! A bare array (written by older clients) is read as version 0 and
//! rewritten as an envelope on the next mutation. Every mutation rewrites the
//! whole list and drops the read cache.

use crate::backend::StorageBackend;
use crate::error::StoreError;
use crate::investigation::SavedInvestigation;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Storage key holding every saved investigation
pub const STORAGE_KEY: &str = "ghostquant_saved_investigations";

/// Envelope version written by this client
pub const ENVELOPE_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    investigations: &'a [SavedInvestigation],
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    investigations: Vec<SavedInvestigation>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLayout {
    Envelope(Envelope),
    Legacy(Vec<SavedInvestigation>),
}

/// Repository of saved investigations over a storage backend
#[derive(Debug)]
pub struct InvestigationRepository<B: StorageBackend> {
    backend: B,
    cache: RwLock<Option<Arc<Vec<SavedInvestigation>>>>,
    /// Bumped under the cache lock whenever the cache is dropped
    epoch: AtomicU64,
    writer: Mutex<()>,
}

impl<B: StorageBackend> InvestigationRepository<B> {
    /// Repository over `backend`
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: RwLock::new(None),
            epoch: AtomicU64::new(0),
            writer: Mutex::new(()),
        }
    }

    /// Underlying backend
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All investigations, most recently created first
    ///
    /// # Errors
    /// Backend failure, corrupt data or an unsupported envelope version.
    pub fn list(&self) -> Result<Vec<SavedInvestigation>, StoreError> {
        Ok(self.load()?.as_ref().clone())
    }

    /// Number of saved investigations
    ///
    /// # Errors
    /// See [`list`](Self::list).
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.load()?.len())
    }

    /// Whether nothing is saved
    ///
    /// # Errors
    /// See [`list`](Self::list).
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.load()?.is_empty())
    }

    /// Investigation by id
    ///
    /// # Errors
    /// See [`list`](Self::list).
    pub fn get(&self, id: &str) -> Result<Option<SavedInvestigation>, StoreError> {
        Ok(self.load()?.iter().find(|inv| inv.id == id).cloned())
    }

    /// Insert or replace by id, stamping `updated_at`
    ///
    /// New records go to the front of the list; replaced records keep their
    /// position and original `created_at`.
    ///
    /// # Errors
    /// `InvalidRecord` for blank fields, otherwise storage failures.
    pub fn save(&self, mut investigation: SavedInvestigation) -> Result<SavedInvestigation, StoreError> {
        investigation.check().map_err(StoreError::InvalidRecord)?;

        let _guard = self.writer.lock();
        let mut items = self.load()?.as_ref().clone();
        investigation.updated_at = Utc::now();

        if let Some(existing) = items.iter_mut().find(|inv| inv.id == investigation.id) {
            investigation.created_at = existing.created_at;
            *existing = investigation.clone();
            debug!(id = %investigation.id, "updated investigation");
        } else {
            items.insert(0, investigation.clone());
            info!(id = %investigation.id, title = %investigation.title, "saved investigation");
        }

        self.persist(&items)?;
        Ok(investigation)
    }

    /// Remove by id. Returns whether a record was removed.
    ///
    /// # Errors
    /// Storage failures.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.writer.lock();
        let mut items = self.load()?.as_ref().clone();
        let before = items.len();
        items.retain(|inv| inv.id != id);
        if items.len() == before {
            return Ok(false);
        }

        self.persist(&items)?;
        info!(%id, remaining = items.len(), "deleted investigation");
        Ok(true)
    }

    /// Remove every investigation
    ///
    /// # Errors
    /// Storage failures.
    pub fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.writer.lock();
        self.backend.remove(STORAGE_KEY)?;
        self.invalidate();
        info!("cleared saved investigations");
        Ok(())
    }

    /// Drop the read cache so the next read goes to the backend
    pub fn invalidate(&self) {
        let mut cache = self.cache.write();
        *cache = None;
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    fn load(&self) -> Result<Arc<Vec<SavedInvestigation>>, StoreError> {
        if let Some(cached) = self.cache.read().as_ref() {
            return Ok(Arc::clone(cached));
        }

        let seen = self.epoch.load(Ordering::SeqCst);
        let items = Arc::new(self.read_backend()?);

        // A write that landed during the read has already dropped the cache
        let mut cache = self.cache.write();
        if self.epoch.load(Ordering::SeqCst) == seen {
            *cache = Some(Arc::clone(&items));
        } else {
            debug!("backend changed during read, not caching");
        }
        Ok(items)
    }

    fn read_backend(&self) -> Result<Vec<SavedInvestigation>, StoreError> {
        let Some(text) = self.backend.read(STORAGE_KEY)? else {
            return Ok(Vec::new());
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let layout: StoredLayout = serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
            key: STORAGE_KEY.to_string(),
            source,
        })?;

        match layout {
            StoredLayout::Envelope(envelope) if envelope.version > ENVELOPE_VERSION => {
                Err(StoreError::UnsupportedVersion {
                    key: STORAGE_KEY.to_string(),
                    version: envelope.version,
                    supported: ENVELOPE_VERSION,
                })
            }
            StoredLayout::Envelope(envelope) => Ok(envelope.investigations),
            StoredLayout::Legacy(items) => {
                info!(count = items.len(), "read legacy investigations list, will migrate on next write");
                Ok(items)
            }
        }
    }

    fn persist(&self, items: &[SavedInvestigation]) -> Result<(), StoreError> {
        let text = serde_json::to_string(&EnvelopeRef {
            version: ENVELOPE_VERSION,
            investigations: items,
        })?;
        let result = self.backend.write(STORAGE_KEY, &text);
        self.invalidate();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::investigation::InvestigationKind;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicBool;
    use std::sync::mpsc::{self, Receiver, Sender};

    /// Backend whose first read reports in and then waits for a go signal
    #[derive(Debug)]
    struct GatedBackend {
        inner: MemoryBackend,
        armed: AtomicBool,
        entered: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
    }

    impl StorageBackend for GatedBackend {
        fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
            let value = self.inner.read(key)?;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.entered.lock().send(()).unwrap();
                self.release.lock().recv().unwrap();
            }
            Ok(value)
        }

        fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.inner.write(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn repo() -> InvestigationRepository<MemoryBackend> {
        InvestigationRepository::new(MemoryBackend::new())
    }

    #[test]
    fn empty_store_lists_nothing() {
        let repo = repo();
        assert!(repo.list().unwrap().is_empty());
        assert_eq!(repo.len().unwrap(), 0);
    }

    #[test]
    fn save_prepends_and_writes_envelope() {
        let repo = repo();
        let first = repo
            .save(SavedInvestigation::new("First", "0x1", InvestigationKind::Address))
            .unwrap();
        let second = repo
            .save(SavedInvestigation::new("Second", "ETH", InvestigationKind::Token))
            .unwrap();

        let ids: Vec<String> = repo.list().unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let raw = repo.backend().read(STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["investigations"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn save_existing_id_replaces_in_place() {
        let repo = repo();
        let original = repo
            .save(SavedInvestigation::new("Mixer", "0xmix", InvestigationKind::Entity))
            .unwrap();
        repo.save(SavedInvestigation::new("Other", "0xo", InvestigationKind::Entity))
            .unwrap();

        let mut edited = original.clone();
        edited.notes = "funds routed via bridge".into();
        edited.created_at = Utc::now() + chrono::Duration::days(1);
        let saved = repo.save(edited).unwrap();

        assert_eq!(repo.len().unwrap(), 2);
        assert_eq!(saved.created_at, original.created_at);
        assert!(saved.updated_at >= original.updated_at);
        let stored = repo.get(&original.id).unwrap().unwrap();
        assert_eq!(stored.notes, "funds routed via bridge");
        assert_eq!(repo.list().unwrap()[1].id, original.id);
    }

    #[test]
    fn delete_missing_id_is_noop() {
        let repo = repo();
        repo.save(SavedInvestigation::new("A", "a", InvestigationKind::Token))
            .unwrap();
        assert!(!repo.delete("does-not-exist").unwrap());
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[test]
    fn blank_record_rejected() {
        let repo = repo();
        let err = repo
            .save(SavedInvestigation::new("", "0x1", InvestigationKind::Address))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));
        assert!(repo.backend().read(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn newer_envelope_version_rejected() {
        let backend = MemoryBackend::with_value(STORAGE_KEY, r#"{"version":2,"investigations":[]}"#);
        let repo = InvestigationRepository::new(backend);
        assert!(matches!(
            repo.list(),
            Err(StoreError::UnsupportedVersion { version: 2, .. })
        ));
    }

    #[test]
    fn corrupt_value_reported() {
        let backend = MemoryBackend::with_value(STORAGE_KEY, "{not json");
        let repo = InvestigationRepository::new(backend);
        assert!(matches!(repo.list(), Err(StoreError::Corrupt { .. })));

        repo.clear().unwrap();
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn read_overlapping_a_save_does_not_cache_old_list() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let repo = Arc::new(InvestigationRepository::new(GatedBackend {
            inner: MemoryBackend::new(),
            armed: AtomicBool::new(true),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        }));

        let reader = {
            let repo = Arc::clone(&repo);
            std::thread::spawn(move || repo.list().unwrap().len())
        };
        entered_rx.recv().unwrap();

        repo.save(SavedInvestigation::new("A", "0xa", InvestigationKind::Address))
            .unwrap();
        release_tx.send(()).unwrap();

        assert_eq!(reader.join().unwrap(), 0);
        assert_eq!(repo.len().unwrap(), 1);
        assert_eq!(repo.list().unwrap()[0].title, "A");
    }
}
