//! Registry of mounted poll sessions
//!
//! One entry per visible panel. Mounting under a name that is already taken
//! stops the previous session first, so a panel never has two pollers.

use crate::controller::MountedSession;
use dashmap::DashMap;
use gq_core::DatasetKind;
use parking_lot::Mutex;
use tracing::info;

/// Registry statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Sessions mounted over the registry's lifetime
    pub total_mounted: usize,
    /// Sessions stopped over the registry's lifetime
    pub total_unmounted: usize,
    /// Currently mounted sessions
    pub active_count: usize,
}

/// Named poll sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Box<dyn MountedSession>>,
    stats: Mutex<RegistryStats>,
}

impl SessionRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a session under its own name, replacing any previous one
    pub fn mount<S>(&self, session: S)
    where
        S: MountedSession + 'static,
    {
        let name = session.name().to_string();
        let kind = session.kind();
        let replaced = self.sessions.insert(name.clone(), Box::new(session));

        let mut stats = self.stats.lock();
        stats.total_mounted += 1;
        if let Some(mut old) = replaced {
            old.shutdown();
            stats.total_unmounted += 1;
            info!(session = %name, "replaced mounted session");
        }
        stats.active_count = self.sessions.len();
        info!(session = %name, dataset = %kind, "session mounted");
    }

    /// Stop and remove a session. Returns whether one was mounted.
    pub fn unmount(&self, name: &str) -> bool {
        let Some((_, mut session)) = self.sessions.remove(name) else {
            return false;
        };
        session.shutdown();

        let mut stats = self.stats.lock();
        stats.total_unmounted += 1;
        stats.active_count = self.sessions.len();
        info!(session = %name, "session unmounted");
        true
    }

    /// Stop and remove every session
    pub fn unmount_all(&self) {
        let names = self.names();
        for name in &names {
            self.unmount(name);
        }
    }

    /// Mounted session names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Dataset polled by a session
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<DatasetKind> {
        self.sessions.get(name).map(|s| s.kind())
    }

    /// Requests issued by a session
    #[must_use]
    pub fn requests_issued(&self, name: &str) -> Option<u64> {
        self.sessions.get(name).map(|s| s.requests_issued())
    }

    /// Whether a session is mounted
    #[inline]
    #[must_use]
    pub fn is_mounted(&self, name: &str) -> bool {
        self.sessions.contains_key(name)
    }

    /// Number of mounted sessions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether nothing is mounted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Registry statistics
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        self.stats.lock().clone()
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        for mut entry in self.sessions.iter_mut() {
            entry.value_mut().shutdown();
        }
    }
}
