use std::{
    fs,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::SystemTime,
};

use camino::Utf8PathBuf;
use cell_counts_core::dashboard::LoadOutcome;

use super::Store;

/// Identifies one version of a store as seen from this process.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    path: Utf8PathBuf,
    generation: u64,
    // `None` when the store does not exist
    file: Option<(Option<SystemTime>, u64)>,
}

/// Memoizes the last result of `Store::load_all`.
///
/// A cached result is reused until either `invalidate` is called or the store
/// file changes on disk (appears, disappears, or its modification time or
/// length changes).
#[derive(Debug, Default)]
pub struct DataCache {
    generation: AtomicU64,
    entry: Mutex<Option<(Fingerprint, LoadOutcome)>>,
}

impl DataCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, store: &Store) -> LoadOutcome {
        let fingerprint = self.fingerprint(store);
        let mut entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((cached, outcome)) = entry.as_ref() {
            if *cached == fingerprint {
                tracing::debug!(path = %store.path(), "store cache hit");
                return outcome.clone();
            }
        }

        tracing::debug!(path = %store.path(), generation = fingerprint.generation, "store cache miss");
        let outcome = store.load_all();
        *entry = Some((fingerprint, outcome.clone()));

        outcome
    }

    /// Forces the next `load` to read the store again.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn fingerprint(&self, store: &Store) -> Fingerprint {
        let file = fs::metadata(store.path())
            .ok()
            .map(|metadata| (metadata.modified().ok(), metadata.len()));

        Fingerprint {
            path: store.path().to_path_buf(),
            generation: self.generation(),
            file,
        }
    }
}
