// crates/skycast-history/src/store.rs

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::entry::HistoryEntry;
use crate::error::{HistoryError, HistoryResult};

/// File-backed search history.
///
/// The whole history lives in one pretty-printed JSON array. The file is
/// created on the first successful write; until then the history is empty.
///
/// Mutations hold `write_lock` across their read-modify-write so that two
/// concurrent calls cannot overwrite each other's change. Writes go to a
/// sibling temp file that is then renamed over the document, so `list` never
/// observes a half-written file and does not need the lock.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Create a store backed by the document at `path`.
    ///
    /// Nothing is touched on disk until the first mutation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the history document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All recorded searches, oldest first.
    ///
    /// A missing, unreadable or malformed document reads as an empty history.
    pub async fn list(&self) -> Vec<HistoryEntry> {
        match self.load().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Treating search history as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Record a search for `city` and return the new entry.
    ///
    /// The city string is stored verbatim; callers validate it.
    ///
    /// # Errors
    /// Returns `HistoryError::Persistence` if the document cannot be written,
    /// or if it exists but cannot be read. Returns `HistoryError::Corrupt` if
    /// it exists but is not valid history JSON; the file is left untouched.
    pub async fn append(&self, city: &str) -> HistoryResult<HistoryEntry> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await?;

        let mut id = HistoryEntry::generate_id();
        while entries.iter().any(|e| e.id == id) {
            id = HistoryEntry::generate_id();
        }

        let entry = HistoryEntry::new(id, city);
        entries.push(entry.clone());
        self.persist(&entries).await?;

        tracing::info!("Recorded search for {:?} ({})", entry.city, entry.id);
        Ok(entry)
    }

    /// Remove the entry with the given id.
    ///
    /// Returns `Ok(None)` when no entry has that id; the document is not
    /// rewritten in that case. Otherwise returns the remaining entries in
    /// their original order.
    ///
    /// # Errors
    /// Same conditions as [`append`](Self::append).
    pub async fn remove_by_id(&self, id: &str) -> HistoryResult<Option<Vec<HistoryEntry>>> {
        let _guard = self.write_lock.lock().await;

        let entries = self.load().await?;
        let original_len = entries.len();
        let remaining: Vec<HistoryEntry> = entries.into_iter().filter(|e| e.id != id).collect();

        if remaining.len() == original_len {
            tracing::debug!("No search history entry with id {}", id);
            return Ok(None);
        }

        self.persist(&remaining).await?;

        tracing::info!("Removed search history entry {}", id);
        Ok(Some(remaining))
    }

    /// Read the current document. Absence is an empty history, not an error.
    async fn load(&self) -> HistoryResult<Vec<HistoryEntry>> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No search history at {:?} yet", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(HistoryError::persistence(&self.path, e)),
        };

        // A zero-length file is what an interrupted first write leaves behind
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let entries: Vec<HistoryEntry> =
            serde_json::from_slice(&data).map_err(|source| HistoryError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!("Loaded {} search history entries", entries.len());
        Ok(entries)
    }

    /// Replace the document with `entries`.
    async fn persist(&self, entries: &[HistoryEntry]) -> HistoryResult<()> {
        let json = serde_json::to_vec_pretty(entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| HistoryError::persistence(parent, e))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| HistoryError::persistence(&tmp, e))?;

        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                tracing::debug!("Failed to remove {:?}: {}", tmp, cleanup);
            }
            return Err(HistoryError::persistence(&self.path, e));
        }

        tracing::debug!("Wrote {} search history entries to {:?}", entries.len(), self.path);
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
