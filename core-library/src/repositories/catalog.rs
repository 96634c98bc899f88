//! Catalog repository trait and key-value implementation

use crate::error::{LibraryError, Result};
use crate::models::{CatalogEntry, EntryId, EntryInput};
use crate::query::{self, CatalogStats};
use bridge_traits::platform::PlatformSendSync;
use bridge_traits::storage::KeyValueStore;
use bridge_traits::time::{Clock, SystemClock};
use chrono::{DateTime, SubsecRound, Utc};
use futures::lock::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Catalog repository interface
///
/// Every call reads the whole collection; mutations write it back as a whole.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait CatalogRepository: PlatformSendSync {
    /// Load every entry in insertion order
    ///
    /// # Returns
    /// - An empty list when nothing has been stored yet
    /// - An empty list when the stored data is unreadable, unless strict
    ///   decoding is enabled
    ///
    /// # Errors
    /// - The storage bridge fails
    /// - Strict decoding is enabled and the stored data is unreadable
    async fn load_all(&self) -> Result<Vec<CatalogEntry>>;

    /// Replace the persisted collection with `entries`
    ///
    /// Data that could not be decoded is copied to a backup key first.
    async fn save_all(&self, entries: &[CatalogEntry]) -> Result<()>;

    /// Append a new entry built from `data`
    ///
    /// Assigns a fresh id and stamps both timestamps. `data` is not validated.
    async fn create(&self, data: EntryInput) -> Result<CatalogEntry>;

    /// Replace the editable fields of an entry
    ///
    /// # Returns
    /// - `Ok(Some(entry))` with the updated entry
    /// - `Ok(None)` if no entry has this id; nothing is written
    async fn update(&self, id: &str, data: EntryInput) -> Result<Option<CatalogEntry>>;

    /// Delete an entry by ID
    ///
    /// # Returns
    /// - `Ok(true)` if the entry was deleted
    /// - `Ok(false)` if it was not found; nothing is written
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Find an entry by its ID
    async fn get_by_id(&self, id: &str) -> Result<Option<CatalogEntry>>;

    /// Case-insensitive substring search over title, author and director
    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>>;

    /// Totals and average rating of the current collection
    async fn stats(&self) -> Result<CatalogStats>;
}

/// [`CatalogRepository`] storing the collection as one JSON array under a
/// single key.
///
/// Mutations on one handle are serialized, so concurrent calls never lose
/// each other's writes. Separate handles over the same key are not
/// coordinated.
///
/// A stored blob that fails to decode is never overwritten in place. Strict
/// decoding refuses the mutation; otherwise the blob is copied to
/// [`unreadable_backup_key`](Self::unreadable_backup_key) before the new
/// collection is written.
pub struct KeyValueCatalogRepository {
    store: Arc<dyn KeyValueStore>,
    storage_key: String,
    clock: Arc<dyn Clock>,
    strict_decoding: bool,
    write_lock: Mutex<()>,
}

impl KeyValueCatalogRepository {
    /// Create a repository over `store` using `storage_key`
    pub fn new(store: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        Self {
            store,
            storage_key: storage_key.into(),
            clock: Arc::new(SystemClock),
            strict_decoding: false,
            write_lock: Mutex::new(()),
        }
    }

    /// Use `clock` for timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Report unreadable data as [`LibraryError::CorruptData`] instead of
    /// treating it as an empty catalog
    pub fn with_strict_decoding(mut self, strict: bool) -> Self {
        self.strict_decoding = strict;
        self
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Key an unreadable blob is copied to before a write replaces it
    pub fn unreadable_backup_key(&self, at: DateTime<Utc>) -> String {
        format!("{}.unreadable-{}", self.storage_key, at.timestamp_millis())
    }

    // Persisted timestamps carry milliseconds only.
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }

    async fn fetch(&self) -> Result<Stored> {
        let Some(raw) = self.store.get(&self.storage_key).await? else {
            return Ok(Stored::Missing);
        };

        match serde_json::from_str::<Vec<CatalogEntry>>(&raw) {
            Ok(entries) => Ok(Stored::Entries(entries)),
            Err(err) => Ok(Stored::Unreadable {
                raw,
                message: err.to_string(),
            }),
        }
    }

    fn corrupt(&self, message: String) -> LibraryError {
        LibraryError::CorruptData {
            key: self.storage_key.clone(),
            message,
        }
    }

    async fn read_entries(&self) -> Result<Vec<CatalogEntry>> {
        match self.fetch().await? {
            Stored::Missing => Ok(Vec::new()),
            Stored::Entries(entries) => Ok(entries),
            Stored::Unreadable { message, .. } if self.strict_decoding => {
                Err(self.corrupt(message))
            }
            Stored::Unreadable { raw, message } => {
                warn!(
                    key = %self.storage_key,
                    bytes = raw.len(),
                    error = %message,
                    "Stored catalog is unreadable; treating it as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Read for a read-modify-write cycle. An unreadable blob is handed back
    /// so [`commit`](Self::commit) can move it aside before replacing it.
    async fn read_for_write(&self) -> Result<(Vec<CatalogEntry>, Option<String>)> {
        match self.fetch().await? {
            Stored::Missing => Ok((Vec::new(), None)),
            Stored::Entries(entries) => Ok((entries, None)),
            Stored::Unreadable { message, .. } if self.strict_decoding => {
                Err(self.corrupt(message))
            }
            Stored::Unreadable { raw, .. } => Ok((Vec::new(), Some(raw))),
        }
    }

    async fn commit(&self, entries: &[CatalogEntry], unreadable: Option<String>) -> Result<()> {
        if let Some(raw) = unreadable {
            let backup_key = self.unreadable_backup_key(self.now());
            self.store.set(&backup_key, &raw).await?;
            warn!(
                key = %self.storage_key,
                backup_key = %backup_key,
                bytes = raw.len(),
                "Moved unreadable catalog aside before overwriting it"
            );
        }

        let raw = serde_json::to_string(entries)?;
        self.store.set(&self.storage_key, &raw).await?;
        debug!(
            key = %self.storage_key,
            entries = entries.len(),
            bytes = raw.len(),
            "Persisted catalog"
        );
        Ok(())
    }
}

enum Stored {
    Missing,
    Entries(Vec<CatalogEntry>),
    Unreadable { raw: String, message: String },
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl CatalogRepository for KeyValueCatalogRepository {
    async fn load_all(&self) -> Result<Vec<CatalogEntry>> {
        self.read_entries().await
    }

    async fn save_all(&self, entries: &[CatalogEntry]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let unreadable = match self.fetch().await? {
            Stored::Unreadable { raw, .. } => Some(raw),
            _ => None,
        };
        self.commit(entries, unreadable).await
    }

    #[instrument(skip(self, data), fields(kind = %data.kind))]
    async fn create(&self, data: EntryInput) -> Result<CatalogEntry> {
        let _guard = self.write_lock.lock().await;
        let (mut entries, unreadable) = self.read_for_write().await?;

        let id = loop {
            let candidate = EntryId::new();
            if !entries.iter().any(|entry| entry.id == candidate) {
                break candidate;
            }
        };

        let entry = CatalogEntry::from_input(id, data, self.now());
        entries.push(entry.clone());
        self.commit(&entries, unreadable).await?;

        info!(entry_id = %entry.id, "Created catalog entry");
        Ok(entry)
    }

    #[instrument(skip(self, data))]
    async fn update(&self, id: &str, data: EntryInput) -> Result<Option<CatalogEntry>> {
        let _guard = self.write_lock.lock().await;
        let (mut entries, unreadable) = self.read_for_write().await?;

        let Some(entry) = entries.iter_mut().find(|entry| entry.id == *id) else {
            debug!(entry_id = id, "Update skipped: entry not found");
            return Ok(None);
        };

        entry.apply(data, self.now());
        let updated = entry.clone();
        self.commit(&entries, unreadable).await?;

        info!(entry_id = id, "Updated catalog entry");
        Ok(Some(updated))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let (mut entries, unreadable) = self.read_for_write().await?;

        let before = entries.len();
        entries.retain(|entry| entry.id != *id);
        if entries.len() == before {
            debug!(entry_id = id, "Delete skipped: entry not found");
            return Ok(false);
        }

        self.commit(&entries, unreadable).await?;

        info!(entry_id = id, removed = before - entries.len(), "Deleted catalog entry");
        Ok(true)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<CatalogEntry>> {
        let entries = self.read_entries().await?;
        Ok(entries.into_iter().find(|entry| entry.id == *id))
    }

    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        let entries = self.read_entries().await?;
        Ok(query::search(query, entries))
    }

    async fn stats(&self) -> Result<CatalogStats> {
        let entries = self.read_entries().await?;
        Ok(query::compute_stats(&entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;
    use bridge_traits::{InMemoryKeyValueStore, ManualClock};
    use chrono::{Duration, TimeZone};

    const KEY: &str = "book-catalog";

    fn input(title: &str) -> EntryInput {
        EntryInput {
            title: title.to_string(),
            author: "Ursula K. Le Guin".to_string(),
            director: None,
            year: 1969,
            genre: "Science Fiction".to_string(),
            synopsis: "An envoy visits Gethen.".to_string(),
            rating: 5,
            cover_url: String::new(),
            kind: EntryKind::Book,
        }
    }

    fn setup() -> (KeyValueCatalogRepository, Arc<InMemoryKeyValueStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let repo = KeyValueCatalogRepository::new(store.clone(), KEY).with_clock(clock.clone());
        (repo, store, clock)
    }

    #[tokio::test]
    async fn test_create_stamps_and_persists() {
        let (repo, store, clock) = setup();

        let entry = repo.create(input("The Left Hand of Darkness")).await.unwrap();
        assert_eq!(entry.created_at, clock.now());
        assert_eq!(entry.updated_at, entry.created_at);

        let raw = store.get(KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"createdAt\":\"2024-01-01T00:00:00.000Z\""));
        assert_eq!(repo.load_all().await.unwrap(), vec![entry]);
    }

    #[tokio::test]
    async fn test_now_truncates_to_millis() {
        let (repo, _store, clock) = setup();
        clock.advance(Duration::nanoseconds(1_234_567));

        let created = repo.create(input("The Dispossessed")).await.unwrap();
        assert_eq!(created.created_at.timestamp_subsec_nanos(), 1_000_000);
        assert_eq!(
            repo.get_by_id(created.id.as_str()).await.unwrap(),
            Some(created)
        );
    }

    #[tokio::test]
    async fn test_update_refreshes_timestamp() {
        let (repo, _store, clock) = setup();
        let created = repo.create(input("Lathe of Heaven")).await.unwrap();

        clock.advance(Duration::minutes(5));
        let updated = repo
            .update(created.id.as_str(), input("The Lathe of Heaven"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "The Lathe of Heaven");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.updated_at, created.created_at + Duration::minutes(5));
    }

    #[tokio::test]
    async fn test_update_with_clock_behind_keeps_updated_at() {
        let (repo, _store, clock) = setup();
        let created = repo.create(input("Tehanu")).await.unwrap();

        clock.advance(Duration::hours(-1));
        let updated = repo
            .update(created.id.as_str(), input("Tehanu"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.updated_at, created.updated_at);
    }

    #[tokio::test]
    async fn test_delete_missing_writes_nothing() {
        let (repo, store, _clock) = setup();
        assert!(!repo.delete("missing").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_custom_storage_key() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let repo = KeyValueCatalogRepository::new(store.clone(), "films");
        assert_eq!(repo.storage_key(), "films");

        repo.create(input("Solaris")).await.unwrap();
        assert!(store.contains_key("films").await.unwrap());
        assert!(!store.contains_key(KEY).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_not_lost() {
        let (repo, _store, _clock) = setup();
        let repo = Arc::new(repo);

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create(input(&format!("Volume {}", i))).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(repo.load_all().await.unwrap().len(), 16);
    }
}
