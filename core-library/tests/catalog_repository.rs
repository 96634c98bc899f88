//! Integration tests for the key-value catalog repository

use std::collections::HashSet;
use std::sync::Arc;

use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::storage::KeyValueStore;
use bridge_traits::{Clock, InMemoryKeyValueStore, ManualClock};
use chrono::{Duration, TimeZone, Utc};
use core_library::models::{CatalogEntry, EntryInput, EntryKind};
use core_library::repositories::{CatalogRepository, KeyValueCatalogRepository};
use core_library::LibraryError;
use mockall::mock;

const KEY: &str = "book-catalog";
const WEB_APP_CATALOG: &str = include_str!("fixtures/web_app_catalog.json");

mock! {
    pub Store {}

    #[async_trait::async_trait]
    impl KeyValueStore for Store {
        async fn get(&self, key: &str) -> BridgeResult<Option<String>>;
        async fn set(&self, key: &str, value: &str) -> BridgeResult<()>;
        async fn remove(&self, key: &str) -> BridgeResult<()>;
    }
}

fn book(title: &str, author: &str) -> EntryInput {
    EntryInput {
        title: title.to_string(),
        author: author.to_string(),
        director: None,
        year: 1965,
        genre: "Science Fiction".to_string(),
        synopsis: "...".to_string(),
        rating: 5,
        cover_url: String::new(),
        kind: EntryKind::Book,
    }
}

fn film(title: &str, writer: &str, director: &str) -> EntryInput {
    EntryInput {
        director: Some(director.to_string()),
        kind: EntryKind::Film,
        ..book(title, writer)
    }
}

struct Fixture {
    repo: KeyValueCatalogRepository,
    store: Arc<InMemoryKeyValueStore>,
    clock: Arc<ManualClock>,
}

fn fixture_with(store: InMemoryKeyValueStore) -> Fixture {
    let store = Arc::new(store);
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 9, 1, 10, 0, 0).unwrap(),
    ));
    let repo = KeyValueCatalogRepository::new(store.clone(), KEY).with_clock(clock.clone());
    Fixture { repo, store, clock }
}

fn fixture() -> Fixture {
    fixture_with(InMemoryKeyValueStore::new())
}

#[tokio::test]
async fn end_to_end_dune() {
    let Fixture { repo, .. } = fixture();
    assert!(repo.load_all().await.unwrap().is_empty());

    let dune = repo.create(book("Dune", "Frank Herbert")).await.unwrap();

    let all = repo.load_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Dune");

    let hits = repo.search("herbert").await.unwrap();
    assert_eq!(hits, vec![dune.clone()]);

    assert!(repo.delete(dune.id.as_str()).await.unwrap());
    assert!(repo.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn created_ids_are_unique() {
    let Fixture { repo, .. } = fixture();

    let mut ids = HashSet::new();
    for i in 0..50 {
        let entry = repo.create(book(&format!("Book {}", i), "Anon")).await.unwrap();
        assert!(ids.insert(entry.id.clone()), "duplicate id {}", entry.id);
    }
    assert_eq!(repo.load_all().await.unwrap().len(), 50);
}

#[tokio::test]
async fn create_then_get_by_id_returns_equal_entry() {
    let Fixture { repo, clock, .. } = fixture();
    clock.advance(Duration::microseconds(2_500));

    let created = repo
        .create(film("Arrival", "Eric Heisserer", "Denis Villeneuve"))
        .await
        .unwrap();
    let fetched = repo.get_by_id(created.id.as_str()).await.unwrap();
    assert_eq!(fetched, Some(created));
}

#[tokio::test]
async fn get_by_id_missing_is_none() {
    let Fixture { repo, .. } = fixture();
    repo.create(book("Dune", "Frank Herbert")).await.unwrap();
    assert_eq!(repo.get_by_id("nope").await.unwrap(), None);
}

#[tokio::test]
async fn update_applies_fields_and_preserves_identity() {
    let Fixture { repo, clock, .. } = fixture();
    let created = repo
        .create(film("Blade Runner", "Hampton Fancher", "Ridley Scott"))
        .await
        .unwrap();

    clock.advance(Duration::days(1));
    let mut changes = film("Blade Runner 2049", "Hampton Fancher", "Denis Villeneuve");
    changes.year = 2017;
    changes.rating = 4;
    changes.cover_url = "https://example.com/br2049.jpg".to_string();

    let updated = repo
        .update(created.id.as_str(), changes.clone())
        .await
        .unwrap()
        .expect("entry exists");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.to_input(), changes);
    assert_eq!(repo.load_all().await.unwrap(), vec![updated]);
}

#[tokio::test]
async fn update_without_director_keeps_stored_director() {
    let Fixture { repo, .. } = fixture();
    let created = repo
        .create(film("Heat", "Michael Mann", "Michael Mann"))
        .await
        .unwrap();

    let mut changes = created.to_input();
    changes.director = None;
    changes.rating = 3;

    let updated = repo
        .update(created.id.as_str(), changes)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.director.as_deref(), Some("Michael Mann"));
    assert_eq!(updated.rating, 3);
}

#[tokio::test]
async fn update_missing_leaves_collection_unchanged() {
    let Fixture { repo, store, .. } = fixture();
    repo.create(book("Dune", "Frank Herbert")).await.unwrap();

    let raw_before = store.get(KEY).await.unwrap();
    let before = repo.load_all().await.unwrap();

    let result = repo.update("missing", book("Other", "Someone")).await.unwrap();
    assert!(result.is_none());

    assert_eq!(repo.load_all().await.unwrap(), before);
    assert_eq!(store.get(KEY).await.unwrap(), raw_before);
}

#[tokio::test]
async fn delete_removes_exactly_one_entry() {
    let Fixture { repo, .. } = fixture();
    let a = repo.create(book("A", "x")).await.unwrap();
    let b = repo.create(book("B", "x")).await.unwrap();
    let c = repo.create(book("C", "x")).await.unwrap();

    assert!(repo.delete(b.id.as_str()).await.unwrap());
    assert_eq!(repo.load_all().await.unwrap(), vec![a, c]);
}

#[tokio::test]
async fn delete_missing_returns_false() {
    let Fixture { repo, .. } = fixture();
    repo.create(book("A", "x")).await.unwrap();
    let before = repo.load_all().await.unwrap();

    assert!(!repo.delete("missing").await.unwrap());
    assert_eq!(repo.load_all().await.unwrap(), before);
}

#[tokio::test]
async fn search_semantics() {
    let Fixture { repo, .. } = fixture();
    repo.create(book("The Great Gatsby", "F. Scott Fitzgerald"))
        .await
        .unwrap();
    repo.create(book("Dune", "Frank Herbert")).await.unwrap();
    repo.create(film("Dune", "Eric Roth", "Denis Villeneuve"))
        .await
        .unwrap();

    let all = repo.load_all().await.unwrap();
    assert_eq!(repo.search("").await.unwrap(), all);

    let lower = repo.search("dune").await.unwrap();
    let upper = repo.search("DUNE").await.unwrap();
    assert_eq!(lower, upper);
    assert_eq!(lower.len(), 2);

    let great = repo.search("great").await.unwrap();
    assert_eq!(great.len(), 1);
    assert_eq!(great[0].title, "The Great Gatsby");

    let by_director = repo.search("Villeneuve").await.unwrap();
    assert_eq!(by_director.len(), 1);
    assert_eq!(by_director[0].kind, EntryKind::Film);
}

#[tokio::test]
async fn save_all_then_load_all_roundtrips() {
    let Fixture { repo, .. } = fixture();
    let entries: Vec<CatalogEntry> = serde_json::from_str(WEB_APP_CATALOG).unwrap();

    repo.save_all(&entries).await.unwrap();
    assert_eq!(repo.load_all().await.unwrap(), entries);

    repo.save_all(&[]).await.unwrap();
    assert!(repo.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn reads_catalog_written_by_web_app() {
    let Fixture { repo, .. } = fixture_with(InMemoryKeyValueStore::with_value(KEY, WEB_APP_CATALOG));

    let entries = repo.load_all().await.unwrap();
    assert_eq!(entries.len(), 3);

    let gatsby = &entries[0];
    assert_eq!(gatsby.director.as_deref(), Some(""));
    assert_eq!(gatsby.display_creator(), "F. Scott Fitzgerald");
    assert_eq!(gatsby.created_at.timestamp_subsec_millis(), 318);

    let arrival = &entries[1];
    assert_eq!(arrival.kind, EntryKind::Film);
    assert_eq!(arrival.display_creator(), "Denis Villeneuve");
    assert_eq!(arrival.display_cover(), "https://example.com/arrival.jpg");

    let persuasion = &entries[2];
    assert_eq!(persuasion.cover_url, "");
    assert_eq!(persuasion.director, None);

    let stats = repo.stats().await.unwrap();
    assert_eq!((stats.total, stats.books, stats.films), (3, 2, 1));
    assert_eq!(stats.average_rating_label(), "4.7");
}

#[tokio::test]
async fn rewritten_web_app_catalog_keeps_timestamp_format() {
    let Fixture { repo, store, .. } =
        fixture_with(InMemoryKeyValueStore::with_value(KEY, WEB_APP_CATALOG));

    let entries = repo.load_all().await.unwrap();
    repo.save_all(&entries).await.unwrap();

    let raw = store.get(KEY).await.unwrap().unwrap();
    assert!(raw.contains("\"createdAt\":\"2024-05-12T09:41:07.318Z\""));
    assert!(raw.contains("\"updatedAt\":\"2024-06-01T07:15:00.000Z\""));
    // Persuasion had no director and still has none.
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value[2].get("director").is_none());
}

#[tokio::test]
async fn absent_key_loads_empty() {
    let Fixture { repo, store, .. } = fixture();
    assert!(repo.load_all().await.unwrap().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn corrupt_blob_loads_empty_by_default() {
    for raw in ["{not json", "{\"id\": 1}", "[{\"title\": \"missing fields\"}]"] {
        let Fixture { repo, store, .. } = fixture_with(InMemoryKeyValueStore::with_value(KEY, raw));

        assert!(repo.load_all().await.unwrap().is_empty());
        assert!(repo.search("anything").await.unwrap().is_empty());
        // Reading never rewrites the stored value.
        assert_eq!(store.get(KEY).await.unwrap().as_deref(), Some(raw));
    }
}

#[tokio::test]
async fn corrupt_blob_is_reported_in_strict_mode() {
    let store = Arc::new(InMemoryKeyValueStore::with_value(KEY, "{not json"));
    let repo = KeyValueCatalogRepository::new(store.clone(), KEY).with_strict_decoding(true);

    match repo.load_all().await {
        Err(LibraryError::CorruptData { key, .. }) => assert_eq!(key, KEY),
        other => panic!("expected corrupt data error, got {:?}", other),
    }

    // Mutations fail before writing, so the unreadable data survives.
    assert!(repo.create(book("Dune", "Frank Herbert")).await.is_err());
    assert_eq!(
        store.get(KEY).await.unwrap().as_deref(),
        Some("{not json")
    );
}

#[tokio::test]
async fn entry_with_null_year_survives_create() {
    let raw = r#"[
        {"id":"a1","title":"Keep me","author":"Someone","year":1999,"genre":"Drama",
         "synopsis":"Fine.","rating":4,"coverUrl":"","type":"book",
         "createdAt":"2023-01-01T00:00:00.000Z","updatedAt":"2023-01-01T00:00:00.000Z"},
        {"id":"a2","title":"Blank year","author":"Someone","year":null,"genre":"Drama",
         "synopsis":"Year left empty.","rating":null,"coverUrl":"","type":"film",
         "createdAt":"2023-01-02T00:00:00.000Z","updatedAt":"2023-01-02T00:00:00.000Z"}
    ]"#;
    let Fixture { repo, store, .. } = fixture_with(InMemoryKeyValueStore::with_value(KEY, raw));

    let loaded = repo.load_all().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!((loaded[1].year, loaded[1].rating), (0, 0));

    repo.create(book("Dune", "Frank Herbert")).await.unwrap();

    let titles: Vec<String> = repo
        .load_all()
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.title)
        .collect();
    assert_eq!(titles, vec!["Keep me", "Blank year", "Dune"]);
    assert!(store.get(KEY).await.unwrap().unwrap().contains("Keep me"));
}

#[tokio::test]
async fn create_over_unreadable_blob_keeps_a_backup() {
    let raw = r#"[{"id":"a1","title":"Keep me","year":"nineteen"}]"#;
    let Fixture { repo, store, clock } =
        fixture_with(InMemoryKeyValueStore::with_value(KEY, raw));
    assert!(repo.load_all().await.unwrap().is_empty());

    let created = repo.create(book("Dune", "Frank Herbert")).await.unwrap();

    let backup_key = repo.unreadable_backup_key(clock.now());
    assert_eq!(backup_key, "book-catalog.unreadable-1725184800000");
    assert_eq!(store.get(&backup_key).await.unwrap().as_deref(), Some(raw));
    assert_eq!(repo.load_all().await.unwrap(), vec![created]);
}

#[tokio::test]
async fn save_all_over_unreadable_blob_keeps_a_backup() {
    let Fixture { repo, store, clock } =
        fixture_with(InMemoryKeyValueStore::with_value(KEY, "{not json"));

    repo.save_all(&[]).await.unwrap();

    let backup_key = repo.unreadable_backup_key(clock.now());
    assert_eq!(
        store.get(&backup_key).await.unwrap().as_deref(),
        Some("{not json")
    );
    assert_eq!(store.get(KEY).await.unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn missing_id_over_unreadable_blob_writes_nothing() {
    let Fixture { repo, store, .. } =
        fixture_with(InMemoryKeyValueStore::with_value(KEY, "{not json"));

    assert!(!repo.delete("a1").await.unwrap());
    assert_eq!(
        repo.update("a1", book("Dune", "Frank Herbert")).await.unwrap(),
        None
    );
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(KEY).await.unwrap().as_deref(), Some("{not json"));
}

#[tokio::test]
async fn storage_read_failure_propagates() {
    let mut store = MockStore::new();
    store
        .expect_get()
        .returning(|_| Err(BridgeError::OperationFailed("disk gone".to_string())));
    store.expect_set().never();

    let repo = KeyValueCatalogRepository::new(Arc::new(store), KEY);

    assert!(matches!(
        repo.load_all().await,
        Err(LibraryError::Bridge(BridgeError::OperationFailed(_)))
    ));
    assert!(repo.create(book("Dune", "Frank Herbert")).await.is_err());
    assert!(repo.delete("x").await.is_err());
}

#[tokio::test]
async fn storage_write_failure_propagates() {
    let mut store = MockStore::new();
    store.expect_get().returning(|_| Ok(None));
    store
        .expect_set()
        .times(1)
        .returning(|_, _| Err(BridgeError::QuotaExceeded("localStorage set_item".to_string())));

    let repo = KeyValueCatalogRepository::new(Arc::new(store), KEY);

    assert!(matches!(
        repo.create(book("Dune", "Frank Herbert")).await,
        Err(LibraryError::Bridge(BridgeError::QuotaExceeded(_)))
    ));
}

#[tokio::test]
async fn stats_on_empty_catalog() {
    let Fixture { repo, .. } = fixture();
    let stats = repo.stats().await.unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.average_rating, 0.0);
}
