//! Catalog walkthrough on the desktop stack
//!
//! Run with:
//! ```bash
//! # Fresh database under the system temp dir
//! cargo run -p core-service --example catalog_demo
//!
//! # Custom database path and JSON logs
//! cargo run -p core-service --example catalog_demo -- ./catalog.db json
//! ```

use anyhow::Context;
use bridge_traits::time::{ConsoleLogger, LogLevel};
use core_library::models::{EntryInput, EntryKind, GENRE_SUGGESTIONS};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let path = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("catalog-demo.db"));
    let format = match args.get(2) {
        Some(name) => name.parse::<LogFormat>()?,
        None => LogFormat::Pretty,
    };

    init_logging(
        LoggingConfig::default()
            .format(format)
            .level(LogLevel::Debug)
            .sink(Arc::new(ConsoleLogger::new(LogLevel::Warn))),
    )?;

    let catalog = core_service::bootstrap_desktop(&path)
        .with_context(|| format!("opening catalog at {}", path.display()))?;

    info!(path = %path.display(), "Catalog opened");
    info!(genres = GENRE_SUGGESTIONS.len(), "Genre suggestions available");

    let dune = catalog
        .create_validated(EntryInput {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            director: None,
            year: 1965,
            genre: "Science Fiction".to_string(),
            synopsis: "A desert planet, a noble house, and the spice.".to_string(),
            rating: 5,
            cover_url: String::new(),
            kind: EntryKind::Book,
        })
        .await?;

    let film = catalog
        .create_validated(EntryInput {
            title: "Dune: Part One".to_string(),
            author: "Jon Spaihts".to_string(),
            director: Some("Denis Villeneuve".to_string()),
            year: 2021,
            genre: "Science Fiction".to_string(),
            synopsis: "Paul Atreides arrives on Arrakis.".to_string(),
            rating: 4,
            cover_url: String::new(),
            kind: EntryKind::Film,
        })
        .await?;

    for entry in catalog.search("dune").await? {
        info!(
            id = %entry.id,
            kind = %entry.kind,
            creator = entry.display_creator(),
            cover = entry.display_cover(),
            "Search hit: {}",
            entry.title
        );
    }

    let stats = catalog.stats().await?;
    info!(
        total = stats.total,
        books = stats.books,
        films = stats.films,
        average = %stats.average_rating_label(),
        "Catalog stats"
    );

    catalog.delete(dune.id.as_str()).await?;
    catalog.delete(film.id.as_str()).await?;
    info!(remaining = catalog.load_all().await?.len(), "Demo entries removed");

    Ok(())
}
