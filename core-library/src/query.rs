//! Query helpers over an in-memory catalog.
//!
//! Search is a case-insensitive substring scan over title, author and
//! director. There is no index and no ranking: results keep collection order.

use crate::models::CatalogEntry;
use serde::{Deserialize, Serialize};

/// Filter `entries` down to those matching `query`.
///
/// A blank query returns every entry unchanged.
pub fn search(query: &str, entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries;
    }

    entries
        .into_iter()
        .filter(|entry| matches(entry, &needle))
        .collect()
}

/// Borrowing variant of [`search`].
pub fn search_refs<'a>(query: &str, entries: &'a [CatalogEntry]) -> Vec<&'a CatalogEntry> {
    let needle = query.trim().to_lowercase();
    entries
        .iter()
        .filter(|entry| needle.is_empty() || matches(entry, &needle))
        .collect()
}

fn matches(entry: &CatalogEntry, needle: &str) -> bool {
    entry.title.to_lowercase().contains(needle)
        || entry.author.to_lowercase().contains(needle)
        || entry
            .director
            .as_deref()
            .is_some_and(|director| director.to_lowercase().contains(needle))
}

/// Summary figures for a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total: usize,
    pub books: usize,
    pub films: usize,
    /// Mean rating, 0.0 for an empty catalog
    pub average_rating: f64,
}

impl CatalogStats {
    /// Average rating with one decimal, or `"0"` when there is nothing to
    /// average. Halves round up, so a mean of 4.25 reads "4.3".
    pub fn average_rating_label(&self) -> String {
        if self.total == 0 {
            return "0".to_string();
        }

        // Ratings are whole stars, so the sum is recovered exactly.
        let count = self.total as u64;
        let sum = (self.average_rating * self.total as f64).round() as u64;
        let tenths = (sum * 20 + count) / (2 * count);
        format!("{}.{}", tenths / 10, tenths % 10)
    }
}

pub fn compute_stats(entries: &[CatalogEntry]) -> CatalogStats {
    let films = entries.iter().filter(|entry| entry.is_film()).count();
    let books = entries.len() - films;
    let average_rating = if entries.is_empty() {
        0.0
    } else {
        let sum: u64 = entries.iter().map(|entry| u64::from(entry.rating)).sum();
        sum as f64 / entries.len() as f64
    };

    CatalogStats {
        total: entries.len(),
        books,
        films,
        average_rating,
    }
}
