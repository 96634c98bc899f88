//! Domain models for the media catalog
//!
//! A catalog holds books and films in one flat list. The JSON shape of these
//! types is the persisted format, so field names follow the web app that
//! first wrote it (`coverUrl`, `type`, `createdAt`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{LibraryError, Result};

/// Genres offered by the entry form. Storage accepts any genre.
pub const GENRE_SUGGESTIONS: [&str; 15] = [
    "Fiction",
    "Non-Fiction",
    "Mystery",
    "Romance",
    "Science Fiction",
    "Fantasy",
    "Biography",
    "History",
    "Drama",
    "Comedy",
    "Action",
    "Adventure",
    "Documentary",
    "Thriller",
    "Horror",
];

/// Cover shown when an entry has no `coverUrl`.
pub const DEFAULT_COVER_URL: &str =
    "https://images.unsplash.com/photo-1481627834876-b7833e8f5570?w=400&h=600&fit=crop&q=80";

/// Accepted publication/release years.
pub const MIN_YEAR: i32 = 1000;
pub const MAX_YEAR: i32 = 2030;

/// Highest star rating.
pub const MAX_RATING: u8 = 5;

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a catalog entry
///
/// New ids are UUIDv4 strings. Ids read from storage are kept verbatim, since
/// older data is not guaranteed to use UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for EntryId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// Kind of catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Book,
    Film,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Film => "film",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A book or film in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Unique identifier, immutable after creation
    pub id: EntryId,
    pub title: String,
    /// Author for books, writer for films
    pub author: String,
    /// Only meaningful for films
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, deserialize_with = "lenient::year")]
    pub year: i32,
    pub genre: String,
    pub synopsis: String,
    /// Star rating, 0 to 5
    #[serde(default, deserialize_with = "lenient::rating")]
    pub rating: u8,
    /// Empty means "use the default placeholder"
    #[serde(default)]
    pub cover_url: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl CatalogEntry {
    /// Build a new entry from caller input. Timestamps are both set to `now`.
    pub fn from_input(id: EntryId, input: EntryInput, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            author: input.author,
            director: input.director,
            year: input.year,
            genre: input.genre,
            synopsis: input.synopsis,
            rating: input.rating,
            cover_url: input.cover_url,
            kind: input.kind,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every field carried by `input`.
    ///
    /// `id` and `created_at` never change; an absent director keeps the stored
    /// one; `updated_at` never moves backwards.
    pub fn apply(&mut self, input: EntryInput, now: DateTime<Utc>) {
        self.title = input.title;
        self.author = input.author;
        if input.director.is_some() {
            self.director = input.director;
        }
        self.year = input.year;
        self.genre = input.genre;
        self.synopsis = input.synopsis;
        self.rating = input.rating;
        self.cover_url = input.cover_url;
        self.kind = input.kind;
        self.updated_at = now.max(self.updated_at);
    }

    /// Cover to display, falling back to [`DEFAULT_COVER_URL`].
    pub fn display_cover(&self) -> &str {
        if self.cover_url.trim().is_empty() {
            DEFAULT_COVER_URL
        } else {
            &self.cover_url
        }
    }

    /// Person to credit on a card: the director for films when known,
    /// otherwise the author.
    pub fn display_creator(&self) -> &str {
        match (self.kind, self.director.as_deref()) {
            (EntryKind::Film, Some(director)) if !director.trim().is_empty() => director,
            _ => &self.author,
        }
    }

    pub fn is_film(&self) -> bool {
        matches!(self.kind, EntryKind::Film)
    }

    /// Project the editable fields back into an input, e.g. to prefill a form.
    pub fn to_input(&self) -> EntryInput {
        EntryInput {
            title: self.title.clone(),
            author: self.author.clone(),
            director: self.director.clone(),
            year: self.year,
            genre: self.genre.clone(),
            synopsis: self.synopsis.clone(),
            rating: self.rating,
            cover_url: self.cover_url.clone(),
            kind: self.kind,
        }
    }
}

/// Caller-supplied entry data: everything except `id` and timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInput {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, deserialize_with = "lenient::year")]
    pub year: i32,
    pub genre: String,
    pub synopsis: String,
    #[serde(default, deserialize_with = "lenient::rating")]
    pub rating: u8,
    #[serde(default)]
    pub cover_url: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl EntryInput {
    /// Validates the same required fields and ranges the entry form checks.
    ///
    /// The store itself never calls this.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("title", &self.title),
            ("author", &self.author),
            ("genre", &self.genre),
            ("synopsis", &self.synopsis),
        ] {
            if value.trim().is_empty() {
                return Err(LibraryError::invalid(field, "must not be empty"));
            }
        }

        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(LibraryError::invalid(
                "year",
                format!("must be between {} and {}", MIN_YEAR, MAX_YEAR),
            ));
        }

        if self.rating > MAX_RATING {
            return Err(LibraryError::invalid(
                "rating",
                format!("must be between 0 and {}", MAX_RATING),
            ));
        }

        Ok(())
    }
}

/// Numbers as the entry form stored them. An emptied number input was saved
/// as `null`, so `null` and non-finite values read as 0 and fractions are
/// brought back to whole numbers.
mod lenient {
    use super::MAX_RATING;
    use serde::{Deserialize, Deserializer};

    pub fn year<'de, D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<f64>::deserialize(deserializer)? {
            Some(value) if value.is_finite() => value.trunc() as i32,
            _ => 0,
        })
    }

    pub fn rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<f64>::deserialize(deserializer)? {
            Some(value) if value.is_finite() => {
                value.round().clamp(0.0, f64::from(MAX_RATING)) as u8
            }
            _ => 0,
        })
    }
}

/// Timestamps in the `Date.toISOString` format: UTC, millisecond precision,
/// `Z` suffix. Any RFC 3339 offset is accepted when reading.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
    }
}
