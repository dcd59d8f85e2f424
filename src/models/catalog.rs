//! Genres, actors and directors.
//!
//! The three lists share one shape (an id and a unique name) and differ only in
//! the table they live in and the join table that links them to movies.

use serde::{Deserialize, Serialize};

/// Which name list an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Genre,
    Actor,
    Director,
}

impl CatalogKind {
    pub fn table(self) -> &'static str {
        match self {
            CatalogKind::Genre => "genres",
            CatalogKind::Actor => "actors",
            CatalogKind::Director => "directors",
        }
    }

    pub fn name_column(self) -> &'static str {
        match self {
            CatalogKind::Genre => "genre_name",
            CatalogKind::Actor => "actor_name",
            CatalogKind::Director => "director_name",
        }
    }

    /// Join table linking entries to movies.
    pub fn link_table(self) -> &'static str {
        match self {
            CatalogKind::Genre => "movie_genres",
            CatalogKind::Actor => "movie_casts",
            CatalogKind::Director => "movie_directors",
        }
    }

    /// Column of [`Self::link_table`] that references this kind.
    pub fn link_column(self) -> &'static str {
        match self {
            CatalogKind::Genre => "genre_id",
            CatalogKind::Actor => "actor_id",
            CatalogKind::Director => "director_id",
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            CatalogKind::Genre => "Genre",
            CatalogKind::Actor => "Actor",
            CatalogKind::Director => "Director",
        }
    }
}

/// One genre, actor or director.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
}

/// Request body for adding a genre, actor or director.
///
/// The kind-specific field names (`genre_name`, `actor_name`,
/// `director_name`) are accepted as aliases of `name`.
#[derive(Debug, Deserialize)]
pub struct CreateCatalogEntryRequest {
    #[serde(alias = "genre_name", alias = "actor_name", alias = "director_name")]
    pub name: String,
}
