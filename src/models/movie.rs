//! Movie catalog models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Represents a movie record from the `movies` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration_minutes: i32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for adding a movie (admin only).
///
/// ```json
/// {
///   "title": "Spider-Man: No Way Home",
///   "description": "...",
///   "release_date": "2021-12-15",
///   "duration_minutes": 148,
///   "image": "https://...",
///   "genre_ids": [1, 4],
///   "director_ids": [2],
///   "cast_ids": [7, 8]
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `YYYY-MM-DD`
    pub release_date: String,
    pub duration_minutes: i32,
    pub image: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub director_ids: Vec<i64>,
    /// Actor ids
    #[serde(default)]
    pub cast_ids: Vec<i64>,
}

/// Request body for `POST /api/v1/movies/add-genre`.
#[derive(Debug, Deserialize)]
pub struct AddGenreRequest {
    #[serde(alias = "idmovie")]
    pub movie_id: i64,
    #[serde(alias = "idgenre")]
    pub genre_id: i64,
}

/// A movie with the names of its genres, directors and cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    pub genres: Vec<String>,
    pub directors: Vec<String>,
    pub casts: Vec<String>,
}

/// A movie in the now-showing or upcoming lists, with its genre ids.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct ShowingMovie {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub movie: Movie,
    pub genre_ids: Vec<i64>,
}

/// Query string for the movie listing.
#[derive(Debug, Default, Deserialize)]
pub struct MovieListQuery {
    /// Case-insensitive title fragment
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Query string for `GET /api/v1/movies/now-showing`.
#[derive(Debug, Default, Deserialize)]
pub struct ShowingQuery {
    pub search: Option<String>,
    /// Comma-separated genre ids; a movie matches if it has any of them
    pub genres: Option<String>,
    /// `latest` (default), `name-asc` or `name-desc`
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Ordering of the now-showing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieSort {
    /// Newest release first
    Latest,
    NameAsc,
    NameDesc,
    /// Catalog order; used for unrecognized values
    Id,
}

impl MovieSort {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("latest") => MovieSort::Latest,
            Some("name-asc") => MovieSort::NameAsc,
            Some("name-desc") => MovieSort::NameDesc,
            Some(_) => MovieSort::Id,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MovieSort::Latest => "latest",
            MovieSort::NameAsc => "name-asc",
            MovieSort::NameDesc => "name-desc",
            MovieSort::Id => "id",
        }
    }

    /// `ORDER BY` clause over the `m` alias of `movies`.
    pub fn order_by(self) -> &'static str {
        match self {
            MovieSort::Latest => "m.release_date DESC, m.id DESC",
            MovieSort::NameAsc => "m.title ASC, m.id",
            MovieSort::NameDesc => "m.title DESC, m.id",
            MovieSort::Id => "m.id",
        }
    }
}

/// A page of now-showing movies plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowingPage {
    pub movies: Vec<ShowingMovie>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

/// A page of movies plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_defaults_to_latest_and_falls_back_to_id() {
        assert_eq!(MovieSort::parse(None), MovieSort::Latest);
        assert_eq!(MovieSort::parse(Some("latest")), MovieSort::Latest);
        assert_eq!(MovieSort::parse(Some("name-desc")), MovieSort::NameDesc);
        assert_eq!(MovieSort::parse(Some("rating")), MovieSort::Id);
    }

    #[test]
    fn add_genre_accepts_legacy_field_names() {
        let request: AddGenreRequest =
            serde_json::from_str(r#"{"idmovie": 3, "idgenre": 5}"#).unwrap();
        assert_eq!((request.movie_id, request.genre_id), (3, 5));
    }
}
