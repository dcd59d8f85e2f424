//! Movie catalog service.
//!
//! Bookings reference movies by id and listings show their titles, so the
//! catalog is the one piece of reference data the booking flow reads on every
//! request. Listing pages are cached by the handler layer; this module only
//! talks to PostgreSQL.

use chrono::NaiveDate;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        catalog::CatalogKind,
        movie::{
            CreateMovieRequest, Movie, MovieDetail, MovieListQuery, MoviePage, MovieSort,
            ShowingMovie, ShowingPage, ShowingQuery,
        },
    },
    services::catalog_service,
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const NOW_SHOWING_PAGE_SIZE: u32 = 12;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Columns of [`ShowingMovie`] over `movies m LEFT JOIN movie_genres mg`.
const SHOWING_COLUMNS: &str = r#"
    m.id, m.title, m.description, m.release_date, m.duration_minutes, m.image, m.created_at,
    COALESCE(
        ARRAY_AGG(mg.genre_id ORDER BY mg.genre_id) FILTER (WHERE mg.genre_id IS NOT NULL),
        '{}'
    ) AS genre_ids
"#;

/// Released, title matches `$1`, and has any genre of `$2` unless `$2` is empty.
const NOW_SHOWING_FILTER: &str = r#"
    m.release_date <= CURRENT_DATE
    AND m.title ILIKE $1
    AND (
        cardinality($2::BIGINT[]) = 0
        OR EXISTS (
            SELECT 1 FROM movie_genres f
            WHERE f.movie_id = m.id AND f.genre_id = ANY($2)
        )
    )
"#;

/// Normalized listing parameters: `(search, page, limit)`.
///
/// Page defaults to 1, limit to [`DEFAULT_PAGE_SIZE`] and is capped at
/// [`MAX_PAGE_SIZE`]. Zero values fall back to the defaults.
pub fn page_params(query: &MovieListQuery) -> (String, u32, u32) {
    let search = query.search.as_deref().unwrap_or_default().trim().to_string();
    let page = query.page.filter(|p| *p > 0).unwrap_or(1);
    let limit = query
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);

    (search, page, limit)
}

/// Normalized now-showing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowingFilter {
    pub search: String,
    /// Sorted, without duplicates
    pub genre_ids: Vec<i64>,
    pub sort: MovieSort,
    pub page: u32,
    pub limit: u32,
}

impl ShowingFilter {
    /// Page defaults to 1 and limit to [`NOW_SHOWING_PAGE_SIZE`], capped at
    /// [`MAX_PAGE_SIZE`]. Genre tokens that are not integers are ignored.
    pub fn from_query(query: &ShowingQuery) -> Self {
        let mut genre_ids: Vec<i64> = query
            .genres
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect();
        genre_ids.sort_unstable();
        genre_ids.dedup();

        Self {
            search: query.search.as_deref().unwrap_or_default().trim().to_string(),
            genre_ids,
            sort: MovieSort::parse(query.sort.as_deref()),
            page: query.page.filter(|p| *p > 0).unwrap_or(1),
            limit: query
                .limit
                .filter(|l| *l > 0)
                .unwrap_or(NOW_SHOWING_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
        }
    }
}

/// List movies whose title contains `search` (case-insensitive), ordered by id.
///
/// # Errors
///
/// - `Database`: storage unavailable or query failed
pub async fn list_movies(
    pool: &DbPool,
    search: &str,
    page: u32,
    limit: u32,
) -> Result<MoviePage, AppError> {
    let pattern = format!("%{}%", escape_like(search));
    let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);

    let movies = sqlx::query_as::<_, Movie>(
        r#"
        SELECT id, title, description, release_date, duration_minutes, image, created_at
        FROM movies
        WHERE title ILIKE $1
        ORDER BY id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(&pattern)
    .bind(i64::from(limit))
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movies WHERE title ILIKE $1")
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    Ok(MoviePage {
        movies,
        page,
        limit,
        total,
    })
}

/// Movies released on or before today.
///
/// # Errors
///
/// - `Database`: storage unavailable or query failed
pub async fn now_showing(pool: &DbPool, filter: &ShowingFilter) -> Result<ShowingPage, AppError> {
    let pattern = format!("%{}%", escape_like(&filter.search));
    let offset = i64::from(filter.page.saturating_sub(1)) * i64::from(filter.limit);

    let sql = format!(
        r#"
        SELECT {SHOWING_COLUMNS}
        FROM movies m
        LEFT JOIN movie_genres mg ON mg.movie_id = m.id
        WHERE {NOW_SHOWING_FILTER}
        GROUP BY m.id
        ORDER BY {order}
        LIMIT $3 OFFSET $4
        "#,
        order = filter.sort.order_by(),
    );

    let movies = sqlx::query_as::<_, ShowingMovie>(&sql)
        .bind(&pattern)
        .bind(filter.genre_ids.as_slice())
        .bind(i64::from(filter.limit))
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM movies m WHERE {NOW_SHOWING_FILTER}");
    let total = sqlx::query_scalar::<_, i64>(&count_sql)
        .bind(&pattern)
        .bind(filter.genre_ids.as_slice())
        .fetch_one(pool)
        .await?;

    Ok(ShowingPage {
        movies,
        page: filter.page,
        limit: filter.limit,
        total,
    })
}

/// Movies released after today, soonest first.
pub async fn upcoming(pool: &DbPool) -> Result<Vec<ShowingMovie>, AppError> {
    let sql = format!(
        r#"
        SELECT {SHOWING_COLUMNS}
        FROM movies m
        LEFT JOIN movie_genres mg ON mg.movie_id = m.id
        WHERE m.release_date > CURRENT_DATE
        GROUP BY m.id
        ORDER BY m.release_date, m.id
        "#
    );

    let movies = sqlx::query_as::<_, ShowingMovie>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(movies)
}

/// Escape `%`, `_` and `\` so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Fetch one movie.
///
/// # Errors
///
/// - `MovieNotFound`: no movie with this id
/// - `Database`: storage failure
pub async fn get_movie(pool: &DbPool, movie_id: i64) -> Result<Movie, AppError> {
    sqlx::query_as::<_, Movie>(
        r#"
        SELECT id, title, description, release_date, duration_minutes, image, created_at
        FROM movies
        WHERE id = $1
        "#,
    )
    .bind(movie_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::MovieNotFound)
}

/// Fetch one movie with the names of its genres, directors and cast.
///
/// # Errors
///
/// - `MovieNotFound`: no movie with this id
pub async fn get_movie_detail(pool: &DbPool, movie_id: i64) -> Result<MovieDetail, AppError> {
    let movie = get_movie(pool, movie_id).await?;

    Ok(MovieDetail {
        genres: catalog_service::linked_names(pool, CatalogKind::Genre, movie_id).await?,
        directors: catalog_service::linked_names(pool, CatalogKind::Director, movie_id).await?,
        casts: catalog_service::linked_names(pool, CatalogKind::Actor, movie_id).await?,
        movie,
    })
}

pub async fn movie_exists(pool: &DbPool, movie_id: i64) -> Result<bool, AppError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM movies WHERE id = $1)")
            .bind(movie_id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// Add a movie to the catalog, linked to the given genres, directors and cast.
///
/// # Process
///
/// 1. Validate title, duration and release date
/// 2. Insert the movie and its links in one transaction
///
/// # Errors
///
/// - `InvalidRequest`: blank title, non-positive duration, malformed release
///   date, or a genre/director/actor id that does not exist
/// - `Database`: storage failure
pub async fn create_movie(pool: &DbPool, request: CreateMovieRequest) -> Result<Movie, AppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidRequest("title is required".to_string()));
    }
    if request.duration_minutes <= 0 {
        return Err(AppError::InvalidRequest(
            "duration_minutes must be positive".to_string(),
        ));
    }
    let release_date = NaiveDate::parse_from_str(request.release_date.trim(), "%Y-%m-%d")
        .map_err(|_| {
            AppError::InvalidRequest("release_date must be formatted as YYYY-MM-DD".to_string())
        })?;

    let mut tx = pool.begin().await?;

    let movie = sqlx::query_as::<_, Movie>(
        r#"
        INSERT INTO movies (title, description, release_date, duration_minutes, image)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, title, description, release_date, duration_minutes, image, created_at
        "#,
    )
    .bind(title)
    .bind(request.description.trim())
    .bind(release_date)
    .bind(request.duration_minutes)
    .bind(request.image.as_deref())
    .fetch_one(&mut *tx)
    .await?;

    let links = [
        (CatalogKind::Genre, &request.genre_ids),
        (CatalogKind::Director, &request.director_ids),
        (CatalogKind::Actor, &request.cast_ids),
    ];
    for (kind, ids) in links {
        if ids.is_empty() {
            continue;
        }

        let sql = format!(
            "INSERT INTO {} (movie_id, {}) SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
            kind.link_table(),
            kind.link_column(),
        );
        let linked = sqlx::query(&sql)
            .bind(movie.id)
            .bind(ids.as_slice())
            .execute(&mut *tx)
            .await;

        if let Err(e) = linked {
            tx.rollback().await?;
            return Err(match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::InvalidRequest(format!(
                        "Unknown {} id",
                        kind.label().to_lowercase()
                    ))
                }
                _ => AppError::Database(e),
            });
        }
    }

    tx.commit().await?;

    tracing::info!(movie_id = movie.id, title = %movie.title, "movie created");

    Ok(movie)
}

/// Link a genre to a movie.
///
/// # Errors
///
/// - `MovieNotFound`: unknown movie
/// - `NotFound`: unknown genre
/// - `Conflict`: the movie already has this genre
pub async fn add_genre(pool: &DbPool, movie_id: i64, genre_id: i64) -> Result<(), AppError> {
    if !movie_exists(pool, movie_id).await? {
        return Err(AppError::MovieNotFound);
    }
    if !catalog_service::entry_exists(pool, CatalogKind::Genre, genre_id).await? {
        return Err(AppError::NotFound(CatalogKind::Genre.label()));
    }

    let result = sqlx::query(
        "INSERT INTO movie_genres (movie_id, genre_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(movie_id)
    .bind(genre_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict("Movie already has this genre".to_string()));
    }

    tracing::info!(movie_id, genre_id, "genre added to movie");
    Ok(())
}

/// Remove a movie that has never been booked.
///
/// # Errors
///
/// - `MovieNotFound`: no movie with this id
/// - `Conflict`: bookings still reference the movie
/// - `Database`: storage failure
pub async fn delete_movie(pool: &DbPool, movie_id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM movies WHERE id = $1")
        .bind(movie_id)
        .execute(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::Conflict("Movie has bookings and cannot be deleted".to_string())
            }
            _ => AppError::Database(e),
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::MovieNotFound);
    }

    tracing::info!(movie_id, "movie deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_apply_defaults_and_cap() {
        let defaults = page_params(&MovieListQuery::default());
        assert_eq!(defaults, (String::new(), 1, DEFAULT_PAGE_SIZE));

        let query = MovieListQuery {
            search: Some("  spider ".to_string()),
            page: Some(0),
            limit: Some(1000),
        };
        assert_eq!(page_params(&query), ("spider".to_string(), 1, MAX_PAGE_SIZE));
    }

    #[test]
    fn showing_filter_normalizes_genres_and_paging() {
        let filter = ShowingFilter::from_query(&ShowingQuery::default());
        assert_eq!(filter.sort, MovieSort::Latest);
        assert_eq!((filter.page, filter.limit), (1, NOW_SHOWING_PAGE_SIZE));
        assert!(filter.genre_ids.is_empty());

        let query = ShowingQuery {
            search: Some(" dune ".to_string()),
            genres: Some("3, 1,x,3,".to_string()),
            sort: Some("name-asc".to_string()),
            page: Some(2),
            limit: Some(500),
        };
        let filter = ShowingFilter::from_query(&query);
        assert_eq!(filter.search, "dune");
        assert_eq!(filter.genre_ids, vec![1, 3]);
        assert_eq!(filter.sort, MovieSort::NameAsc);
        assert_eq!((filter.page, filter.limit), (2, MAX_PAGE_SIZE));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_off"), "100\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
    }
}
