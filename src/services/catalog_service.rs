//! Genre, actor and director lists.
//!
//! Table and column names come from [`CatalogKind`] and are never taken from
//! user input; only values are bound.

use crate::{
    db::DbPool,
    error::AppError,
    models::catalog::{CatalogEntry, CatalogKind},
};

/// Every entry of one kind, ordered by name.
pub async fn list_entries(pool: &DbPool, kind: CatalogKind) -> Result<Vec<CatalogEntry>, AppError> {
    let sql = format!(
        "SELECT id, {name} AS name FROM {table} ORDER BY {name}, id",
        name = kind.name_column(),
        table = kind.table(),
    );

    let entries = sqlx::query_as::<_, CatalogEntry>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(entries)
}

pub async fn entry_exists(pool: &DbPool, kind: CatalogKind, id: i64) -> Result<bool, AppError> {
    let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", kind.table());

    let exists = sqlx::query_scalar::<_, bool>(&sql)
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(exists)
}

/// Add an entry.
///
/// # Errors
///
/// - `InvalidRequest`: blank name
/// - `Conflict`: an entry of this kind already has the name
pub async fn create_entry(
    pool: &DbPool,
    kind: CatalogKind,
    name: &str,
) -> Result<CatalogEntry, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest(format!(
            "{} is required",
            kind.name_column()
        )));
    }

    let sql = format!(
        "INSERT INTO {table} ({column}) VALUES ($1) RETURNING id, {column} AS name",
        table = kind.table(),
        column = kind.name_column(),
    );

    let entry = sqlx::query_as::<_, CatalogEntry>(&sql)
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("{} {name} already exists", kind.label()))
            }
            _ => AppError::Database(e),
        })?;

    tracing::info!(kind = kind.table(), id = entry.id, "catalog entry created");
    Ok(entry)
}

/// Delete an entry and its links to movies.
///
/// # Errors
///
/// - `NotFound`: unknown id
pub async fn delete_entry(pool: &DbPool, kind: CatalogKind, id: i64) -> Result<(), AppError> {
    let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());

    let result = sqlx::query(&sql).bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(kind.label()));
    }

    tracing::info!(kind = kind.table(), id, "catalog entry deleted");
    Ok(())
}

/// Names of the entries of `kind` linked to a movie, ordered by name.
pub async fn linked_names(
    pool: &DbPool,
    kind: CatalogKind,
    movie_id: i64,
) -> Result<Vec<String>, AppError> {
    let sql = format!(
        r#"
        SELECT e.{name}
        FROM {link} l
        JOIN {table} e ON e.id = l.{column}
        WHERE l.movie_id = $1
        ORDER BY e.{name}
        "#,
        name = kind.name_column(),
        link = kind.link_table(),
        table = kind.table(),
        column = kind.link_column(),
    );

    let names = sqlx::query_scalar::<_, String>(&sql)
        .bind(movie_id)
        .fetch_all(pool)
        .await?;

    Ok(names)
}
