use super::StoreError;
use crate::model::RecordType;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, instrument};

pub type Pool = SqlitePool;

/// Open the metadata database. The pool is capped at one connection: the run
/// is sequential and an in-memory database must not be split across handles.
pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&normalized)
        .await
        .with_context(|| format!("failed to open metadata store at {}", normalized))?;
    sqlx::query("PRAGMA journal_mode=WAL;").execute(&pool).await?;
    sqlx::query("PRAGMA synchronous=FULL;").execute(&pool).await?;
    Ok(pool)
}

/// Expand a leading `~/` in a file-backed SQLite URL, make sure its parent
/// directory exists and ask SQLite to create the file. In-memory and
/// non-sqlite URLs pass through unchanged.
pub fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = &url["sqlite:".len()..];
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let (path_part, query_part) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(tail), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), tail),
        _ => path_part.to_string(),
    };

    if let Some(parent) = Path::new(&expanded).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let query = match query_part {
        Some(q) if q.contains("mode=") => q.to_string(),
        Some(q) => format!("{}&mode=rwc", q),
        None => "mode=rwc".to_string(),
    };
    format!("sqlite://{}?{}", expanded, query)
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Load and decode one record. Absence is reported as [`StoreError::NotFound`].
#[instrument(skip_all, fields(entity_id = %entity_id, record_type = kind.as_str()))]
pub async fn get_record<T: DeserializeOwned>(
    pool: &Pool,
    entity_id: &str,
    kind: RecordType,
) -> Result<T, StoreError> {
    let data: Option<String> = sqlx::query_scalar(
        "SELECT data FROM metadata WHERE entity_id = ? AND record_type = ?",
    )
    .bind(entity_id)
    .bind(kind.as_str())
    .fetch_optional(pool)
    .await?;

    match data {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Err(StoreError::NotFound {
            entity_id: entity_id.to_string(),
            record_type: kind.as_str(),
        }),
    }
}

/// Like [`get_record`] but maps absence to `None`.
pub async fn find_record<T: DeserializeOwned>(
    pool: &Pool,
    entity_id: &str,
    kind: RecordType,
) -> Result<Option<T>, StoreError> {
    match get_record(pool, entity_id, kind).await {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Insert or replace the record for `(entity_id, kind)`.
#[instrument(skip_all, fields(entity_id = %entity_id, record_type = kind.as_str()))]
pub async fn put_record<T: Serialize + ?Sized>(
    pool: &Pool,
    entity_id: &str,
    kind: RecordType,
    value: &T,
) -> Result<(), StoreError> {
    let data = serde_json::to_string(value)?;
    sqlx::query(
        "INSERT INTO metadata (entity_id, record_type, data) VALUES (?, ?, ?) \
         ON CONFLICT(entity_id, record_type) DO UPDATE SET \
         data = excluded.data, \
         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')",
    )
    .bind(entity_id)
    .bind(kind.as_str())
    .bind(&data)
    .execute(pool)
    .await?;
    debug!(bytes = data.len(), "metadata saved");
    Ok(())
}
