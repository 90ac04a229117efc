//! One post per entity: create on first run, update by stored id afterwards.
use crate::entity::FilmRecord;
use crate::model::{ContentRecord, LedgerEntry, RecordType};
use crate::naming::post_slug;
use crate::store::{self, Pool};
use crate::wordpress::{build_post_payload, pick_by_keywords, ContentBackend, WpCategory, WpMedia};
use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Keywords marking a medium as the post's featured image.
pub const FEATURED_KEYWORDS: &[&str] = &["poster", "portada", "cover"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertState {
    NoRecord,
    RecordExists(ContentRecord),
}

impl UpsertState {
    pub fn from_record(record: Option<ContentRecord>) -> Self {
        match record {
            Some(r) => UpsertState::RecordExists(r),
            None => UpsertState::NoRecord,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertState::NoRecord => "no_record",
            UpsertState::RecordExists(_) => "record_exists",
        }
    }
}

/// Category whose name contains the requested one: first in hyphenated form
/// (`"Corto Ficción"` → `"corto-ficción"`), then as typed.
pub fn match_category<'a>(candidates: &'a [WpCategory], name: &str) -> Option<&'a WpCategory> {
    let raw = name.trim().to_lowercase();
    if raw.is_empty() {
        return None;
    }
    let hyphenated = raw.split_whitespace().collect::<Vec<_>>().join("-");
    candidates
        .iter()
        .find(|c| {
            c.name.to_lowercase().contains(&hyphenated) || c.slug.to_lowercase().contains(&hyphenated)
        })
        .or_else(|| candidates.iter().find(|c| c.name.to_lowercase().contains(&raw)))
}

/// Zero ids removed, duplicates dropped, first occurrence kept.
pub fn clean_categories(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| *id != 0 && seen.insert(*id))
        .collect()
}

/// Resolve section names to category ids. Each match contributes its own id
/// and its parent's. Search errors and misses are logged and skipped.
///
/// `search_query` narrows the taxonomy search (the edition year); without it
/// each name is searched for directly.
pub async fn resolve_categories(
    backend: &dyn ContentBackend,
    names: &[String],
    search_query: Option<&str>,
) -> Vec<i64> {
    let mut ids = Vec::new();
    for name in names {
        let query = search_query.unwrap_or(name.as_str());
        let candidates = match backend.search_categories(query).await {
            Ok(c) => c,
            Err(err) => {
                warn!(category = %name, error = %err, "category search failed");
                continue;
            }
        };
        match match_category(&candidates, name) {
            Some(found) => {
                debug!(category = %name, id = found.id, parent = found.parent, "category matched");
                ids.push(found.id);
                ids.push(found.parent);
            }
            None => warn!(category = %name, "category not found"),
        }
    }
    clean_categories(ids)
}

pub fn select_featured(media: &[WpMedia]) -> Option<i64> {
    pick_by_keywords(media, FEATURED_KEYWORDS).map(|m| m.id)
}

/// Create or update the entity's post.
///
/// A failed backend call is returned as an error. Persisting the record and
/// backfilling the media ledger afterwards are best-effort.
#[instrument(skip_all, fields(entity_id = %entity_id))]
pub async fn upsert(
    pool: &Pool,
    backend: &dyn ContentBackend,
    entity_id: &str,
    film: &FilmRecord,
    year: &str,
    media: &[WpMedia],
) -> Result<ContentRecord> {
    let existing: Option<ContentRecord> = store::find_record(pool, entity_id, RecordType::Content)
        .await
        .context("failed to load content record")?;
    let state = UpsertState::from_record(existing);

    let title = film.title.clone();
    let slug = post_slug(&title, &film.section, year);
    let query = if year.is_empty() { None } else { Some(year) };
    let categories = resolve_categories(backend, &film.section_names(), query).await;
    let featured = select_featured(media);
    let payload = build_post_payload(&title, &slug, categories.clone(), featured);
    debug!(state = state.as_str(), %slug, ?featured, categories = ?categories, "upserting post");

    let now = Utc::now().to_rfc3339();
    let record = match state {
        UpsertState::NoRecord => {
            let post = backend
                .create_post(&payload)
                .await
                .context("failed to create post")?;
            info!(post_id = post.id, "post created");
            ContentRecord {
                post_id: post.id,
                title,
                slug: if post.slug.is_empty() { slug } else { post.slug },
                status: if post.status.is_empty() { payload.status.clone() } else { post.status },
                categories,
                created_at: now.clone(),
                updated_at: now,
            }
        }
        UpsertState::RecordExists(previous) => {
            let post = backend
                .update_post(previous.post_id, &payload)
                .await
                .with_context(|| format!("failed to update post {}", previous.post_id))?;
            info!(post_id = previous.post_id, "post updated");
            ContentRecord {
                post_id: previous.post_id,
                title,
                slug: if post.slug.is_empty() { slug } else { post.slug },
                status: if post.status.is_empty() { payload.status.clone() } else { post.status },
                categories,
                created_at: previous.created_at,
                updated_at: now,
            }
        }
    };

    if let Err(err) = store::put_record(pool, entity_id, RecordType::Content, &record).await {
        warn!(error = %err, "failed to save content record");
    }
    match backfill_ledger(pool, entity_id, record.post_id).await {
        Ok(0) => {}
        Ok(n) => debug!(entries = n, "ledger entries linked to post"),
        Err(err) => warn!(error = %err, "failed to link media ledger to post"),
    }

    Ok(record)
}

/// Point ledger entries without an owner at `post_id`. Returns how many
/// entries changed.
pub async fn backfill_ledger(pool: &Pool, entity_id: &str, post_id: i64) -> Result<usize> {
    let Some(mut ledger) =
        store::find_record::<Vec<LedgerEntry>>(pool, entity_id, RecordType::MediaLedger).await?
    else {
        return Ok(0);
    };
    let mut changed = 0;
    for entry in ledger.iter_mut().filter(|e| e.post_id == 0) {
        entry.post_id = post_id;
        changed += 1;
    }
    if changed > 0 {
        store::put_record(pool, entity_id, RecordType::MediaLedger, &ledger).await?;
    }
    Ok(changed)
}
