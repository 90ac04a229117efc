//! At-most-once media upload per web-ready file.
use crate::model::{ContentRecord, LedgerEntry, MediaMap, RecordType};
use crate::naming::{is_web_ready, strip_web_suffix};
use crate::store::{self, Pool};
use crate::wordpress::{ContentBackend, WpMedia};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Every media id known for the entity, historical and new, without repeats.
    pub media_ids: Vec<i64>,
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Web-ready images anywhere under `entity_dir`, in path order.
pub fn find_web_ready(entity_dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(entity_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_web_ready(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}

pub fn media_title(entity_title: &str, file_name: &str) -> String {
    format!("{} - {}", entity_title, strip_web_suffix(file_name))
}

pub fn alt_text(entity_title: &str) -> String {
    format!("Image from {}", entity_title)
}

/// Upload every file whose name is not yet in `media_map`, recording each
/// success in the map and returning the new ledger entries.
///
/// A failed upload is logged and skipped.
pub async fn upload_new(
    backend: &dyn ContentBackend,
    entity_title: &str,
    files: &[PathBuf],
    media_map: &mut MediaMap,
    owner_post_id: i64,
    outcome: &mut PublishOutcome,
) -> Vec<LedgerEntry> {
    let mut entries = Vec::new();
    for path in files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if media_map.contains_key(&file_name) {
            outcome.skipped += 1;
            continue;
        }

        let title = media_title(entity_title, &file_name);
        let alt = alt_text(entity_title);
        match backend.upload_media(path, &title, &alt).await {
            Ok(media) => {
                media_map.insert(file_name, media.id);
                outcome.uploaded += 1;
                entries.push(LedgerEntry {
                    id: media.id,
                    title: media.title.text().to_string(),
                    source_url: media.source_url,
                    alt_text: media.alt_text,
                    file_path: path.to_string_lossy().into_owned(),
                    post_id: owner_post_id,
                });
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "media upload failed");
                outcome.failed += 1;
            }
        }
    }
    entries
}

/// Distinct ids of a media map, in filename order.
pub fn distinct_ids(media_map: &MediaMap) -> Vec<i64> {
    let mut seen = HashSet::new();
    media_map
        .values()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Fetch media details for `ids`, keeping input order. Lookups that fail are
/// logged and left out.
pub async fn describe_media(backend: &dyn ContentBackend, ids: &[i64]) -> Vec<WpMedia> {
    let mut media = Vec::with_capacity(ids.len());
    for id in ids {
        match backend.get_media(*id).await {
            Ok(m) => media.push(m),
            Err(err) => warn!(media_id = id, error = %err, "failed to fetch media details"),
        }
    }
    media
}

/// Upload the entity's new web-ready images and persist the merged media map
/// and upload history.
///
/// Failing to read existing bookkeeping aborts the stage; failing to write it
/// is only logged.
#[instrument(skip_all, fields(entity_id = %entity_id))]
pub async fn publish(
    pool: &Pool,
    backend: &dyn ContentBackend,
    entity_id: &str,
    entity_title: &str,
    entity_dir: &Path,
) -> Result<PublishOutcome> {
    let owner_post_id = store::find_record::<ContentRecord>(pool, entity_id, RecordType::Content)
        .await
        .context("failed to load content record")?
        .map(|r| r.post_id)
        .unwrap_or(0);
    let mut media_map: MediaMap = store::find_record(pool, entity_id, RecordType::MediaMap)
        .await
        .context("failed to load media map")?
        .unwrap_or_default();

    let files = find_web_ready(entity_dir);
    let mut outcome = PublishOutcome::default();
    let new_entries = upload_new(
        backend,
        entity_title,
        &files,
        &mut media_map,
        owner_post_id,
        &mut outcome,
    )
    .await;

    if !new_entries.is_empty() {
        if let Err(err) = append_ledger(pool, entity_id, new_entries).await {
            warn!(error = %err, "failed to save media ledger");
        }
    }
    if let Err(err) = store::put_record(pool, entity_id, RecordType::MediaMap, &media_map).await {
        warn!(error = %err, "failed to save media map");
    }

    outcome.media_ids = distinct_ids(&media_map);
    info!(
        files = files.len(),
        uploaded = outcome.uploaded,
        skipped = outcome.skipped,
        failed = outcome.failed,
        total = outcome.media_ids.len(),
        "media publish finished"
    );
    Ok(outcome)
}

async fn append_ledger(pool: &Pool, entity_id: &str, new_entries: Vec<LedgerEntry>) -> Result<()> {
    let mut ledger: Vec<LedgerEntry> =
        store::find_record(pool, entity_id, RecordType::MediaLedger)
            .await?
            .unwrap_or_default();
    let known: HashSet<i64> = ledger.iter().map(|e| e.id).collect();
    ledger.extend(new_entries.into_iter().filter(|e| !known.contains(&e.id)));
    store::put_record(pool, entity_id, RecordType::MediaLedger, &ledger).await?;
    Ok(())
}
