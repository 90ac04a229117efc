//! Change detection between a fresh Drive scan and the last stored snapshot.
use crate::drive::RemoteFileStore;
use crate::model::{RecordType, RemoteFile};
use crate::naming::{self, optimized_path};
use crate::optimize::ImageOptimizer;
use crate::scanner;
use crate::store::{self, Pool};
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

pub const IMAGE_MIMES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/tiff",
];

/// Folder names whose images are synchronised. Compared lowercased.
pub const ALLOWED_FOLDERS: &[&str] = &["background", "featured image", "stills", "dir"];

pub fn is_image_mime(mime: &str) -> bool {
    IMAGE_MIMES.iter().any(|m| m.eq_ignore_ascii_case(mime))
}

pub fn is_allowed_folder(folder_name: &str) -> bool {
    let lowered = folder_name.trim().to_lowercase();
    !lowered.is_empty() && ALLOWED_FOLDERS.contains(&lowered.as_str())
}

/// Images sitting directly in an allow-listed folder.
pub fn filter_eligible(scan: &[RemoteFile]) -> Vec<RemoteFile> {
    scan.iter()
        .filter(|f| is_image_mime(&f.mime_type) && is_allowed_folder(&f.folder_name))
        .cloned()
        .collect()
}

/// Where a remote file lands locally: `{entity_dir}/{folder_path}/{name}`.
/// Every remote name is reduced to a single component first, so the result
/// always stays under `entity_dir`.
pub fn destination_path(entity_dir: &Path, file: &RemoteFile) -> PathBuf {
    let mut dest = entity_dir.to_path_buf();
    for segment in file.folder_path.split('/').filter(|s| !s.is_empty()) {
        dest.push(naming::path_segment(segment));
    }
    dest.push(naming::path_segment(&file.name));
    dest
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Subset of `eligible` that must be fetched.
    pub to_download: Vec<RemoteFile>,
    /// Full filtered scan; becomes the next snapshot.
    pub eligible: Vec<RemoteFile>,
    pub unchanged_count: usize,
    pub missing_count: usize,
    pub new_count: usize,
}

/// Classify every eligible file as new, missing or unchanged.
///
/// `previous` is `None` on the first run for an entity, in which case every
/// eligible file is new. `is_present` reports whether a known file already
/// exists on disk.
pub fn reconcile<F>(current: &[RemoteFile], previous: Option<&[RemoteFile]>, is_present: F) -> Reconciliation
where
    F: Fn(&RemoteFile) -> bool,
{
    let eligible = filter_eligible(current);
    let mut out = Reconciliation::default();

    match previous {
        None => {
            out.new_count = eligible.len();
            out.to_download = eligible.clone();
        }
        Some(previous) => {
            let known: HashMap<&str, &RemoteFile> =
                previous.iter().map(|f| (f.id.as_str(), f)).collect();
            for file in &eligible {
                if !known.contains_key(file.id.as_str()) {
                    out.new_count += 1;
                    out.to_download.push(file.clone());
                } else if !is_present(file) {
                    out.missing_count += 1;
                    out.to_download.push(file.clone());
                } else {
                    out.unchanged_count += 1;
                }
            }
        }
    }

    out.eligible = eligible;
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub scanned: usize,
    pub eligible: usize,
    pub new_count: usize,
    pub missing_count: usize,
    pub unchanged_count: usize,
    pub downloaded: usize,
    pub download_failures: usize,
    pub optimized: usize,
}

/// Scan, reconcile, download, optimise and replace the stored snapshot for
/// one entity.
///
/// Only a failure to list the root folder is returned as an error. Individual
/// downloads, optimisations and the snapshot write are best-effort.
#[instrument(skip_all, fields(entity_id = %entity_id, folder_id = %root_folder_id))]
pub async fn sync_entity_files(
    pool: &Pool,
    drive: &dyn RemoteFileStore,
    optimizer: &dyn ImageOptimizer,
    entity_id: &str,
    entity_dir: &Path,
    root_folder_id: &str,
) -> Result<SyncReport> {
    let scan = scanner::scan(drive, root_folder_id).await?;

    let previous: Option<Vec<RemoteFile>> =
        match store::get_record(pool, entity_id, RecordType::DriveFiles).await {
            Ok(files) => Some(files),
            Err(err) if err.is_not_found() => None,
            Err(err) => {
                warn!(error = %err, "failed to load drive snapshot; treating all files as new");
                None
            }
        };

    let plan = reconcile(&scan, previous.as_deref(), |f| {
        destination_path(entity_dir, f).exists()
    });
    info!(
        scanned = scan.len(),
        eligible = plan.eligible.len(),
        new = plan.new_count,
        missing = plan.missing_count,
        unchanged = plan.unchanged_count,
        "reconciled drive files"
    );

    let mut report = SyncReport {
        scanned: scan.len(),
        eligible: plan.eligible.len(),
        new_count: plan.new_count,
        missing_count: plan.missing_count,
        unchanged_count: plan.unchanged_count,
        ..Default::default()
    };

    for file in &plan.to_download {
        let dest = destination_path(entity_dir, file);
        match drive.download(&file.id, &dest).await {
            Ok(bytes) => {
                debug!(file_id = %file.id, bytes, dest = %dest.display(), "downloaded");
                report.downloaded += 1;
            }
            Err(err) => {
                warn!(file_id = %file.id, name = %file.name, error = %err, "download failed");
                report.download_failures += 1;
            }
        }
    }

    for file in &plan.eligible {
        let original = destination_path(entity_dir, file);
        let optimized = optimized_path(&original);
        if !original.exists() || optimized.exists() {
            continue;
        }
        match optimizer.optimize(&original, &optimized).await {
            Ok(()) => report.optimized += 1,
            Err(err) => {
                warn!(path = %original.display(), error = %err, "image optimisation failed")
            }
        }
    }

    if let Err(err) = store::put_record(pool, entity_id, RecordType::DriveFiles, &plan.eligible).await {
        warn!(error = %err, "failed to save drive snapshot");
    }

    Ok(report)
}
