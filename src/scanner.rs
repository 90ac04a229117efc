//! Recursive Drive tree walk.
use crate::drive::{DriveFile, RemoteFileStore};
use crate::model::RemoteFile;
use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

/// Flatten everything under `root_folder_id` into leaf files annotated with
/// their folder lineage.
///
/// Listing the root must succeed. A subfolder that cannot be listed is logged
/// and its subtree dropped; the rest of the walk carries on.
#[instrument(skip(store))]
pub async fn scan(store: &dyn RemoteFileStore, root_folder_id: &str) -> Result<Vec<RemoteFile>> {
    let root_children = store
        .list_children(root_folder_id)
        .await
        .with_context(|| format!("failed to list root folder {}", root_folder_id))?;

    let mut files = Vec::new();
    let mut pending: Vec<(String, String)> = Vec::new();
    collect(root_children, "", &mut files, &mut pending);

    while let Some((folder_id, path)) = pending.pop() {
        match store.list_children(&folder_id).await {
            Ok(children) => collect(children, &path, &mut files, &mut pending),
            Err(err) => {
                warn!(folder_id = %folder_id, path = %path, error = %err, "skipping unreadable subfolder");
            }
        }
    }

    debug!(files = files.len(), "scan complete");
    Ok(files)
}

fn collect(
    children: Vec<DriveFile>,
    parent_path: &str,
    files: &mut Vec<RemoteFile>,
    pending: &mut Vec<(String, String)>,
) {
    for child in children {
        if child.is_folder() {
            let path = if parent_path.is_empty() {
                child.name.clone()
            } else {
                format!("{}/{}", parent_path, child.name)
            };
            pending.push((child.id, path));
        } else {
            files.push(to_remote_file(child, parent_path));
        }
    }
}

fn to_remote_file(child: DriveFile, folder_path: &str) -> RemoteFile {
    let folder_name = folder_path.rsplit('/').next().unwrap_or_default().to_string();
    RemoteFile {
        id: child.id,
        name: child.name,
        mime_type: child.mime_type,
        size: child.size.unwrap_or_default(),
        created_time: child.created_time,
        modified_time: child.modified_time,
        folder_path: folder_path.to_string(),
        folder_name,
    }
}
