use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of bookkeeping row kept per entity in the metadata store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// Last reconciled Drive snapshot (`Vec<RemoteFile>`).
    DriveFiles,
    /// The entity's published post (`ContentRecord`).
    Content,
    /// Filename → media id dedup map (`MediaMap`).
    MediaMap,
    /// Upload history (`Vec<LedgerEntry>`).
    MediaLedger,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::DriveFiles => "drive_files",
            RecordType::Content => "wordpress",
            RecordType::MediaMap => "wp_images",
            RecordType::MediaLedger => "wordpress_media",
        }
    }
}

/// A leaf file found under an entity's Drive folder.
///
/// Serialized with Drive's own key names so stored snapshots stay readable
/// next to raw API output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(default)]
    pub size: String,
    #[serde(rename = "createdTime", default)]
    pub created_time: String,
    #[serde(rename = "modifiedTime", default)]
    pub modified_time: String,
    /// Slash-joined folder lineage relative to the scan root; empty at the root.
    #[serde(default)]
    pub folder_path: String,
    /// Last segment of `folder_path`.
    #[serde(default)]
    pub folder_name: String,
}

/// Filename of a web-ready image → WordPress media id.
pub type MediaMap = BTreeMap<String, i64>;

/// One upload recorded in the media ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: i64,
    pub title: String,
    pub source_url: String,
    pub alt_text: String,
    pub file_path: String,
    /// Owning post; 0 until the post exists.
    #[serde(default)]
    pub post_id: i64,
}

/// Persisted identity of the entity's post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentRecord {
    pub post_id: i64,
    pub title: String,
    pub slug: String,
    pub status: String,
    #[serde(default)]
    pub categories: Vec<i64>,
    pub created_at: String,
    pub updated_at: String,
}
