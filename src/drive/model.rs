//! Drive v3 response types.
use serde::{Deserialize, Serialize};

pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Fields requested for every listed child.
pub const FILE_FIELDS: &str = "id,name,mimeType,size,createdTime,modifiedTime";

/// A direct child of a Drive folder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// Omitted by Drive for folders and native documents.
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub modified_time: String,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_files_list_response() {
        let raw = r#"{
            "nextPageToken": "p2",
            "files": [
                {"id": "1", "name": "Stills", "mimeType": "application/vnd.google-apps.folder"},
                {"id": "2", "name": "a.jpg", "mimeType": "image/jpeg", "size": "2048",
                 "createdTime": "2025-01-01T00:00:00Z", "modifiedTime": "2025-01-02T00:00:00Z"}
            ]
        }"#;
        let resp: FilesListResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.next_page_token.as_deref(), Some("p2"));
        assert!(resp.files[0].is_folder());
        assert!(resp.files[0].size.is_none());
        assert_eq!(resp.files[1].size.as_deref(), Some("2048"));
    }

    #[test]
    fn empty_listing_has_no_token() {
        let resp: FilesListResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.files.is_empty());
        assert!(resp.next_page_token.is_none());
    }
}
