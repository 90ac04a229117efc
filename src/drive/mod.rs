use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Url};
use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

pub mod model;

pub use model::{DriveFile, FilesListResponse, FOLDER_MIME};

const PAGE_SIZE: u32 = 1000;

/// Folder-shaped remote file store.
#[async_trait]
pub trait RemoteFileStore: Send + Sync {
    /// Direct, non-trashed children of `folder_id`.
    async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveFile>>;

    /// Fetch a file's bytes into `dest`, returning the byte count.
    async fn download(&self, file_id: &str, dest: &Path) -> Result<u64>;
}

#[derive(Clone)]
pub struct DriveClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl fmt::Debug for DriveClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl DriveClient {
    pub fn new(http: Client, base_url: &str, token: String) -> Result<Self> {
        let base_url = Url::parse(base_url).context("invalid Drive base URL")?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub fn list_url(&self, folder_id: &str, page_token: Option<&str>) -> Result<Url> {
        let query = format!("'{}' in parents and trashed=false", folder_id.replace('\'', "\\'"));
        let mut path = format!(
            "files?q={}&pageSize={}&fields=nextPageToken,files({})",
            urlencoding::encode(&query),
            PAGE_SIZE,
            model::FILE_FIELDS
        );
        if let Some(token) = page_token {
            path.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }
        self.base_url.join(&path).context("invalid Drive list URL")
    }

    pub fn download_url(&self, file_id: &str) -> Result<Url> {
        self.base_url
            .join(&format!("files/{}?alt=media", urlencoding::encode(file_id)))
            .context("invalid Drive download URL")
    }
}

#[async_trait]
impl RemoteFileStore for DriveClient {
    #[instrument(skip(self))]
    async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = self.list_url(folder_id, page_token.as_deref())?;
            let res = self
                .http
                .get(url)
                .bearer_auth(&self.token)
                .send()
                .await
                .context("failed to reach Google Drive")?;
            if !res.status().is_success() {
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                return Err(anyhow!("drive list error {}: {}", status, body));
            }
            let page: FilesListResponse =
                res.json().await.context("invalid Drive list response JSON")?;
            files.extend(page.files);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        debug!(count = files.len(), "listed folder");
        Ok(files)
    }

    #[instrument(skip(self, dest), fields(dest = %dest.display()))]
    async fn download(&self, file_id: &str, dest: &Path) -> Result<u64> {
        let res = self
            .http
            .get(self.download_url(file_id)?)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("failed to reach Google Drive")?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("drive download error {}: {}", status, body));
        }
        let bytes = res.bytes().await.context("failed to read Drive download")?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(dest, &bytes)
            .await
            .with_context(|| format!("failed to write {}", dest.display()))?;
        Ok(bytes.len() as u64)
    }
}

static LINK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"/drive/u/\d+/folders/([a-zA-Z0-9_-]+)",
        r"/drive/folders/([a-zA-Z0-9_-]+)",
        r"/file/d/([a-zA-Z0-9_-]+)",
        r"id=([a-zA-Z0-9_-]+)",
        r"/d/([a-zA-Z0-9_-]+)",
        r"/folders/([a-zA-Z0-9_-]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Pull a folder or file id out of a Drive share link.
pub fn extract_folder_id(link: &str) -> Option<String> {
    LINK_PATTERNS
        .iter()
        .find_map(|re| re.captures(link))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DriveClient {
        DriveClient::new(
            Client::new(),
            "https://www.googleapis.com/drive/v3/",
            "tok".into(),
        )
        .unwrap()
    }

    #[test]
    fn extract_folder_id_from_common_links() {
        assert_eq!(
            extract_folder_id("https://drive.google.com/drive/folders/1AbC-_x?usp=sharing").as_deref(),
            Some("1AbC-_x")
        );
        assert_eq!(
            extract_folder_id("https://drive.google.com/drive/u/1/folders/XYZ").as_deref(),
            Some("XYZ")
        );
        assert_eq!(
            extract_folder_id("https://drive.google.com/file/d/F1/view").as_deref(),
            Some("F1")
        );
        assert_eq!(
            extract_folder_id("https://drive.google.com/open?id=Q9").as_deref(),
            Some("Q9")
        );
        assert_eq!(extract_folder_id("https://vimeo.com/123"), None);
        assert_eq!(extract_folder_id(""), None);
    }

    #[test]
    fn list_url_scopes_query_to_parent() {
        let url = client().list_url("root1", Some("next")).unwrap();
        assert_eq!(url.path(), "/drive/v3/files");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("q".into(), "'root1' in parents and trashed=false".into())));
        assert!(pairs.contains(&("pageToken".into(), "next".into())));
    }

    #[test]
    fn download_url_requests_media() {
        let url = client().download_url("f1").unwrap();
        assert_eq!(url.path(), "/drive/v3/files/f1");
        assert_eq!(url.query(), Some("alt=media"));
    }
}
