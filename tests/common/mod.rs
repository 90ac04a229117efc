#![allow(dead_code)]

use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use reel_sync::drive::{DriveFile, RemoteFileStore, FOLDER_MIME};
use reel_sync::optimize::ImageOptimizer;
use reel_sync::store::{self, Pool};
use reel_sync::wordpress::{ContentBackend, PostPayload, RenderedField, WpCategory, WpMedia, WpPost};

pub async fn setup_pool() -> Pool {
    let pool = store::init_pool("sqlite::memory:").await.unwrap();
    store::run_migrations(&pool).await.unwrap();
    pool
}

pub fn folder(id: &str, name: &str) -> DriveFile {
    DriveFile {
        id: id.into(),
        name: name.into(),
        mime_type: FOLDER_MIME.into(),
        size: None,
        created_time: "2025-01-01T00:00:00Z".into(),
        modified_time: "2025-01-01T00:00:00Z".into(),
    }
}

pub fn file(id: &str, name: &str, mime: &str) -> DriveFile {
    DriveFile {
        id: id.into(),
        name: name.into(),
        mime_type: mime.into(),
        size: Some("3".into()),
        created_time: "2025-01-01T00:00:00Z".into(),
        modified_time: "2025-01-01T00:00:00Z".into(),
    }
}

pub fn jpeg(id: &str, name: &str) -> DriveFile {
    file(id, name, "image/jpeg")
}

/// Scripted folder tree. Listing a folder in `failing` errors; downloads
/// write a few bytes to the destination.
#[derive(Clone, Default)]
pub struct FakeDrive {
    folders: HashMap<String, Vec<DriveFile>>,
    failing: HashSet<String>,
    failing_downloads: HashSet<String>,
    listed: Arc<Mutex<Vec<String>>>,
    downloads: Arc<Mutex<Vec<String>>>,
}

impl FakeDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder(mut self, id: &str, children: Vec<DriveFile>) -> Self {
        self.folders.insert(id.into(), children);
        self
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.into());
        self
    }

    pub fn failing_download(mut self, id: &str) -> Self {
        self.failing_downloads.insert(id.into());
        self
    }

    pub async fn listed(&self) -> Vec<String> {
        self.listed.lock().await.clone()
    }

    pub async fn downloads(&self) -> Vec<String> {
        self.downloads.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl RemoteFileStore for FakeDrive {
    async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        self.listed.lock().await.push(folder_id.to_string());
        if self.failing.contains(folder_id) {
            return Err(anyhow!("listing {} failed", folder_id));
        }
        Ok(self.folders.get(folder_id).cloned().unwrap_or_default())
    }

    async fn download(&self, file_id: &str, dest: &Path) -> Result<u64> {
        self.downloads.lock().await.push(file_id.to_string());
        if self.failing_downloads.contains(file_id) {
            return Err(anyhow!("download {} failed", file_id));
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, b"img")?;
        Ok(3)
    }
}

/// Writes an empty web-ready file instead of decoding anything.
#[derive(Clone, Default)]
pub struct TouchOptimizer {
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl TouchOptimizer {
    pub async fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl ImageOptimizer for TouchOptimizer {
    async fn optimize(&self, src: &Path, dest: &Path) -> Result<()> {
        self.calls.lock().await.push(src.to_path_buf());
        std::fs::write(dest, b"web")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UploadCall {
    pub path: PathBuf,
    pub title: String,
    pub alt_text: String,
}

/// In-memory content backend recording every mutating call.
#[derive(Clone)]
pub struct RecordingBackend {
    next_id: Arc<Mutex<i64>>,
    categories: Vec<WpCategory>,
    create_responses: Arc<Mutex<VecDeque<Result<WpPost>>>>,
    media: Arc<Mutex<HashMap<i64, WpMedia>>>,
    creates: Arc<Mutex<Vec<PostPayload>>>,
    updates: Arc<Mutex<Vec<(i64, PostPayload)>>>,
    uploads: Arc<Mutex<Vec<UploadCall>>>,
    searches: Arc<Mutex<Vec<String>>>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            next_id: Arc::new(Mutex::new(100)),
            categories: Vec::new(),
            create_responses: Arc::default(),
            media: Arc::default(),
            creates: Arc::default(),
            updates: Arc::default(),
            uploads: Arc::default(),
            searches: Arc::default(),
        }
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(mut self, categories: Vec<WpCategory>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_create_responses(self, responses: Vec<Result<WpPost>>) -> Self {
        Self {
            create_responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..self
        }
    }

    async fn allocate_id(&self) -> i64 {
        let mut guard = self.next_id.lock().await;
        *guard += 1;
        *guard
    }

    pub async fn creates(&self) -> Vec<PostPayload> {
        self.creates.lock().await.clone()
    }

    pub async fn updates(&self) -> Vec<(i64, PostPayload)> {
        self.updates.lock().await.clone()
    }

    pub async fn uploads(&self) -> Vec<UploadCall> {
        self.uploads.lock().await.clone()
    }

    pub async fn searches(&self) -> Vec<String> {
        self.searches.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl ContentBackend for RecordingBackend {
    async fn create_post(&self, payload: &PostPayload) -> Result<WpPost> {
        self.creates.lock().await.push(payload.clone());
        if let Some(scripted) = self.create_responses.lock().await.pop_front() {
            return scripted;
        }
        Ok(WpPost {
            id: self.allocate_id().await,
            title: RenderedField::Plain(payload.title.clone()),
            slug: payload.slug.clone(),
            status: payload.status.clone(),
            ..Default::default()
        })
    }

    async fn update_post(&self, post_id: i64, payload: &PostPayload) -> Result<WpPost> {
        self.updates.lock().await.push((post_id, payload.clone()));
        Ok(WpPost {
            id: post_id,
            title: RenderedField::Plain(payload.title.clone()),
            slug: payload.slug.clone(),
            status: payload.status.clone(),
            ..Default::default()
        })
    }

    async fn get_post(&self, post_id: i64) -> Result<WpPost> {
        Ok(WpPost {
            id: post_id,
            ..Default::default()
        })
    }

    async fn upload_media(&self, file_path: &Path, title: &str, alt_text: &str) -> Result<WpMedia> {
        self.uploads.lock().await.push(UploadCall {
            path: file_path.to_path_buf(),
            title: title.to_string(),
            alt_text: alt_text.to_string(),
        });
        let id = self.allocate_id().await;
        let name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media = WpMedia {
            id,
            title: RenderedField::Plain(title.to_string()),
            source_url: format!("https://cdn.test/uploads/{}", name),
            alt_text: alt_text.to_string(),
        };
        self.media.lock().await.insert(id, media.clone());
        Ok(media)
    }

    async fn get_media(&self, media_id: i64) -> Result<WpMedia> {
        self.media
            .lock()
            .await
            .get(&media_id)
            .cloned()
            .ok_or_else(|| anyhow!("media {} not found", media_id))
    }

    async fn search_categories(&self, query: &str) -> Result<Vec<WpCategory>> {
        self.searches.lock().await.push(query.to_string());
        Ok(self.categories.clone())
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        if url.contains("broken") {
            return Err(anyhow!("fetch {} failed", url));
        }
        Ok(b"bytes".to_vec())
    }
}
