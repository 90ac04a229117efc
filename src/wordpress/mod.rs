use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Map};
use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::config;

pub mod model;

pub use model::{PostPayload, RenderedField, WpCategory, WpMedia, WpPost};

/// Status given to every post this tool writes.
pub const DRAFT: &str = "draft";

/// REST surface of the content backend.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    async fn create_post(&self, payload: &PostPayload) -> Result<WpPost>;

    async fn update_post(&self, post_id: i64, payload: &PostPayload) -> Result<WpPost>;

    async fn get_post(&self, post_id: i64) -> Result<WpPost>;

    async fn upload_media(&self, file_path: &Path, title: &str, alt_text: &str) -> Result<WpMedia>;

    async fn get_media(&self, media_id: i64) -> Result<WpMedia>;

    async fn search_categories(&self, query: &str) -> Result<Vec<WpCategory>>;

    /// Raw bytes behind a media URL.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Clone)]
pub struct WordPressClient {
    http: Client,
    base_url: Url,
    username: String,
    password: String,
    post_type: String,
    category_taxonomy: String,
}

impl fmt::Debug for WordPressClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordPressClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl WordPressClient {
    pub fn from_config(http: Client, cfg: &config::WordPress) -> Result<Self> {
        let root = format!("{}/wp-json/", cfg.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&root).context("invalid WordPress base URL")?;
        Ok(Self {
            http,
            base_url,
            username: cfg.username.clone(),
            password: cfg.application_password.clone(),
            post_type: cfg.post_type.clone(),
            category_taxonomy: cfg.category_taxonomy.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid WordPress endpoint {}", path))
    }

    fn authed(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
    }

    pub fn build_post_request(&self, post_id: Option<i64>, payload: &PostPayload) -> Result<reqwest::Request> {
        let (method, path) = match post_id {
            Some(id) => (Method::PUT, format!("wp/v2/{}/{}", self.post_type, id)),
            None => (Method::POST, format!("wp/v2/{}", self.post_type)),
        };
        self.authed(method, self.endpoint(&path)?)
            .header("Content-Type", "application/json")
            .json(payload)
            .build()
            .context("failed to build WordPress post request")
    }

    pub fn build_category_search(&self, query: &str) -> Result<reqwest::Request> {
        let mut url = self.endpoint(&format!("wp/v2/{}", self.category_taxonomy))?;
        url.query_pairs_mut()
            .append_pair("search", query)
            .append_pair("per_page", "100");
        self.authed(Method::GET, url)
            .build()
            .context("failed to build WordPress category request")
    }

    async fn execute_json<T: DeserializeOwned>(&self, request: reqwest::Request) -> Result<T> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "wordpress request");
        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach WordPress")?;

        let status = res.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = res.text().await.unwrap_or_default();
            warn!("Rate limited by WordPress: {}", body);
            return Err(anyhow!("received 429 from WordPress: {}", body));
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%method, %url, %status, "WordPress API error: {}", body);
            return Err(anyhow!("wordpress error {}: {}", status, body));
        }
        let body = res.text().await.context("failed to read WordPress response")?;
        serde_json::from_str(&body).context("invalid WordPress response JSON")
    }
}

#[async_trait]
impl ContentBackend for WordPressClient {
    #[instrument(skip_all)]
    async fn create_post(&self, payload: &PostPayload) -> Result<WpPost> {
        let post: WpPost = self.execute_json(self.build_post_request(None, payload)?).await?;
        info!(post_id = post.id, slug = %post.slug, "created post");
        Ok(post)
    }

    #[instrument(skip(self, payload))]
    async fn update_post(&self, post_id: i64, payload: &PostPayload) -> Result<WpPost> {
        let post: WpPost = self
            .execute_json(self.build_post_request(Some(post_id), payload)?)
            .await?;
        info!(post_id = post.id, "updated post");
        Ok(post)
    }

    async fn get_post(&self, post_id: i64) -> Result<WpPost> {
        let url = self.endpoint(&format!("wp/v2/{}/{}", self.post_type, post_id))?;
        let request = self.authed(Method::GET, url).build()?;
        self.execute_json(request).await
    }

    #[instrument(skip(self, file_path, alt_text), fields(file = %file_path.display()))]
    async fn upload_media(&self, file_path: &Path, title: &str, alt_text: &str) -> Result<WpMedia> {
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("invalid file name"))?
            .to_string();
        let content = fs::read(file_path)
            .await
            .with_context(|| format!("failed to read file: {}", file_path.display()))?;

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(content)
                    .file_name(file_name.clone())
                    .mime_str(content_type(file_path))?,
            )
            .text("title", title.to_string())
            .text("alt_text", alt_text.to_string());

        let request = self
            .authed(Method::POST, self.endpoint("wp/v2/media")?)
            .multipart(form)
            .build()
            .context("failed to build WordPress media request")?;
        let media: WpMedia = self.execute_json(request).await?;
        info!(media_id = media.id, "uploaded {}", file_name);
        Ok(media)
    }

    async fn get_media(&self, media_id: i64) -> Result<WpMedia> {
        let url = self.endpoint(&format!("wp/v2/media/{}", media_id))?;
        let request = self.authed(Method::GET, url).build()?;
        self.execute_json(request).await
    }

    async fn search_categories(&self, query: &str) -> Result<Vec<WpCategory>> {
        self.execute_json(self.build_category_search(query)?).await
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to download {}", url))?;
        if res.status() != StatusCode::OK {
            return Err(anyhow!("failed to download {}: status {}", url, res.status()));
        }
        Ok(res.bytes().await?.to_vec())
    }
}

/// Post body shared by create and update.
pub fn build_post_payload(
    title: &str,
    slug: &str,
    categories: Vec<i64>,
    featured_media: Option<i64>,
) -> PostPayload {
    let mut meta = Map::new();
    meta.insert("_et_pb_use_builder".into(), json!("on"));
    PostPayload {
        title: title.to_string(),
        slug: slug.to_string(),
        status: DRAFT.to_string(),
        kind: "post".to_string(),
        project_category: categories,
        featured_media: featured_media.filter(|id| *id > 0),
        meta,
    }
}

/// First medium mentioning any keyword, scanning media in order; otherwise
/// the first medium.
pub fn pick_by_keywords<'a>(media: &'a [WpMedia], keywords: &[&str]) -> Option<&'a WpMedia> {
    media
        .iter()
        .find(|m| keywords.iter().any(|kw| m.mentions(kw)))
        .or_else(|| media.first())
}

pub fn content_type(file_path: &Path) -> &'static str {
    match file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_ascii_lowercase())
    {
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "gif" => "image/gif",
        Some(ext) if ext == "webp" => "image/webp",
        Some(ext) if ext == "bmp" => "image/bmp",
        Some(ext) if ext == "tif" || ext == "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}
