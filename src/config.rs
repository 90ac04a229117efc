//! Configuration loader and validator for the sync engine.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub google: Google,
    pub wordpress: WordPress,
    #[serde(default)]
    pub image: Image,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    /// Root for the database and log file.
    pub data_dir: String,
    /// Per-entity workspaces live under here.
    #[serde(default = "default_films_dir")]
    pub films_dir: String,
    /// Holds `{year}.json` style configurations.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    /// Holds `{year}.json` festival metadata (cities, dates).
    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: String,
    #[serde(default)]
    pub database_url: Option<String>,
    /// When set, a JSON-lines copy of the log is appended here.
    #[serde(default)]
    pub log_file: Option<String>,
}

/// Google Sheets + Drive access.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Google {
    pub access_token: String,
    pub sheet_id: String,
    #[serde(default = "default_sheet_range")]
    pub sheet_range: String,
    #[serde(default = "default_sheets_base")]
    pub sheets_base_url: String,
    #[serde(default = "default_drive_base")]
    pub drive_base_url: String,
}

/// WordPress REST credentials and endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordPress {
    pub base_url: String,
    pub username: String,
    pub application_password: String,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default = "default_category_taxonomy")]
    pub category_taxonomy: String,
}

/// Web-ready image settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Image {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
}

impl Default for Image {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            quality: 85,
        }
    }
}

fn default_films_dir() -> String {
    "./films".into()
}
fn default_templates_dir() -> String {
    "./templates".into()
}
fn default_metadata_dir() -> String {
    "./metadata".into()
}
fn default_sheet_range() -> String {
    "TODO!A:ZZ".into()
}
fn default_sheets_base() -> String {
    "https://sheets.googleapis.com/v4/".into()
}
fn default_drive_base() -> String {
    "https://www.googleapis.com/drive/v3/".into()
}
fn default_post_type() -> String {
    "project".into()
}
fn default_category_taxonomy() -> String {
    "project_category".into()
}

impl App {
    /// `data_dir` with a leading `~/` expanded.
    pub fn resolved_data_dir(&self) -> String {
        match (self.data_dir.strip_prefix("~/"), std::env::var("HOME")) {
            (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
            _ => self.data_dir.clone(),
        }
    }

    /// Database URL from config, defaulting to a file under `data_dir`.
    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| format!("sqlite://{}/reel-sync.db", self.resolved_data_dir()))
    }

    pub fn style_path(&self, year: &str) -> PathBuf {
        Path::new(&self.templates_dir).join(format!("{}.json", year))
    }

    pub fn festival_path(&self, year: &str) -> PathBuf {
        Path::new(&self.metadata_dir).join(format!("{}.json", year))
    }
}

impl Config {
    /// Ensure required directories exist.
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        fs::create_dir_all(self.app.resolved_data_dir())?;
        fs::create_dir_all(&self.app.films_dir)
    }

    /// Credentials may come from the environment instead of the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.app.database_url = Some(url);
        }
        if let Ok(token) = std::env::var("GOOGLE_ACCESS_TOKEN") {
            self.google.access_token = token;
        }
        if let Ok(password) = std::env::var("WORDPRESS_APPLICATION_PASSWORD") {
            self.wordpress.application_password = password;
        }
    }
}

/// Load configuration from a YAML file, apply environment overrides and
/// validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let mut cfg: Config = serde_yaml::from_str(&content)?;
    cfg.apply_env_overrides();
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if cfg.app.films_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.films_dir must be non-empty"));
    }

    if cfg.google.access_token.trim().is_empty() {
        return Err(ConfigError::Invalid("google.access_token must be non-empty"));
    }
    if cfg.google.sheet_id.trim().is_empty() {
        return Err(ConfigError::Invalid("google.sheet_id must be non-empty"));
    }
    if cfg.google.sheet_range.trim().is_empty() {
        return Err(ConfigError::Invalid("google.sheet_range must be non-empty"));
    }

    if !cfg.wordpress.base_url.starts_with("http") {
        return Err(ConfigError::Invalid("wordpress.base_url must be an http(s) URL"));
    }
    if cfg.wordpress.username.trim().is_empty() {
        return Err(ConfigError::Invalid("wordpress.username must be non-empty"));
    }
    if cfg.wordpress.application_password.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "wordpress.application_password must be non-empty",
        ));
    }

    if cfg.image.max_width == 0 || cfg.image.max_height == 0 {
        return Err(ConfigError::Invalid("image.max_width and image.max_height must be > 0"));
    }
    if cfg.image.quality == 0 || cfg.image.quality > 100 {
        return Err(ConfigError::Invalid("image.quality must be within 1..=100"));
    }

    Ok(())
}

/// Example YAML, also written out by `create-config`.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"
  films_dir: "./films"
  templates_dir: "./templates"
  metadata_dir: "./metadata"
  # database_url: "sqlite://./data/reel-sync.db"
  # log_file: "./data/reel-sync.log"

google:
  access_token: "YOUR_GOOGLE_OAUTH_ACCESS_TOKEN"
  sheet_id: "YOUR_SHEET_ID"
  sheet_range: "TODO!A:ZZ"

wordpress:
  base_url: "https://example.com"
  username: "editor"
  application_password: "xxxx xxxx xxxx xxxx"

image:
  max_width: 1920
  max_height: 1080
  quality: 85
"#
}
