use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use reel_sync::config;
use reel_sync::drive::DriveClient;
use reel_sync::logging;
use reel_sync::optimize::JpegResizer;
use reel_sync::pipeline::Pipeline;
use reel_sync::sheet::{rows_to_entities, select_entities, SheetsClient, TabularSource};
use reel_sync::store;
use reel_sync::summary::FestivalMetadata;
use reel_sync::template::StyleConfig;
use reel_sync::wordpress::WordPressClient;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Sync festival films from the sheet and Drive into WordPress posts"
)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Only process rows of this edition year
    #[arg(long)]
    year: Option<String>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,

    /// Only process the row with this title (case-insensitive)
    #[arg(long)]
    only: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    let _log_guard = logging::init(args.debug, cfg.app.log_file.as_deref().map(Path::new))?;
    cfg.ensure_dirs()?;

    let pool = store::init_pool(&cfg.app.database_url()).await?;
    store::run_migrations(&pool).await?;

    let http = reqwest::Client::builder()
        .user_agent(concat!("reel-sync/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build http client")?;
    let sheets = SheetsClient::new(
        http.clone(),
        &cfg.google.sheets_base_url,
        cfg.google.access_token.clone(),
    )?;
    let drive = DriveClient::new(
        http.clone(),
        &cfg.google.drive_base_url,
        cfg.google.access_token.clone(),
    )?;
    let backend = WordPressClient::from_config(http, &cfg.wordpress)?;
    let optimizer = JpegResizer::from_config(&cfg.image);

    let rows = sheets
        .read_range(&cfg.google.sheet_id, &cfg.google.sheet_range)
        .await
        .context("failed to read sheet")?;
    let mut entities = select_entities(rows_to_entities(&rows), args.year.as_deref());
    if let Some(only) = args.only.as_deref() {
        entities.retain(|e| e.title().eq_ignore_ascii_case(only.trim()));
    }
    info!(rows = rows.len().saturating_sub(1), selected = entities.len(), "entities loaded");

    let year = args.year.clone().unwrap_or_default();
    let style = StyleConfig::load(&cfg.app.style_path(&year)).unwrap_or_else(|err| {
        warn!(error = %err, "invalid style file; using defaults");
        StyleConfig::default()
    });
    let festival = FestivalMetadata::load(&cfg.app.festival_path(&year)).unwrap_or_else(|err| {
        warn!(error = %err, "invalid festival metadata; ignoring");
        None
    });

    let pipeline = Pipeline {
        pool: &pool,
        drive: &drive,
        backend: &backend,
        optimizer: &optimizer,
        films_dir: PathBuf::from(&cfg.app.films_dir),
        year,
        style,
        festival,
    };
    let report = pipeline.run(&entities).await;

    println!(
        "processed: {}, succeeded: {}, failed: {}",
        report.processed, report.succeeded, report.failed
    );
    for (entity_id, reason) in &report.failures {
        println!("  {}: {}", entity_id, reason);
    }
    Ok(())
}
