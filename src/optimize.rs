//! Web-ready JPEG variants of downloaded images.
use crate::config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

#[async_trait]
pub trait ImageOptimizer: Send + Sync {
    /// Write a web-ready version of `src` to `dest`.
    async fn optimize(&self, src: &Path, dest: &Path) -> Result<()>;
}

/// Fits images inside a bounding box and re-encodes them as JPEG.
#[derive(Debug, Clone, Copy)]
pub struct JpegResizer {
    max_width: u32,
    max_height: u32,
    quality: u8,
}

impl JpegResizer {
    pub fn new(max_width: u32, max_height: u32, quality: u8) -> Self {
        Self {
            max_width,
            max_height,
            quality,
        }
    }

    pub fn from_config(cfg: &config::Image) -> Self {
        Self::new(cfg.max_width, cfg.max_height, cfg.quality)
    }

    /// Shrink to fit; smaller images are left at their size.
    pub fn fit(&self, img: DynamicImage) -> DynamicImage {
        if img.width() <= self.max_width && img.height() <= self.max_height {
            return img;
        }
        img.resize(self.max_width, self.max_height, FilterType::Lanczos3)
    }

    fn optimize_blocking(&self, src: &Path, dest: &Path) -> Result<()> {
        let img = image::open(src).with_context(|| format!("failed to decode {}", src.display()))?;
        let fitted = self.fit(img);
        let rgb = DynamicImage::ImageRgb8(fitted.to_rgb8());
        let file = File::create(dest).with_context(|| format!("failed to create {}", dest.display()))?;
        let mut writer = BufWriter::new(file);
        let encoder = JpegEncoder::new_with_quality(&mut writer, self.quality);
        rgb.write_with_encoder(encoder)
            .with_context(|| format!("failed to encode {}", dest.display()))?;
        debug!(src = %src.display(), dest = %dest.display(), width = rgb.width(), height = rgb.height(), "optimised image");
        Ok(())
    }
}

#[async_trait]
impl ImageOptimizer for JpegResizer {
    async fn optimize(&self, src: &Path, dest: &Path) -> Result<()> {
        let this = *self;
        let (src, dest): (PathBuf, PathBuf) = (src.to_path_buf(), dest.to_path_buf());
        tokio::task::spawn_blocking(move || this.optimize_blocking(&src, &dest))
            .await
            .context("image optimisation task panicked")?
    }
}
