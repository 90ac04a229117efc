//! Per-edition style settings, read from `templates/{year}.json`.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub header: HeaderStyle,
    pub menu: MenuStyle,
    pub contenido: SectionStyle,
    pub texto: TextStyle,
    pub ndc: NotesStyle,
    pub footer: FooterStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderStyle {
    pub title_text_color: String,
    pub subhead_text_color: String,
    pub background_enable_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuStyle {
    pub menu_id: String,
    pub active_link_color: String,
    pub menu_text_color: String,
    pub background_color: String,
    pub background_image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionStyle {
    pub background_color: String,
    pub background_color_gradient_stops: String,
    pub background_color_gradient_start: String,
    pub background_color_gradient_end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub header_4_text_color: String,
    pub box_shadow_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesStyle {
    pub text: NotesTextStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesTextStyle {
    pub disabled_on: String,
    pub color: String,
    pub background_color: String,
    pub box_shadow_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterStyle {
    pub section: FooterSectionStyle,
    #[serde(rename = "Button")]
    pub button: FooterButtonStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterSectionStyle {
    pub background_image: String,
    pub background_position: String,
    pub global_module: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterButtonStyle {
    pub box_shadow_color: String,
    pub button_icon_color: String,
    pub button_border_color: String,
    pub button_text_color: String,
}

impl StyleConfig {
    /// Read a style file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read style file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid style file {}", path.display()))
    }
}
