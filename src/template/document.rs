//! Template data, composition and the exported builder file.
use super::components::{
    ContentNotes, Credits, DirectorBios, FooterBlock, Gallery, HeaderBlock, MainContent,
    NavigationBlock,
};
use super::directors::{directors_for, Director};
use super::style::StyleConfig;
use super::{format_duration, palette, Component, Composer, BUILDER_VERSION};
use crate::entity::FilmRecord;
use crate::model::{LedgerEntry, RemoteFile};
use crate::naming::match_key;
use crate::wordpress::{pick_by_keywords, ContentBackend, WpMedia};
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

pub const DOCUMENT_FILE: &str = "divi_template.json";
pub const BACKGROUND_KEYWORDS: &[&str] = &["background", "header", "fondo", "bg"];
const STILLS_FOLDER: &str = "stills";

/// Everything the composer needs for one entity, resolved up front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateData {
    pub title: String,
    pub country: String,
    pub year: String,
    pub duration: String,
    pub background_image: String,
    pub directors: Vec<Director>,
    pub synopsis: String,
    pub content_notes: String,
    pub production: String,
    pub script: String,
    pub photography: String,
    pub art_design: String,
    pub sound_music: String,
    pub editing: String,
    pub cast: String,
    pub other_credits: String,
    pub gallery_ids: Vec<i64>,
    pub gallery_urls: Vec<String>,
}

impl TemplateData {
    pub fn subhead(&self) -> String {
        format!("{} · {} · {}", self.country, self.year, self.duration)
    }

    pub fn gallery_media_ids(&self) -> String {
        self.gallery_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn credits(&self) -> Credits {
        Credits {
            directors: self.directors.iter().map(|d| d.name.clone()).collect(),
            production: self.production.clone(),
            script: self.script.clone(),
            photography: self.photography.clone(),
            art_design: self.art_design.clone(),
            sound_music: self.sound_music.clone(),
            editing: self.editing.clone(),
            cast: self.cast.clone(),
            other_credits: self.other_credits.clone(),
        }
    }
}

/// Media whose uploaded file came from the Drive `Stills` folder, in input
/// order. Files are matched through the ledger's local path and the snapshot
/// file name, both reduced with [`match_key`].
pub fn stills_media<'a>(
    media: &'a [WpMedia],
    ledger: &[LedgerEntry],
    snapshot: &[RemoteFile],
) -> Vec<&'a WpMedia> {
    let paths: HashMap<i64, &str> = ledger.iter().map(|e| (e.id, e.file_path.as_str())).collect();
    let folders: HashMap<String, String> = snapshot
        .iter()
        .map(|f| (match_key(&f.name), f.folder_name.to_lowercase()))
        .collect();

    media
        .iter()
        .filter(|m| {
            paths
                .get(&m.id)
                .and_then(|p| Path::new(p).file_name())
                .map(|name| match_key(&name.to_string_lossy()))
                .and_then(|key| folders.get(&key))
                .is_some_and(|folder| folder == STILLS_FOLDER)
        })
        .collect()
}

pub fn build_template_data(
    film: &FilmRecord,
    media: &[WpMedia],
    ledger: &[LedgerEntry],
    snapshot: &[RemoteFile],
) -> TemplateData {
    let stills = stills_media(media, ledger, snapshot);
    TemplateData {
        title: film.title.clone(),
        country: film.country.clone(),
        year: film.year.clone(),
        duration: if film.duration.is_empty() {
            String::new()
        } else {
            format_duration(&film.duration)
        },
        background_image: pick_by_keywords(media, BACKGROUND_KEYWORDS)
            .map(|m| m.source_url.clone())
            .unwrap_or_default(),
        directors: directors_for(
            &film.director,
            film.has_multiple_directors(),
            &film.director_bio,
            media,
        ),
        synopsis: film.synopsis.clone(),
        content_notes: film.content_notes.clone(),
        production: film.production.clone(),
        script: film.script.clone(),
        photography: film.photography.clone(),
        art_design: film.art_design.clone(),
        sound_music: film.sound_music.clone(),
        editing: film.editing.clone(),
        cast: film.cast.clone(),
        other_credits: film.other_credits.clone(),
        gallery_ids: stills.iter().map(|m| m.id).collect(),
        gallery_urls: stills.iter().map(|m| m.source_url.clone()).collect(),
    }
}

/// Header, navigation, main content and footer, in that order.
pub fn standard_composer(data: &TemplateData, year: &str, style: &StyleConfig) -> Composer {
    let button_text = if year.is_empty() {
        "convocatoria".to_string()
    } else {
        format!("convocatoria {}", year)
    };

    Composer::new()
        .add(Component::Header(HeaderBlock {
            title: data.title.clone(),
            subhead: data.subhead(),
            background_image: data.background_image.clone(),
            style: style.header.clone(),
        }))
        .add(Component::Navigation(NavigationBlock::new(&style.menu)))
        .add(Component::MainContent(MainContent {
            section: style.contenido.clone(),
            text: style.texto.clone(),
            credits: data.credits(),
            synopsis: data.synopsis.clone(),
            notes: ContentNotes {
                notes: data.content_notes.clone(),
                style: style.ndc.text.clone(),
            },
            directors: DirectorBios {
                directors: data.directors.clone(),
                text: style.texto.clone(),
            },
            gallery: Gallery {
                media_ids: data.gallery_media_ids(),
            },
        }))
        .add(Component::Footer(FooterBlock::new(&button_text, &style.footer)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Base64 of the image bytes; empty when they could not be fetched.
    pub encoded: String,
    pub url: String,
    pub id: i64,
}

/// The exported builder layout file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFile {
    pub context: String,
    pub data: BTreeMap<String, String>,
    pub presets: Value,
    pub global_colors: Vec<Value>,
    pub images: BTreeMap<String, ImageData>,
    pub thumbnails: Vec<Value>,
}

impl DocumentFile {
    pub fn new(post_id: i64, document: String, images: BTreeMap<String, ImageData>) -> Self {
        let mut data = BTreeMap::new();
        data.insert(post_id.to_string(), document);
        Self {
            context: "et_builder".to_string(),
            data,
            presets: row_presets(),
            global_colors: global_colors(),
            images,
            thumbnails: Vec::new(),
        }
    }
}

fn row_presets() -> Value {
    json!({
        "et_pb_row": {
            "presets": {
                "_initial": {
                    "name": "Fila Preset 1",
                    "version": BUILDER_VERSION,
                    "settings": {
                        "use_custom_gutter": "off",
                        "gutter_width": "1",
                        "width": "90%",
                        "module_alignment": "center"
                    }
                }
            },
            "default": "_initial"
        }
    })
}

fn global_colors() -> Vec<Value> {
    [
        ("gcid-primary-color", palette::DARK),
        ("gcid-secondary-color", palette::PRIMARY),
        ("gcid-heading-color", palette::SECONDARY),
        ("gcid-body-color", palette::BODY),
    ]
    .iter()
    .map(|(id, color)| json!([id, {"color": color, "active": "yes"}]))
    .collect()
}

/// Embed every medium keyed by its URL. A failed download keeps the entry
/// with an empty encoding.
pub async fn collect_images(
    backend: &dyn ContentBackend,
    media: &[WpMedia],
) -> BTreeMap<String, ImageData> {
    let mut images = BTreeMap::new();
    for m in media {
        let encoded = match backend.fetch_bytes(&m.source_url).await {
            Ok(bytes) => STANDARD.encode(bytes),
            Err(err) => {
                warn!(media_id = m.id, url = %m.source_url, error = %err, "failed to fetch image bytes");
                String::new()
            }
        };
        images.insert(
            m.source_url.clone(),
            ImageData {
                encoded,
                url: m.source_url.clone(),
                id: m.id,
            },
        );
    }
    images
}

/// Compose the document for `post_id` and write it to
/// `{entity_dir}/divi_template.json`.
#[instrument(skip_all, fields(post_id = post_id))]
pub async fn write_document(
    backend: &dyn ContentBackend,
    entity_dir: &Path,
    post_id: i64,
    data: &TemplateData,
    year: &str,
    style: &StyleConfig,
    media: &[WpMedia],
) -> Result<PathBuf> {
    let composer = standard_composer(data, year, style);
    debug!(components = ?composer.names(), "composing document");
    let document = composer.compose();

    let images = collect_images(backend, media).await;
    let file = DocumentFile::new(post_id, document, images);
    let body = serde_json::to_vec_pretty(&file).context("failed to serialize document")?;

    let path = entity_dir.join(DOCUMENT_FILE);
    tokio::fs::write(&path, body)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), images = file.images.len(), "document written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Render;
    use crate::wordpress::RenderedField;

    fn media(id: i64, title: &str, url: &str) -> WpMedia {
        WpMedia {
            id,
            title: RenderedField::Plain(title.into()),
            source_url: url.into(),
            alt_text: String::new(),
        }
    }

    fn ledger(id: i64, path: &str) -> LedgerEntry {
        LedgerEntry {
            id,
            title: String::new(),
            source_url: String::new(),
            alt_text: String::new(),
            file_path: path.into(),
            post_id: 0,
        }
    }

    fn drive(name: &str, folder: &str) -> RemoteFile {
        RemoteFile {
            id: name.into(),
            name: name.into(),
            mime_type: "image/jpeg".into(),
            size: String::new(),
            created_time: String::new(),
            modified_time: String::new(),
            folder_path: folder.into(),
            folder_name: folder.into(),
        }
    }

    #[test]
    fn gallery_only_keeps_stills() {
        let list = vec![
            media(1, "F - still1", "https://x/still1_web.jpg"),
            media(2, "F - poster", "https://x/poster_web.jpg"),
            media(3, "F - unknown", "https://x/u_web.jpg"),
        ];
        let led = vec![
            ledger(1, "/w/Stills/still1_web.jpg"),
            ledger(2, "/w/Featured Image/poster_web.jpg"),
        ];
        let snap = vec![drive("Still1.PNG", "Stills"), drive("poster.jpg", "Featured Image")];
        let ids: Vec<i64> = stills_media(&list, &led, &snap).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn template_data_from_film() {
        let film = FilmRecord {
            title: "Luz".into(),
            country: "Chile".into(),
            year: "2024".into(),
            duration: "0:12:07".into(),
            director: "Ana Pérez y Luis Gómez".into(),
            multi_director: "SI".into(),
            ..Default::default()
        };
        let list = vec![
            media(1, "Luz - still", "https://x/still_web.jpg"),
            media(2, "Luz - fondo", "https://x/fondo_web.jpg"),
        ];
        let data = build_template_data(&film, &list, &[], &[]);
        assert_eq!(data.subhead(), "Chile · 2024 · 12´07");
        assert_eq!(data.background_image, "https://x/fondo_web.jpg");
        assert_eq!(data.directors.len(), 2);
        assert!(data.gallery_ids.is_empty());
    }

    #[test]
    fn two_directors_render_two_blocks() {
        let film = FilmRecord {
            title: "Luz".into(),
            director: "Ana Pérez y Luis Gómez".into(),
            multi_director: "SI".into(),
            director_bio: "Bio".into(),
            ..Default::default()
        };
        let data = build_template_data(&film, &[], &[], &[]);
        let bios = DirectorBios {
            directors: data.directors.clone(),
            text: Default::default(),
        };
        let out = bios.render();
        assert_eq!(out.matches("[et_pb_row ").count(), 2);
        assert!(out.contains("<h4><span>Ana Pérez</span></h4>"));
        assert!(out.contains("<h4><span>Luis Gómez</span></h4>"));
    }

    #[test]
    fn standard_order_and_button_text() {
        let data = TemplateData {
            title: "Luz".into(),
            ..Default::default()
        };
        let composer = standard_composer(&data, "2025", &StyleConfig::default());
        assert_eq!(composer.names(), vec!["header", "navigation", "main_content", "footer"]);
        assert!(composer.compose().contains(r#"button_text="convocatoria 2025""#));
        let bare = standard_composer(&data, "", &StyleConfig::default()).compose();
        assert!(bare.contains(r#"button_text="convocatoria""#));
    }

    #[test]
    fn document_file_shape() {
        let file = DocumentFile::new(42, "[doc]".into(), BTreeMap::new());
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["context"], "et_builder");
        assert_eq!(value["data"]["42"], "[doc]");
        assert_eq!(value["presets"]["et_pb_row"]["default"], "_initial");
        assert_eq!(value["global_colors"][0][0], "gcid-primary-color");
        assert_eq!(value["global_colors"][1][1]["color"], "#24A68E");
        assert_eq!(value["thumbnails"], json!([]));
    }
}
