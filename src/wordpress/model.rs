//! WordPress REST resource shapes.
use crate::naming::url_stem;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// WordPress returns titles either as a bare string or as `{raw, rendered}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderedField {
    Plain(String),
    Rendered {
        #[serde(default)]
        raw: Option<String>,
        #[serde(default)]
        rendered: Option<String>,
    },
}

impl Default for RenderedField {
    fn default() -> Self {
        RenderedField::Plain(String::new())
    }
}

impl RenderedField {
    pub fn text(&self) -> &str {
        match self {
            RenderedField::Plain(s) => s,
            RenderedField::Rendered { raw, rendered } => raw
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(rendered.as_deref())
                .unwrap_or(""),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WpPost {
    pub id: i64,
    #[serde(default)]
    pub title: RenderedField,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub modified: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WpMedia {
    pub id: i64,
    #[serde(default)]
    pub title: RenderedField,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub alt_text: String,
}

impl WpMedia {
    /// Lowercased file name from `source_url`, web suffix and extension
    /// removed.
    pub fn file_stem(&self) -> String {
        url_stem(&self.source_url)
    }

    /// Case-insensitive substring test over title, file name and alt text,
    /// in that order.
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.text().to_lowercase().contains(&needle)
            || self.file_stem().contains(&needle)
            || self.alt_text.to_lowercase().contains(&needle)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WpCategory {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub parent: i64,
}

/// Body sent on post create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostPayload {
    pub title: String,
    pub slug: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project_category: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_media: Option<i64>,
    pub meta: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_field_accepts_both_shapes() {
        let plain: RenderedField = serde_json::from_str(r#""Poster""#).unwrap();
        assert_eq!(plain.text(), "Poster");
        let obj: RenderedField =
            serde_json::from_str(r#"{"rendered":"Poster &amp; co"}"#).unwrap();
        assert_eq!(obj.text(), "Poster &amp; co");
        let raw: RenderedField =
            serde_json::from_str(r#"{"raw":"Poster & co","rendered":"x"}"#).unwrap();
        assert_eq!(raw.text(), "Poster & co");
    }

    #[test]
    fn media_tolerates_missing_fields() {
        let media: WpMedia = serde_json::from_str(r#"{"id": 9}"#).unwrap();
        assert_eq!(media.id, 9);
        assert_eq!(media.title.text(), "");
    }

    #[test]
    fn media_mentions_checks_title_filename_and_alt() {
        let media = WpMedia {
            id: 1,
            title: RenderedField::Plain("Luz - Still 2".into()),
            source_url: "https://cdn/uploads/Cover-Art_web.jpg".into(),
            alt_text: "Image from Luz".into(),
        };
        assert_eq!(media.file_stem(), "cover-art");
        assert!(media.mentions("STILL"));
        assert!(media.mentions("cover"));
        assert!(media.mentions("image from"));
        assert!(!media.mentions("poster"));
    }

    #[test]
    fn payload_omits_empty_optionals() {
        let payload = PostPayload {
            title: "T".into(),
            slug: "t".into(),
            status: "draft".into(),
            kind: "post".into(),
            project_category: vec![],
            featured_media: None,
            meta: Map::new(),
        };
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["type"], "post");
        assert!(v.get("project_category").is_none());
        assert!(v.get("featured_media").is_none());
    }
}
