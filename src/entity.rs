//! Spreadsheet rows as units of work.
use crate::naming::{sanitize_entity_id, FALLBACK_ENTITY_ID};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod columns {
    pub const TITLE: &str = "TÍTULO ORIGINAL";
    pub const TITLE_FALLBACK: &str = "Name";
    pub const DIRECTOR: &str = "DIRECCIÓN";
    pub const COUNTRY: &str = "PAIS";
    pub const YEAR: &str = "AÑO";
    pub const DURATION: &str = "DURAC.";
    pub const EDITION: &str = "EDICIÓN";
    pub const SECTION: &str = "SECCIÓN";
    pub const KIND: &str = "TIPO";
    pub const LANGUAGES: &str = "Idioma(s) / Language(s)";
    pub const SYNOPSIS: &str = "Sinopsis extendida (máximo 70 palabras)";
    pub const SYNOPSIS_EN: &str = "Extended synopsis (english)";
    pub const CONTENT_NOTES: &str = "Notas de contenido / Content notes (*)";
    pub const PRODUCTION: &str = "Producción / Producer(s)";
    pub const SCRIPT: &str = "Guión";
    pub const PHOTOGRAPHY: &str = "Cámara - Foto / Camera - Photography";
    pub const ART_DESIGN: &str = "Arte - Diseño / Art/Design";
    pub const SOUND_MUSIC: &str = "Sonido - Música / Sound - Music";
    pub const EDITING: &str = "Edición / Editor(s)";
    pub const CAST: &str = "Intérpretes (especificar pronombres para subtítulos)/ Cast (please specify pronouns for subtitles)";
    pub const OTHER_CREDITS: &str = "Otros créditos / Other credits";
    pub const DIRECTOR_BIO: &str =
        "Bio Realizadorxs / Filmaker's Bio (min 150 - max 1500 caracteres)";
    pub const LINKS: &str = "ENLACES";
    pub const MULTI_DIRECTOR: &str = "Multi Dir";

    /// Columns mapped onto [`super::FilmRecord`] fields.
    pub const KNOWN: &[&str] = &[
        TITLE, TITLE_FALLBACK, DIRECTOR, COUNTRY, YEAR, DURATION, EDITION, SECTION, KIND,
        LANGUAGES, SYNOPSIS, SYNOPSIS_EN, CONTENT_NOTES, PRODUCTION, SCRIPT, PHOTOGRAPHY,
        ART_DESIGN, SOUND_MUSIC, EDITING, CAST, OTHER_CREDITS, DIRECTOR_BIO, LINKS,
        MULTI_DIRECTOR,
    ];
}

/// One spreadsheet row. Every header is present; absent cells are "".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub fields: BTreeMap<String, String>,
}

impl Entity {
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn has(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Display title: the title column, then the generic name column.
    pub fn title(&self) -> String {
        [columns::TITLE, columns::TITLE_FALLBACK]
            .iter()
            .map(|c| self.get(c).trim())
            .find(|v| !v.is_empty())
            .unwrap_or(FALLBACK_ENTITY_ID)
            .to_string()
    }

    /// Stable, filesystem-safe identity derived from the title.
    pub fn id(&self) -> String {
        sanitize_entity_id(&self.title())
    }

    /// `true` when the edition column names the given festival year.
    pub fn in_edition(&self, year: &str) -> bool {
        if !self.has(columns::EDITION) {
            return false;
        }
        let expected = format!("Excéntrico {}", year);
        self.get(columns::EDITION).trim().to_lowercase() == expected.to_lowercase()
    }

    pub fn film(&self) -> FilmRecord {
        FilmRecord::from_entity(self)
    }
}

/// Typed view of the columns the pipeline reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmRecord {
    pub title: String,
    pub director: String,
    pub country: String,
    pub year: String,
    pub duration: String,
    pub edition: String,
    pub section: String,
    pub kind: String,
    pub languages: String,
    pub synopsis: String,
    pub synopsis_en: String,
    pub content_notes: String,
    pub production: String,
    pub script: String,
    pub photography: String,
    pub art_design: String,
    pub sound_music: String,
    pub editing: String,
    pub cast: String,
    pub other_credits: String,
    pub director_bio: String,
    pub links: String,
    pub multi_director: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_fields: BTreeMap<String, String>,
}

impl FilmRecord {
    pub fn from_entity(entity: &Entity) -> Self {
        let get = |c: &str| entity.get(c).trim().to_string();
        let additional_fields = entity
            .fields
            .iter()
            .filter(|(k, v)| !columns::KNOWN.contains(&k.as_str()) && !v.trim().is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self {
            title: entity.title(),
            director: get(columns::DIRECTOR),
            country: get(columns::COUNTRY),
            year: get(columns::YEAR),
            duration: get(columns::DURATION),
            edition: get(columns::EDITION),
            section: get(columns::SECTION),
            kind: get(columns::KIND),
            languages: get(columns::LANGUAGES),
            synopsis: get(columns::SYNOPSIS),
            synopsis_en: get(columns::SYNOPSIS_EN),
            content_notes: get(columns::CONTENT_NOTES),
            production: get(columns::PRODUCTION),
            script: get(columns::SCRIPT),
            photography: get(columns::PHOTOGRAPHY),
            art_design: get(columns::ART_DESIGN),
            sound_music: get(columns::SOUND_MUSIC),
            editing: get(columns::EDITING),
            cast: get(columns::CAST),
            other_credits: get(columns::OTHER_CREDITS),
            director_bio: get(columns::DIRECTOR_BIO),
            links: get(columns::LINKS),
            multi_director: get(columns::MULTI_DIRECTOR),
            additional_fields,
        }
    }

    pub fn has_multiple_directors(&self) -> bool {
        self.multi_director.trim().eq_ignore_ascii_case("SI")
    }

    /// Section column split on commas, blanks dropped.
    pub fn section_names(&self) -> Vec<String> {
        self.section
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(pairs: &[(&str, &str)]) -> Entity {
        Entity::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn title_falls_back_to_name_then_placeholder() {
        assert_eq!(entity(&[(columns::TITLE, "Luz")]).title(), "Luz");
        assert_eq!(
            entity(&[(columns::TITLE, " "), (columns::TITLE_FALLBACK, "Alt")]).title(),
            "Alt"
        );
        assert_eq!(entity(&[]).title(), "unnamed_film");
        assert_eq!(entity(&[(columns::TITLE, "A/B")]).id(), "A_B");
    }

    #[test]
    fn untitled_row_slug_leaves_out_placeholder() {
        let film = entity(&[(columns::SECTION, "Drama")]).film();
        assert_eq!(film.title, FALLBACK_ENTITY_ID);
        assert_eq!(crate::naming::post_slug(&film.title, &film.section, "2025"), "drama-2025");
    }

    #[test]
    fn edition_filter_is_case_insensitive() {
        let e = entity(&[(columns::EDITION, "EXCÉNTRICO 2025")]);
        assert!(e.in_edition("2025"));
        assert!(!e.in_edition("2024"));
        assert!(!entity(&[]).in_edition("2025"));
    }

    #[test]
    fn film_record_maps_known_and_keeps_extra_columns() {
        let e = entity(&[
            (columns::TITLE, "Luz"),
            (columns::SECTION, "Corto, Animación ,"),
            (columns::MULTI_DIRECTOR, "si"),
            ("Notas internas", "x"),
            ("Vacía", ""),
        ]);
        let film = e.film();
        assert_eq!(film.section_names(), vec!["Corto", "Animación"]);
        assert!(film.has_multiple_directors());
        assert_eq!(film.additional_fields.len(), 1);
        assert_eq!(film.additional_fields["Notas internas"], "x");
    }
}
