//! Director names and their portrait lookup.
use crate::wordpress::WpMedia;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*|\s+\+\s+|\s+y\s+|\s*&\s*").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Director {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bio: String,
}

/// Split a director credit on `,`, ` + `, ` y ` and `&`.
pub fn parse_directors(credit: &str) -> Vec<String> {
    SEPARATORS
        .split(credit)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

/// Portrait URL for `name`, or "" when nothing matches.
///
/// The full name is looked up in each medium's title, file name and alt text.
/// Failing that, any word longer than two characters found in a title or file
/// name is accepted.
pub fn find_director_image(name: &str, media: &[WpMedia]) -> String {
    let clean = name.trim().to_lowercase();
    if clean.is_empty() {
        return String::new();
    }

    if let Some(m) = media.iter().find(|m| m.mentions(&clean)) {
        debug!(director = %name, url = %m.source_url, "director image matched");
        return m.source_url.clone();
    }

    let words: Vec<&str> = clean.split_whitespace().collect();
    if words.len() > 1 {
        for m in media {
            let title = m.title.text().to_lowercase();
            let stem = m.file_stem();
            if let Some(word) = words
                .iter()
                .find(|w| w.chars().count() > 2 && (title.contains(**w) || stem.contains(**w)))
            {
                debug!(director = %name, word = %word, url = %m.source_url, "director image matched by word");
                return m.source_url.clone();
            }
        }
    }

    debug!(director = %name, "no director image");
    String::new()
}

/// Director blocks for a film. Multi-director credits are split; otherwise
/// the credit is one name. Every director shares the film's bio.
pub fn directors_for(credit: &str, multiple: bool, bio: &str, media: &[WpMedia]) -> Vec<Director> {
    if credit.trim().is_empty() {
        return Vec::new();
    }
    let names = if multiple {
        parse_directors(credit)
    } else {
        vec![credit.trim().to_string()]
    };
    names
        .into_iter()
        .map(|name| Director {
            image_url: find_director_image(&name, media),
            bio: bio.to_string(),
            name,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordpress::RenderedField;

    fn media(id: i64, title: &str, url: &str, alt: &str) -> WpMedia {
        WpMedia {
            id,
            title: RenderedField::Plain(title.into()),
            source_url: url.into(),
            alt_text: alt.into(),
        }
    }

    #[test]
    fn splits_on_every_separator() {
        assert_eq!(parse_directors("Ana Pérez y Luis Gómez"), vec!["Ana Pérez", "Luis Gómez"]);
        assert_eq!(parse_directors("A, B & C + D"), vec!["A", "B", "C", "D"]);
        assert_eq!(parse_directors("Yolanda Reyes"), vec!["Yolanda Reyes"]);
        assert!(parse_directors("  ").is_empty());
    }

    #[test]
    fn full_name_beats_word_match() {
        let list = vec![
            media(1, "Film - Luis still", "https://x/still_web.jpg", ""),
            media(2, "Film - dir", "https://x/luis-gomez_web.jpg", ""),
            media(3, "Film - Luis Gómez", "https://x/portrait_web.jpg", ""),
        ];
        assert_eq!(find_director_image("Luis Gómez", &list), "https://x/portrait_web.jpg");
    }

    #[test]
    fn word_match_ignores_short_words() {
        let list = vec![media(1, "Film - Al", "https://x/al_web.jpg", "")];
        assert_eq!(find_director_image("Al Mar", &list), "");
        let list = vec![media(1, "Film - perez", "https://x/p_web.jpg", "")];
        assert_eq!(find_director_image("Ana Perez", &list), "https://x/p_web.jpg");
    }

    #[test]
    fn web_suffix_is_not_part_of_the_file_name() {
        let list = vec![media(1, "Film - still", "https://x/still1_web.jpg", "")];
        assert_eq!(find_director_image("Jo Web", &list), "");
        let list = vec![media(1, "Film", "https://x/Jo-Web_web.jpg", "")];
        assert_eq!(find_director_image("Jo Web", &list), "https://x/Jo-Web_web.jpg");
    }

    #[test]
    fn alt_text_counts_for_full_name() {
        let list = vec![media(1, "x", "https://x/y.jpg", "Retrato de Ana Pérez")];
        assert_eq!(find_director_image("Ana Pérez", &list), "https://x/y.jpg");
    }

    #[test]
    fn single_director_credit_is_not_split() {
        let ds = directors_for("Ana Pérez y Luis Gómez", false, "bio", &[]);
        assert_eq!(ds.len(), 1);
        let ds = directors_for("Ana Pérez y Luis Gómez", true, "bio", &[]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds[1].name, "Luis Gómez");
        assert_eq!(ds[1].bio, "bio");
        assert!(directors_for(" ", true, "", &[]).is_empty());
    }
}
