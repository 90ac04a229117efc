//! Page-builder document for an entity's post.
//!
//! The document is the concatenation of a fixed list of components. Each
//! component owns the inputs it renders and nothing else, so any of them can
//! be rendered and tested alone.

pub mod components;
pub mod directors;
pub mod document;
pub mod style;

pub use components::{
    ContentNotes, Credits, DirectorBios, FooterBlock, Gallery, HeaderBlock, MainContent,
    NavigationBlock,
};
pub use directors::{find_director_image, parse_directors, Director};
pub use document::{
    build_template_data, standard_composer, write_document, DocumentFile, ImageData, TemplateData,
};
pub use style::StyleConfig;

pub const BUILDER_VERSION: &str = "4.27.4";

pub mod palette {
    pub const PRIMARY: &str = "#24A68E";
    pub const SECONDARY: &str = "#E6F543";
    pub const DARK: &str = "#31045C";
    pub const YELLOW: &str = "#FFFC4F";
    pub const CORAL: &str = "#FF9582";
    pub const LIGHT_GREEN: &str = "#91F580";
    pub const WHITE: &str = "#ffffff";
    pub const BODY: &str = "#333333";
    pub const PINK: &str = "#FFDBFF";
}

pub mod links {
    pub const FACEBOOK: &str = "https://www.facebook.com/excentrico.fest/";
    pub const INSTAGRAM: &str = "https://www.instagram.com/excentrico.fest/?hl=es";
    pub const TWITTER: &str = "https://twitter.com/excentricofest";
    pub const EMAIL: &str = "hola@excentricofest.com";
}

/// Escape text placed in element content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&#34;")
        .replace('\'', "&#39;")
}

/// `H:MM:SS` → total minutes and seconds, `MM:SS` kept as is, joined by `´`.
/// Anything else renders as `0´0`.
pub fn format_duration(raw: &str) -> String {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    match parts.as_slice() {
        [h, m, s] => match (h.parse::<u32>(), m.parse::<u32>()) {
            (Ok(h), Ok(m)) => match h.checked_mul(60).and_then(|x| x.checked_add(m)) {
                Some(minutes) => format!("{}´{}", minutes, s),
                None => "0´0".to_string(),
            },
            _ => "0´0".to_string(),
        },
        [m, s] => format!("{}´{}", m, s),
        _ => "0´0".to_string(),
    }
}

pub trait Render {
    fn render(&self) -> String;
}

/// Top-level blocks of a document.
#[derive(Debug, Clone)]
pub enum Component {
    Header(HeaderBlock),
    Navigation(NavigationBlock),
    MainContent(MainContent),
    Footer(FooterBlock),
}

impl Component {
    pub fn name(&self) -> &'static str {
        match self {
            Component::Header(_) => "header",
            Component::Navigation(_) => "navigation",
            Component::MainContent(_) => "main_content",
            Component::Footer(_) => "footer",
        }
    }
}

impl Render for Component {
    fn render(&self) -> String {
        match self {
            Component::Header(c) => c.render(),
            Component::Navigation(c) => c.render(),
            Component::MainContent(c) => c.render(),
            Component::Footer(c) => c.render(),
        }
    }
}

/// Renders components in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    components: Vec<Component>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.components.iter().map(Component::name).collect()
    }

    pub fn compose(&self) -> String {
        self.components.iter().map(Render::render).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formats() {
        assert_eq!(format_duration("1:05:30"), "65´30");
        assert_eq!(format_duration("12:07"), "12´07");
        assert_eq!(format_duration(" 0 : 09 : 00 "), "9´00");
        assert_eq!(format_duration("15"), "0´0");
        assert_eq!(format_duration("x:1:2"), "0´0");
    }

    #[test]
    fn oversized_duration_degrades_instead_of_overflowing() {
        assert_eq!(format_duration("99999999:00:00"), "0´0");
        assert_eq!(format_duration("71582788:16:00"), "0´0");
    }

    #[test]
    fn escape_covers_markup_and_quotes() {
        assert_eq!(escape_html(r#"<b>"A" & 'B'</b>"#), "&lt;b&gt;&#34;A&#34; &amp; &#39;B&#39;&lt;/b&gt;");
    }

    #[test]
    fn composer_renders_in_registration_order() {
        let style = StyleConfig::default();
        let composer = Composer::new()
            .add(Component::Footer(FooterBlock::new("convocatoria 2025", &style.footer)))
            .add(Component::Navigation(NavigationBlock::new(&style.menu)));
        assert_eq!(composer.names(), vec!["footer", "navigation"]);
        let out = composer.compose();
        let footer_at = out.find("convocatoria 2025").unwrap();
        let menu_at = out.find("et_pb_fullwidth_menu").unwrap();
        assert!(footer_at < menu_at);
    }
}
