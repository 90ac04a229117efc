//! Shortcode blocks. Each block is a plain value holding what it renders.
use super::directors::Director;
use super::style::{FooterStyle, HeaderStyle, MenuStyle, NotesTextStyle, SectionStyle, TextStyle};
use super::{escape_html, links, palette, Render, BUILDER_VERSION};

const PRESET: &str = r#"_module_preset="default""#;
const COLORS_INFO: &str = r#"global_colors_info="{}""#;
const SHADOW: &str = r#"box_shadow_style="preset3""#;
const CUSTOM_BUTTON: &str = r#"custom_button="on""#;
const BACKGROUND_ON: &str = r#"background_enable_color="on""#;

const FONT_BOLD: &str = "|600|||||||";
const FONT_BOLD_CAPS: &str = "|600||on|||||";
const FONT_EXTRA_BOLD: &str = "|800|||||||";

const PADDING_STANDARD: &str = "3%|3%|3.6%|3%|false|false";
const PADDING_DIRECTOR: &str = "3.3%|3%|3.6%|3%|false|false";
const MARGIN_STANDARD: &str = "6%||||false|false";
const PADDING_NOTES: &str = "1%||1%|2%|false|false";

#[derive(Debug, Clone, Default)]
pub struct HeaderBlock {
    pub title: String,
    pub subhead: String,
    pub background_image: String,
    pub style: HeaderStyle,
}

impl Render for HeaderBlock {
    fn render(&self) -> String {
        let v = BUILDER_VERSION;
        let title = escape_html(&self.title);
        let subhead = escape_html(&self.subhead);
        let title_color = &self.style.title_text_color;
        let subhead_color = &self.style.subhead_text_color;
        let background = &self.background_image;
        let (primary, secondary) = (palette::PRIMARY, palette::SECONDARY);
        format!(
            r#"[et_pb_section fb_built="1" fullwidth="on" _builder_version="{v}" {COLORS_INFO}][et_pb_fullwidth_header title="{title}" subhead="{subhead}" _builder_version="{v}" title_font="{FONT_BOLD_CAPS}" title_text_color="{title_color}" subhead_text_color="{subhead_color}" background_enable_color="off" use_background_color_gradient="on" background_color_gradient_stops="{primary} 0%|#82d0d9 50%|{secondary} 100%" background_image="{background}" background_blend="multiply" width="99.9%" custom_padding="20%||2%||false|false" custom_padding_last_edited="on|desktop" {COLORS_INFO}][/et_pb_fullwidth_header][/et_pb_section]"#
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct NavigationBlock {
    pub style: MenuStyle,
}

impl NavigationBlock {
    pub fn new(style: &MenuStyle) -> Self {
        Self {
            style: style.clone(),
        }
    }
}

impl Render for NavigationBlock {
    fn render(&self) -> String {
        let v = BUILDER_VERSION;
        let s = &self.style;
        let (menu_id, active, text, bg, bg_image) = (
            &s.menu_id,
            &s.active_link_color,
            &s.menu_text_color,
            &s.background_color,
            &s.background_image,
        );
        let (secondary, hover) = (palette::SECONDARY, palette::LIGHT_GREEN);
        format!(
            r##"[et_pb_section fb_built="1" fullwidth="on" _builder_version="{v}" {PRESET} {COLORS_INFO}][et_pb_fullwidth_menu menu_id="{menu_id}" active_link_color="{active}" dropdown_menu_text_color="#ffcccc" mobile_menu_text_color="#ffcccc" menu_icon_color="#ffcccc" _builder_version="{v}" menu_font="Montserrat|700||on|||||" menu_text_color="{text}" menu_font_size="12px" background_color="{bg}" background_image="{bg_image}" background_blend="overlay" text_orientation="right" menu_text_color_tablet="{secondary}" menu_text_color_phone="{secondary}" menu_text_color_last_edited="on|desktop" {COLORS_INFO} menu_text_color__hover_enabled="on|desktop" menu_text_color__hover="{hover}"][/et_pb_fullwidth_menu][/et_pb_section]"##
        )
    }
}

/// Technical sheet lines.
#[derive(Debug, Clone, Default)]
pub struct Credits {
    pub directors: Vec<String>,
    pub production: String,
    pub script: String,
    pub photography: String,
    pub art_design: String,
    pub sound_music: String,
    pub editing: String,
    pub cast: String,
    /// Free-form credits. When present it replaces the labelled lines.
    pub other_credits: String,
}

impl Render for Credits {
    fn render(&self) -> String {
        let mut out = String::new();
        if !self.directors.is_empty() {
            out.push_str(&labelled("Dirección", &self.directors.join(", ")));
        }

        if !self.other_credits.trim().is_empty() {
            let lines: Vec<String> = self
                .other_credits
                .split('.')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(escape_html)
                .collect();
            if !lines.is_empty() {
                out.push_str(&format!("<p>{}</p>", lines.join("<br>")));
            }
            return out;
        }

        let fields = [
            ("Producción", &self.production),
            ("Guión", &self.script),
            ("Cámara - Foto", &self.photography),
            ("Arte - Diseño", &self.art_design),
            ("Sonido - Música", &self.sound_music),
            ("Edición", &self.editing),
            ("Intérpretes (especificar pronombres para subtítulos)", &self.cast),
        ];
        for (label, value) in fields {
            if !value.is_empty() {
                out.push_str(&labelled(label, value));
            }
        }
        out
    }
}

fn labelled(label: &str, value: &str) -> String {
    format!("<p><strong>{}:</strong> {}</p>", label, escape_html(value))
}

/// Content warning box; renders nothing without notes.
#[derive(Debug, Clone, Default)]
pub struct ContentNotes {
    pub notes: String,
    pub style: NotesTextStyle,
}

impl Render for ContentNotes {
    fn render(&self) -> String {
        if self.notes.is_empty() {
            return String::new();
        }
        let v = BUILDER_VERSION;
        let s = &self.style;
        let (disabled_on, color, bg, shadow) =
            (&s.disabled_on, &s.color, &s.background_color, &s.box_shadow_color);
        let notes = escape_html(&self.notes);
        format!(
            r#"[et_pb_text disabled_on="{disabled_on}" _builder_version="{v}" {PRESET} text_font="{FONT_BOLD}" text_text_color="{color}" background_color="{bg}" custom_margin="{MARGIN_STANDARD}" custom_padding="{PADDING_NOTES}" {SHADOW} box_shadow_color="{shadow}" locked="off" {COLORS_INFO}]<p><strong>NdC: <span data-sheets-root="1">{notes}</span><br /></strong></p>[/et_pb_text]"#
        )
    }
}

/// One image-and-bio row per director.
#[derive(Debug, Clone, Default)]
pub struct DirectorBios {
    pub directors: Vec<Director>,
    pub text: TextStyle,
}

impl Render for DirectorBios {
    fn render(&self) -> String {
        let v = BUILDER_VERSION;
        let heading_color = &self.text.header_4_text_color;
        let shadow = &self.text.box_shadow_color;
        let (coral, white) = (palette::CORAL, palette::WHITE);
        self.directors
            .iter()
            .map(|d| {
                let name = escape_html(&d.name);
                let bio = escape_html(&d.bio);
                let image = &d.image_url;
                format!(
                    r#"[et_pb_row column_structure="1_2,1_2" _builder_version="{v}" {PRESET} {COLORS_INFO}][et_pb_column type="1_2" _builder_version="{v}" {PRESET} {COLORS_INFO}][et_pb_image src="{image}" alt="{name}" title_text="{name}" _builder_version="{v}" {PRESET} {COLORS_INFO}][/et_pb_image][/et_pb_column][et_pb_column type="1_2" _builder_version="{v}" {PRESET} {COLORS_INFO}][et_pb_text _builder_version="{v}" text_font_size="15px" link_font="{FONT_BOLD}" link_text_color="{coral}" header_4_font="{FONT_BOLD_CAPS}" header_4_text_color="{heading_color}" header_4_font_size="19px" background_color="{white}" max_height_last_edited="on|desktop" custom_padding="{PADDING_DIRECTOR}" {SHADOW} box_shadow_color="{shadow}" {COLORS_INFO}]<h4><span>{name}</span></h4>
<p><span data-sheets-root="1">{bio}</span></p>[/et_pb_text][/et_pb_column][/et_pb_row]"#
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Gallery {
    /// Comma-separated media ids.
    pub media_ids: String,
}

impl Render for Gallery {
    fn render(&self) -> String {
        let v = BUILDER_VERSION;
        let ids = &self.media_ids;
        format!(
            r#"[et_pb_row _builder_version="{v}" {COLORS_INFO}][et_pb_column type="4_4" _builder_version="{v}" {COLORS_INFO}][et_pb_gallery gallery_ids="{ids}" fullwidth="on" _builder_version="{v}" {PRESET} {COLORS_INFO}][/et_pb_gallery][/et_pb_column][/et_pb_row]"#
        )
    }
}

/// Technical sheet and synopsis side by side, then notes, directors and
/// gallery.
#[derive(Debug, Clone, Default)]
pub struct MainContent {
    pub section: SectionStyle,
    pub text: TextStyle,
    pub credits: Credits,
    pub synopsis: String,
    pub notes: ContentNotes,
    pub directors: DirectorBios,
    pub gallery: Gallery,
}

impl Render for MainContent {
    fn render(&self) -> String {
        let v = BUILDER_VERSION;
        let s = &self.section;
        let (bg, stops, start, end) = (
            &s.background_color,
            &s.background_color_gradient_stops,
            &s.background_color_gradient_start,
            &s.background_color_gradient_end,
        );
        let heading_color = &self.text.header_4_text_color;
        let shadow = &self.text.box_shadow_color;
        let white = palette::WHITE;
        let credits = self.credits.render();
        let synopsis = escape_html(&self.synopsis);
        let notes = self.notes.render();
        let directors = self.directors.render();
        let gallery = self.gallery.render();
        format!(
            r#"[et_pb_section fb_built="1" _builder_version="{v}" background_color="{bg}" use_background_color_gradient="on" background_color_gradient_stops="{stops}" background_color_gradient_start="{start}" background_color_gradient_end="{end}"][et_pb_row column_structure="1_2,1_2" _builder_version="{v}" {COLORS_INFO}][et_pb_column type="1_2" _builder_version="{v}" {COLORS_INFO}][et_pb_text _builder_version="{v}" text_font_size="15px" header_4_font="{FONT_BOLD_CAPS}" header_4_text_color="{heading_color}" header_4_font_size="19px" background_color="{white}" max_height_last_edited="on|desktop" custom_padding="{PADDING_STANDARD}" {SHADOW} box_shadow_color="{shadow}" {COLORS_INFO}]<h4><strong>FICHA TÉCNICA:</strong></h4>{credits}[/et_pb_text][/et_pb_column][et_pb_column type="1_2" _builder_version="{v}" {COLORS_INFO}][et_pb_text _builder_version="{v}" text_font_size="15px" header_4_font="{FONT_BOLD_CAPS}" header_4_text_color="{heading_color}" header_4_font_size="19px" background_color="{white}" custom_padding="{PADDING_STANDARD}" {SHADOW} box_shadow_color="{shadow}" {COLORS_INFO}]<h4><strong>SINOPSIS:</strong></h4><p class="p1"><span data-sheets-root="1">{synopsis}</span></p>[/et_pb_text]{notes}[/et_pb_column][/et_pb_row]{directors}{gallery}[/et_pb_section]"#
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct FooterBlock {
    pub button_text: String,
    pub style: FooterStyle,
}

impl FooterBlock {
    pub fn new(button_text: &str, style: &FooterStyle) -> Self {
        Self {
            button_text: button_text.to_string(),
            style: style.clone(),
        }
    }

    fn button_row(&self) -> String {
        let v = BUILDER_VERSION;
        let b = &self.style.button;
        let text = escape_html(&self.button_text);
        let (text_color, border, icon, shadow) = (
            &b.button_text_color,
            &b.button_border_color,
            &b.button_icon_color,
            &b.box_shadow_color,
        );
        let (secondary, yellow, coral) = (palette::SECONDARY, palette::YELLOW, palette::CORAL);
        format!(
            r#"[et_pb_row disabled_on="off|off|off" _builder_version="4.23.2" {PRESET} min_height="164.4px" {COLORS_INFO}][et_pb_column type="4_4" _builder_version="4.17.4" {PRESET} {COLORS_INFO}][et_pb_button button_text="{text}" button_alignment="center" disabled_on="on|on|on" module_class="popmake-6500" _builder_version="{v}" {PRESET} {CUSTOM_BUTTON} button_text_color="{text_color}" button_bg_color="{secondary}" button_border_color="{border}" button_font="{FONT_BOLD}" button_icon_color="{icon}" {SHADOW} box_shadow_color="{shadow}" disabled="on" {COLORS_INFO} button_text_color__hover_enabled="on|desktop" button_text_color__hover="{yellow}" button_bg_color__hover_enabled="on|hover" button_bg_color__hover="{coral}" button_bg_enable_color__hover="on" button_border_color__hover_enabled="on|hover" button_border_color__hover="{coral}"][/et_pb_button][/et_pb_column][/et_pb_row]"#
        )
    }

    fn contact_row(&self) -> String {
        let v = BUILDER_VERSION;
        let (primary, secondary, dark, yellow, pink) = (
            palette::PRIMARY,
            palette::SECONDARY,
            palette::DARK,
            palette::YELLOW,
            palette::PINK,
        );
        let email = links::EMAIL;
        let networks: String = [
            ("facebook", links::FACEBOOK),
            ("instagram", links::INSTAGRAM),
            ("twitter", links::TWITTER),
        ]
        .iter()
        .map(|(network, url)| {
            format!(
                r#"[et_pb_social_media_follow_network social_network="{network}" url="{url}" icon_color="{primary}" _builder_version="{v}" background_color="{secondary}" {BACKGROUND_ON} {COLORS_INFO}]{network}[/et_pb_social_media_follow_network]"#
            )
        })
        .collect();
        format!(
            r#"[et_pb_row column_structure="1_3,1_3,1_3" _builder_version="{v}" {COLORS_INFO}][et_pb_column type="1_3" _builder_version="{v}" {COLORS_INFO}][et_pb_social_media_follow icon_color="{primary}" icon_color_tablet="{pink}" icon_color_phone="{pink}" icon_color_last_edited="on|tablet" _builder_version="{v}" background_color="RGBA(255,255,255,0)" {CUSTOM_BUTTON} button_text_color="{primary}" button_bg_color="{secondary}" button_border_color="{secondary}" text_orientation="center" custom_margin="||||false|false" {COLORS_INFO}]{networks}[/et_pb_social_media_follow][/et_pb_column][et_pb_column type="1_3" _builder_version="{v}" {COLORS_INFO}][et_pb_text _builder_version="{v}" text_text_color="{yellow}" link_font="{FONT_BOLD}" link_text_color="{dark}" header_text_color="{dark}" text_orientation="center" text_text_align="center" {COLORS_INFO} link_text_color__hover_enabled="on|desktop"]<p><span style="color: {dark};"><strong><a href="mailto:{email}" target="_blank" rel="noopener noreferrer" style="color: {dark};">{email}</a></strong></span></p>[/et_pb_text][/et_pb_column][et_pb_column type="1_3" _builder_version="{v}" {COLORS_INFO}][et_pb_search button_color="{primary}" placeholder_color="{primary}" _builder_version="{v}" form_field_background_color="RGBA(255,255,255,0)" form_field_text_color="{dark}" form_field_focus_background_color="RGBA(255,255,255,0)" form_field_focus_text_color="{dark}" button_font="{FONT_EXTRA_BOLD}" button_text_color="{secondary}" button_font_size="12px" form_field_font_size="12px" background_color="rgba(0,0,0,0)" border_width_all="3px" border_color_all="{primary}" {COLORS_INFO}][/et_pb_search][/et_pb_column][/et_pb_row]"#
        )
    }
}

impl Render for FooterBlock {
    fn render(&self) -> String {
        let v = BUILDER_VERSION;
        let s = &self.style.section;
        let (image, position, global) =
            (&s.background_image, &s.background_position, &s.global_module);
        format!(
            r#"[et_pb_section fb_built="1" admin_label="Section" _builder_version="{v}" background_image="{image}" background_position="{position}" min_height="294.8px" custom_margin="||||false|false" custom_padding="||||false|false" global_module="{global}" saved_tabs="all" {COLORS_INFO}]{}{}[/et_pb_section]"#,
            self.button_row(),
            self.contact_row()
        )
    }
}
