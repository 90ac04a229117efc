//! One-line festival programme summary written next to each entity's files.
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const SUMMARY_FILE: &str = "metadata.json";

/// Contents of `metadata/{year}.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FestivalMetadata {
    #[serde(default)]
    pub cities: Vec<String>,
    /// `[from, to]` pairs as `YYYY-MM-DD`.
    #[serde(default)]
    pub dates: Vec<Vec<String>>,
}

impl FestivalMetadata {
    /// `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            debug!(path = %path.display(), "no festival metadata");
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let parsed = serde_json::from_str(&raw)
            .with_context(|| format!("invalid festival metadata {}", path.display()))?;
        Ok(Some(parsed))
    }
}

const WEEKDAYS: [&str; 7] = [
    "lunes",
    "martes",
    "miércoles",
    "jueves",
    "viernes",
    "sábado",
    "domingo",
];

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAYS[day.num_days_from_monday() as usize]
}

/// `2025-11-06` → `jueves 06 de noviembre`. `None` for anything unparseable.
pub fn spanish_date(iso: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(iso.trim(), "%Y-%m-%d").ok()?;
    Some(format!(
        "{} {:02} de {}",
        weekday_name(date.weekday()),
        date.day(),
        MONTHS[date.month0() as usize]
    ))
}

/// Directors upper-cased with the ` y ` separator shown as ` & `.
fn director_credit(director: &str) -> String {
    director.replace(" y ", " & ").to_uppercase()
}

pub fn summary_line(
    title: &str,
    section: &str,
    director: &str,
    year: &str,
    festival: Option<&FestivalMetadata>,
) -> String {
    let mut line = format!(
        "{} {} - {} - {} - Programación Excéntrico {}",
        section.to_uppercase(),
        year,
        title,
        director_credit(director),
        year
    );
    let Some(festival) = festival else {
        return line;
    };

    if let Some(city) = festival.cities.first().filter(|c| !c.is_empty()) {
        line.push(' ');
        line.push_str(city);
    }

    let range = festival.dates.first();
    let from = range.and_then(|r| r.first()).and_then(|d| parse_logged(d));
    let to = range.and_then(|r| r.get(1)).and_then(|d| parse_logged(d));
    if let Some(from) = from {
        line.push_str(" del ");
        line.push_str(&from);
        if let Some(to) = to {
            line.push_str(" al ");
            line.push_str(&to);
        }
    }
    line
}

fn parse_logged(raw: &str) -> Option<String> {
    let parsed = spanish_date(raw);
    if parsed.is_none() {
        warn!(date = %raw, "unparseable festival date");
    }
    parsed
}

/// Write the summary line to `{entity_dir}/metadata.json`.
pub async fn write_summary(entity_dir: &Path, line: &str) -> Result<PathBuf> {
    let path = entity_dir.join(SUMMARY_FILE);
    tokio::fs::write(&path, line)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
