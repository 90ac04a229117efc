//! Spreadsheet intake: read a cell range and turn rows into entities.
use crate::entity::Entity;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, instrument};

/// Rectangular cell reader.
#[async_trait]
pub trait TabularSource: Send + Sync {
    /// Rows of cells; ragged rows are allowed.
    async fn read_range(&self, sheet_id: &str, range: &str) -> Result<Vec<Vec<String>>>;
}

#[derive(Clone)]
pub struct SheetsClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsClient {
    pub fn new(http: Client, base_url: &str, token: String) -> Result<Self> {
        let base_url = Url::parse(base_url).context("invalid Sheets base URL")?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub fn build_request(&self, sheet_id: &str, range: &str) -> Result<reqwest::Request> {
        let path = format!(
            "spreadsheets/{}/values/{}",
            urlencoding::encode(sheet_id),
            urlencoding::encode(range)
        );
        let url = self.base_url.join(&path).context("invalid Sheets URL")?;
        self.http
            .get(url)
            .bearer_auth(&self.token)
            .build()
            .context("failed to build Sheets request")
    }
}

#[async_trait]
impl TabularSource for SheetsClient {
    #[instrument(skip(self))]
    async fn read_range(&self, sheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let request = self.build_request(sheet_id, range)?;
        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach Google Sheets")?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("sheets error {}: {}", status, body));
        }
        let payload: ValueRange = res.json().await.context("invalid Sheets response JSON")?;
        info!(rows = payload.values.len(), "read sheet range");
        Ok(payload
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// First row names the columns; every later row becomes an entity holding
/// all headers, with missing cells as "".
pub fn rows_to_entities(rows: &[Vec<String>]) -> Vec<Entity> {
    let Some((header, body)) = rows.split_first() else {
        return Vec::new();
    };
    body.iter()
        .map(|row| {
            let fields: BTreeMap<String, String> = header
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect();
            Entity::new(fields)
        })
        .collect()
}

/// Keep entities of the given edition year; all of them when `year` is None.
pub fn select_entities(entities: Vec<Entity>, year: Option<&str>) -> Vec<Entity> {
    match year {
        Some(year) => {
            let total = entities.len();
            let kept: Vec<Entity> = entities.into_iter().filter(|e| e.in_edition(year)).collect();
            info!(year, matched = kept.len(), excluded = total - kept.len(), "edition filter applied");
            kept
        }
        None => entities,
    }
}
