use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::core::datasource::{Row, SourceError, SpreadsheetRows};
use crate::infra::google::auth::GoogleAuth;

/// Minimal Sheets REST client. It deliberately exposes only the single
/// range read the data source adapter needs.
pub struct SheetsApiClient {
    client: Client,
    auth: Arc<GoogleAuth>,
    base_url: String,
}

impl SheetsApiClient {
    pub fn new(auth: Arc<GoogleAuth>) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: "https://sheets.googleapis.com".to_string(),
        }
    }
}

#[async_trait]
impl SpreadsheetRows for SheetsApiClient {
    async fn read_rows(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Row>, SourceError> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| SourceError::Remote(e.to_string()))?;

        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, spreadsheet_id, range
        );

        tracing::debug!(spreadsheet_id, range, "reading sheet range");

        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| SourceError::Remote(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .await
                .map_err(|e| SourceError::Remote(e.to_string()))?;
            return Err(SourceError::Remote(format!(
                "Sheets returned {} for {}: {}",
                status, spreadsheet_id, text
            )));
        }

        let value_range: ValueRange = resp
            .json()
            .await
            .map_err(|e| SourceError::Remote(e.to_string()))?;

        Ok(value_range.values)
    }
}

/// Body of a `values.get` response. A sheet with no data carries no
/// `values` key at all, so it decodes as an empty table.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}
