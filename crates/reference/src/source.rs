use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::error::DataFetchError;

const GVIZ_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

/// CSV export URL for one sheet of a Google spreadsheet.
pub fn gviz_csv_url(sheet_id: &str, sheet_name: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        &format!("{GVIZ_BASE_URL}/{sheet_id}/gviz/tq"),
        &[("tqx", "out:csv"), ("sheet", sheet_name)],
    )
}

#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn fetch_csv(&self) -> Result<String, DataFetchError>;

    fn describe(&self) -> String;
}

pub struct HttpReferenceSource {
    http: Client,
    url: Url,
}

impl HttpReferenceSource {
    pub fn new(url: Url) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(http: Client, url: Url) -> Self {
        Self { http, url }
    }
}

#[async_trait]
impl ReferenceSource for HttpReferenceSource {
    async fn fetch_csv(&self) -> Result<String, DataFetchError> {
        debug!(url = %self.url, "fetching reference csv");
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| DataFetchError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, %status, "reference source returned an error status");
            return Err(DataFetchError::Unreachable(format!(
                "GET {} returned {status}",
                self.url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| DataFetchError::Unreachable(e.to_string()))
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// In-memory CSV, for tests and offline runs.
pub struct StaticReferenceSource(pub String);

#[async_trait]
impl ReferenceSource for StaticReferenceSource {
    async fn fetch_csv(&self) -> Result<String, DataFetchError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}
