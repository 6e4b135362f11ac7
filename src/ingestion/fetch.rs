//! Fetch functions - retrieve listing datasets from the upstream host

use crate::error::IngestError;
use crate::ingestion::decode::decode_payload;
use crate::ingestion::parse::parse_rows;
use crate::ingestion::types::{City, Download, RawRow};
use crate::ingestion::utils::looks_like_html;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

/// Anything that can produce the rows for a city.
/// The cache only talks to this, so tests can swap in a fake.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn load(&self, city: City) -> Result<Vec<RawRow>, IngestError>;
}

/// Downloads, decodes and parses the published CSV for each city
pub struct HttpDatasetSource {
    client: Client,
    urls: HashMap<City, String>,
}

impl HttpDatasetSource {
    pub fn new(urls: HashMap<City, String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        // Compression is sniffed from the body, so reqwest must not decode it
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, urls })
    }

    /// Source URL for a city, honouring configured overrides
    pub fn url_for(&self, city: City) -> &str {
        self.urls
            .get(&city)
            .map(String::as_str)
            .unwrap_or(city.default_url())
    }
}

#[async_trait]
impl DatasetSource for HttpDatasetSource {
    async fn load(&self, city: City) -> Result<Vec<RawRow>, IngestError> {
        let url = self.url_for(city);
        info!("Fetching {} dataset from {}", city, url);

        let download = fetch_bytes(&self.client, url).await?;
        let csv_bytes = decode_payload(&download)?;
        parse_rows(&csv_bytes, url)
    }
}

fn header_text(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Download a dataset body. Non-success statuses keep the code and note
/// whether the host answered with an HTML error page.
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Download, IngestError> {
    let transport_error = |e: reqwest::Error| IngestError::FetchFailed {
        url: url.to_string(),
        status: e.status().map(|s| s.as_u16()),
        looks_like_html: false,
        detail: Some(e.to_string()),
    };

    let response = client.get(url).send().await.map_err(transport_error)?;
    let status = response.status();

    if !status.is_success() {
        let body = response.bytes().await.unwrap_or_default();
        let looks_like_html = looks_like_html(&body);
        warn!(
            "Download of {} failed with {} (html body: {})",
            url, status, looks_like_html
        );
        return Err(IngestError::FetchFailed {
            url: url.to_string(),
            status: Some(status.as_u16()),
            looks_like_html,
            detail: status.canonical_reason().map(str::to_string),
        });
    }

    let content_type = header_text(response.headers(), CONTENT_TYPE);
    let content_encoding = header_text(response.headers(), CONTENT_ENCODING);

    let body = response.bytes().await.map_err(transport_error)?;
    info!("Downloaded {} bytes from {}", body.len(), url);

    Ok(Download {
        url: url.to_string(),
        content_type,
        content_encoding,
        body,
    })
}
