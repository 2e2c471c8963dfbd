use crate::error::{Result, SalesInsightsError};
use crate::ingestion::read_raw_records;
use crate::schema::RawRecord;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::debug;
use reqwest::Client;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything the refresh task can pull a full sheet from.
pub trait FeedSource: Send + Sync {
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<RawRecord>>>;
}

/// Pulls a published CSV sheet over HTTP.
#[derive(Clone)]
pub struct CsvFeedClient {
    client: Client,
    url: String,
}

impl CsvFeedClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SalesInsightsError::Fetch(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch_rows(&self) -> Result<Vec<RawRecord>> {
        debug!("Fetching sales feed: {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SalesInsightsError::Fetch(format!("GET {}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SalesInsightsError::Fetch(format!(
                "GET {} returned status {}",
                self.url, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SalesInsightsError::Fetch(format!("reading body from {}: {}", self.url, e)))?;

        let rows = read_raw_records(body.as_bytes())?;
        debug!("Feed returned {} rows", rows.len());
        Ok(rows)
    }
}

impl FeedSource for CsvFeedClient {
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<RawRecord>>> {
        self.fetch_rows().boxed()
    }
}
