use reqwest::Client;
use tracing::info;
use url::Url;

use crate::error::ScrapeError;

/// Downloads product pages.
///
/// One `PageFetcher` is shared by every unit of a run; the underlying
/// `reqwest::Client` pools connections and is cheap to clone.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Builds a fetcher with the default browser-like headers.
    pub fn new() -> eyre::Result<Self> {
        let client = Client::builder()
            .default_headers(crate::build_headers())
            .build()?;
        Ok(Self { client })
    }

    /// Issues a single GET for `url` and returns the body as text.
    ///
    /// Any status outside 2xx is an error. There is no retry; the transport's
    /// default timeout and redirect policy apply.
    pub async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let target = Url::parse(url).map_err(|e| ScrapeError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| ScrapeError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::from_reqwest(url, e))?;
        info!("HTTP request successful, {} bytes fetched from {url}", body.len());
        Ok(body)
    }
}
