//! HTTP downloads for the `url` provider and for metadata imports

use std::time::Duration;

use log::debug;

use crate::error::{Error, Result};

/// Fetches the raw bytes behind a URL. Allows mocking in tests.
pub trait Downloader: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// The default `Downloader`, a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    timeout: Duration,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let network_error = |e: reqwest::Error| Error::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("project-patcher/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
            .map_err(network_error)?;

        debug!("GET {}", url);
        let response = client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(network_error)?;
        let bytes = response.bytes().map_err(network_error)?;
        Ok(bytes.to_vec())
    }
}

/// Whether `location` is an `http` or `https` URL rather than a local path.
pub fn is_remote(location: &str) -> bool {
    match url::Url::parse(location) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
