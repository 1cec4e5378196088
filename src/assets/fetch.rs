use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::foundation::error::{MemeError, MemeResult};

/// Reads the encoded bytes behind a template display URL.
pub trait ImageFetcher {
    /// Fetch `url` and return its raw (still encoded) bytes.
    fn fetch(&mut self, url: &str) -> MemeResult<Vec<u8>>;
}

/// `http(s)://` through a blocking HTTP client, `file://` and bare paths from disk.
#[derive(Clone, Debug)]
pub struct DefaultImageFetcher {
    client: reqwest::blocking::Client,
}

impl DefaultImageFetcher {
    /// Create a fetcher whose HTTP requests time out after `timeout`.
    pub fn new(timeout: Duration) -> MemeResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("memeforge/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self { client })
    }

    fn fetch_http(&self, url: &str) -> MemeResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request '{url}'"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(MemeError::Other(anyhow::anyhow!(
                "'{url}' answered with status {status}"
            )));
        }
        let bytes = response
            .bytes()
            .with_context(|| format!("read body of '{url}'"))?;
        Ok(bytes.to_vec())
    }
}

impl ImageFetcher for DefaultImageFetcher {
    #[tracing::instrument(skip(self))]
    fn fetch(&mut self, url: &str) -> MemeResult<Vec<u8>> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return self.fetch_http(url);
        }
        let path = url.strip_prefix("file://").unwrap_or(url);
        let bytes = std::fs::read(Path::new(path)).with_context(|| format!("read '{path}'"))?;
        Ok(bytes)
    }
}
