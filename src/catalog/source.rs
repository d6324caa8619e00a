//! Where the catalog JSON comes from: a bundled file or a published URL.

use crate::catalog::error::CatalogError;
use crate::catalog::loader::{load_catalog, Catalog};
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

const LOG_TARGET: &str = "sermon_stream::catalog::source";

/// Supplies the raw catalog document.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_raw(&self) -> Result<String, CatalogError>;

    /// Human-readable location, for logs and error messages.
    fn describe(&self) -> String;
}

/// Catalog bundled as a local JSON file.
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn fetch_raw(&self) -> Result<String, CatalogError> {
        debug!(target: LOG_TARGET, path = %self.path.display(), "Reading catalog file");
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Catalog published next to the audio files.
pub struct HttpCatalogSource {
    client: Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, url: url.to_string() }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_raw(&self) -> Result<String, CatalogError> {
        debug!(target: LOG_TARGET, url = %self.url, "Fetching catalog");
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Picks a source from a location string: `http(s)://` URLs are fetched, anything else is a path.
pub fn source_for(location: &str) -> Box<dyn CatalogSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpCatalogSource::new(location))
    } else {
        Box::new(FileCatalogSource::new(location))
    }
}

/// Fetches and parses the catalog from `source`.
pub async fn load_from(source: &dyn CatalogSource) -> Result<Catalog, CatalogError> {
    let raw = source.fetch_raw().await?;
    let catalog = load_catalog(&raw)?;
    info!(target: LOG_TARGET, source = %source.describe(), records = catalog.len(), "Catalog ready");
    Ok(catalog)
}
