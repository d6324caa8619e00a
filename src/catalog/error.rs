use std::error::Error;
use std::fmt;
use std::io;

/// Error types for loading the sermon catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// The catalog JSON could not be parsed. Fatal at startup: there is no fallback catalog.
    Malformed(String),
    IoError(io::Error),
    NetworkError(reqwest::Error),
    /// A record was selected for playback but carries no audio URL.
    NotPlayable(String),
    InvalidUrl(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Malformed(e) => write!(f, "Malformed catalog: {}", e),
            CatalogError::IoError(e) => write!(f, "I/O error: {}", e),
            CatalogError::NetworkError(e) => write!(f, "Network error: {}", e),
            CatalogError::NotPlayable(id) => write!(f, "Sermon '{}' has no audio file", id),
            CatalogError::InvalidUrl(e) => write!(f, "Invalid URL: {}", e),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CatalogError::IoError(e) => Some(e),
            CatalogError::NetworkError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Malformed(e.to_string())
    }
}

impl From<io::Error> for CatalogError {
    fn from(e: io::Error) -> Self {
        CatalogError::IoError(e)
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::NetworkError(e)
    }
}

impl From<url::ParseError> for CatalogError {
    fn from(e: url::ParseError) -> Self {
        CatalogError::InvalidUrl(e.to_string())
    }
}
