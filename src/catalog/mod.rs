//! Sermon catalog: raw JSON models, normalization and series grouping

pub mod duration;
mod error;
mod loader;
pub mod models;
pub mod source;
#[cfg(test)]
mod tests;

pub use duration::{format_clock, format_minutes, parse_duration_text};
pub use error::CatalogError;
pub use loader::{load_catalog, resolve_audio_url, series_slug, Catalog};
pub use models::{CategorySummary, ScheduleType, SermonRecord, Series};
pub use source::{load_from, source_for, CatalogSource, FileCatalogSource, HttpCatalogSource};
