//! Integration tests for catalog loading
//!
//! These tests load a library file from disk the way the binary does and
//! feed the result to the liturgical matcher.

use sermon_stream::catalog::{load_from, source_for, CatalogError};
use sermon_stream::liturgical::{next_sunday_pick, related_sermons, sunday_pick, LABEL_LAST_SUNDAY, LABEL_NEXT_SUNDAY};
use chrono::NaiveDate;
use std::error::Error;
use tempfile::tempdir;

use super::LIBRARY_JSON;

#[cfg(test)]
mod catalog_integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_load_from_file_and_resolve_audio() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("complete-sermon-library.json");
        std::fs::write(&path, LIBRARY_JSON)?;

        let source = source_for(path.to_str().ok_or("non-utf8 temp path")?);
        let catalog = load_from(source.as_ref())
            .await?
            .with_audio_base(Some("https://predici.example.org/audio/"))?;

        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.find("vames").map(|r| r.audio_url.as_str()), Some("https://predici.example.org/audio/sundays/vames.opus"));
        assert_eq!(
            catalog.find("fiu").map(|r| r.audio_url.as_str()),
            Some("https://predici.example.org/audio/sundays/fiu%20risipitor.opus")
        );
        // unplayable records stay listed but untouched
        let nota = catalog.find("nota").ok_or("missing record")?;
        assert!(!nota.is_playable());
        assert!(nota.audio_url.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let source = source_for(dir.path().join("absent.json").to_str().unwrap());
        assert!(matches!(load_from(source.as_ref()).await, Err(CatalogError::IoError(_))));
    }

    #[tokio::test]
    async fn test_malformed_file_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ \"categories\": [ oops").unwrap();
        let source = source_for(path.to_str().unwrap());
        assert!(matches!(load_from(source.as_ref()).await, Err(CatalogError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_sunday_matching_over_loaded_catalog() -> Result<(), Box<dyn Error>> {
        let catalog = sermon_stream::catalog::load_catalog(LIBRARY_JSON)?;
        let wednesday = NaiveDate::from_ymd_opt(2024, 2, 28).ok_or("bad date")?;

        let pick = sunday_pick(catalog.records(), wednesday);
        assert_eq!(pick.label, LABEL_LAST_SUNDAY);
        assert_eq!(pick.sermon.map(|s| s.id.as_str()), Some("vames"));

        let next = next_sunday_pick(catalog.records(), wednesday);
        assert_eq!(next.label, LABEL_NEXT_SUNDAY);
        assert_eq!(next.sermon.map(|s| s.id.as_str()), Some("fiu"));

        let target = catalog.find("vames").ok_or("missing record")?;
        let ids: Vec<&str> = related_sermons(catalog.records(), target).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["vames", "vames-2015"]);
        Ok(())
    }
}
