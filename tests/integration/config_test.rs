//! Integration tests for configuration management
//!
//! These tests verify that the configuration system works correctly
//! across module boundaries.

use sermon_stream::config::Settings;
use sermon_stream::session::{AudioSession, SessionOptions};
use sermon_stream::audio::ScriptedBackend;
use std::error::Error;
use tempfile::tempdir;

#[cfg(test)]
mod config_integration_tests {
    use super::*;

    /// Test complete configuration workflow
    #[test]
    fn test_config_lifecycle() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");

        let mut settings = Settings::default();
        settings.catalog_source = "https://predici.example.org/complete-sermon-library.json".to_string();
        settings.audio_base_url = Some("https://predici.example.org/audio/".to_string());
        settings.initial_volume = 0.8;
        settings.skip_forward_secs = 10.0;

        settings.validate()?;
        settings.save(&config_path)?;

        let loaded = Settings::load(&config_path)?;
        assert_eq!(loaded.catalog_source, "https://predici.example.org/complete-sermon-library.json");
        assert_eq!(loaded.audio_base_url.as_deref(), Some("https://predici.example.org/audio/"));
        assert_eq!(loaded.initial_volume, 0.8);
        assert_eq!(loaded.skip_forward_secs, 10.0);
        loaded.validate()?;
        Ok(())
    }

    /// Settings feed the session's starting volume
    #[tokio::test]
    async fn test_settings_drive_session_options() {
        let settings = Settings { initial_volume: 0.25, readiness_timeout_ms: 1200, ..Settings::default() };
        let options = SessionOptions {
            readiness_timeout: settings.readiness_timeout(),
            initial_volume: settings.initial_volume,
            ..Default::default()
        };
        let (session, handle) = AudioSession::new(Box::new(ScriptedBackend::new()), options);
        assert_eq!(session.snapshot().volume, 0.25);
        assert_eq!(handle.snapshot().volume, 0.25);
    }
}
