//! Integration tests module
//!
//! This module organizes all integration tests for the sermon-stream application.

pub mod catalog_test;
pub mod config_test;
pub mod session_test;

/// A small library document in the wrapped format, shared by the tests.
pub const LIBRARY_JSON: &str = r#"{
    "metadata": { "totalFiles": 4 },
    "categories": {
        "sundays": {
            "name": "Duminici",
            "sermons": [
                { "id": "vames", "title": "Duminica Vameșului și a Fariseului", "category": "sundays",
                  "audioFile": "sundays/vames.opus", "duration": "24:00", "type": "movable",
                  "paschaOffset": -70, "date": "2024-02-25", "recordingYear": 2019 },
                { "id": "vames-2015", "title": "Vameșul și Fariseul", "category": "sundays",
                  "audioFile": "sundays/vames-2015.opus", "duration": "1:40", "type": "movable",
                  "paschaOffset": -70, "recordingYear": 2015 },
                { "id": "fiu", "title": "Duminica Fiului Risipitor", "category": "sundays",
                  "audioFile": "sundays/fiu risipitor.opus", "type": "movable",
                  "paschaOffset": -63, "date": "2024-03-03" }
            ]
        },
        "courses": {
            "name": "Cursuri",
            "sermons": [
                { "id": "nota", "title": "Notă fără înregistrare", "category": "courses", "audioFile": "" }
            ]
        }
    }
}"#;
