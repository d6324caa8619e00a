//! Tests for catalog loading and duration parsing

#[cfg(test)]
mod tests {
    use super::super::*;

    const SAMPLE: &str = r#"{
        "metadata": { "totalFiles": 5, "lastUpdated": "2024-01-01" },
        "categories": {
            "sundays": {
                "name": "Duminici",
                "count": 2,
                "sermons": [
                    { "id": "s1", "title": "Duminica Vameșului", "category": "sundays",
                      "audioFile": "sundays/vames.opus", "duration": "24:00",
                      "type": "movable", "paschaOffset": -70, "recordingYear": 2019,
                      "date": "2024-02-25", "keywords": ["vames"] },
                    { "id": "s2", "title": "Sfinții Trei Ierarhi", "category": "sundays",
                      "audioFile": "sundays/ierarhi.opus", "type": "fixed-feast", "year": 2021 }
                ]
            },
            "courses": {
                "name": "Cursuri",
                "sermons": [
                    { "id": "c2", "title": "Psalmii 2", "category": "courses", "subcategory": "Psalmii",
                      "audioFile": "c/p2.opus", "partNumber": 2 },
                    { "id": "c1", "title": "Psalmii 1", "category": "courses", "subcategory": "Psalmii",
                      "audioFile": "c/p1.opus", "partNumber": 1 },
                    { "id": "c9", "title": "Curs vechi", "category": "courses", "audioFile": "" }
                ]
            }
        }
    }"#;

    #[test]
    fn test_load_preserves_source_order() {
        let catalog = load_catalog(SAMPLE).unwrap();
        let ids: Vec<&str> = catalog.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "c2", "c1", "c9"]);

        let keys: Vec<&str> = catalog.categories().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["sundays", "courses"]);
        assert_eq!(catalog.categories()[1].count, 3);
    }

    #[test]
    fn test_record_normalization() {
        let catalog = load_catalog(SAMPLE).unwrap();
        let s1 = catalog.find("s1").unwrap();
        assert_eq!(s1.audio_url, "sundays/vames.opus");
        assert_eq!(s1.schedule_type, ScheduleType::Movable);
        assert_eq!(s1.pascha_offset, Some(-70));
        assert_eq!(s1.liturgical_date.as_deref(), Some("2024-02-25"));
        assert_eq!(s1.known_duration_secs(), Some(1440.0));

        let s2 = catalog.find("s2").unwrap();
        assert_eq!(s2.schedule_type, ScheduleType::FixedDate);
        assert_eq!(s2.recording_year, Some(2021));
        assert!(s2.known_duration_secs().is_none());
    }

    #[test]
    fn test_unplayable_record_is_kept_but_flagged() {
        let catalog = load_catalog(SAMPLE).unwrap();
        let c9 = catalog.find("c9").unwrap();
        assert!(!c9.is_playable());
        assert!(catalog.find("c1").unwrap().is_playable());
    }

    #[test]
    fn test_series_grouping_and_ordering() {
        let catalog = load_catalog(SAMPLE).unwrap();
        let psalms = catalog.series_index().get("Psalmii").unwrap();
        assert_eq!(psalms.id, "psalmii");
        let parts: Vec<&str> = psalms.sermons.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(parts, vec!["c1", "c2"]);

        let ungrouped = catalog.series_index().get("Alte Cursuri").unwrap();
        assert_eq!(ungrouped.id, "alte-cursuri");
        assert_eq!(ungrouped.sermons.len(), 1);

        let by_size = catalog.series_by_size();
        assert_eq!(by_size[0].name, "Psalmii");
    }

    #[test]
    fn test_bare_category_map_is_accepted() {
        let raw = r#"{ "misc": { "name": "Diverse", "sermons": [
            { "id": "m1", "title": "Unu", "audioFile": "m1.opus" } ] } }"#;
        let catalog = load_catalog(raw).unwrap();
        assert_eq!(catalog.len(), 1);
        // category falls back to the map key
        assert_eq!(catalog.find("m1").unwrap().category, "misc");
    }

    #[test]
    fn test_malformed_catalog_is_fatal() {
        let err = load_catalog("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
        assert!(load_catalog(r#"{"x": {"sermons": [{"title": "no id"}]}}"#).is_err());
    }

    #[test]
    fn test_load_is_deterministic() {
        let a = load_catalog(SAMPLE).unwrap();
        let b = load_catalog(SAMPLE).unwrap();
        assert_eq!(a.records(), b.records());
    }

    #[test]
    fn test_parse_duration_grammar() {
        assert_eq!(parse_duration_text("24:00"), Some(1440.0));
        assert_eq!(parse_duration_text("1:30"), Some(90.0));
        assert_eq!(parse_duration_text("1:02:03"), Some(3723.0));
        assert_eq!(parse_duration_text("45"), Some(45.0));
        assert_eq!(parse_duration_text(" 05:07 "), Some(307.0));
        assert_eq!(parse_duration_text(""), None);
        assert_eq!(parse_duration_text("1:2:3:4"), None);
        assert_eq!(parse_duration_text("ab:10"), None);
        assert_eq!(parse_duration_text("-1:10"), None);
        assert_eq!(parse_duration_text("10:"), None);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(65.9), "1:05");
        assert_eq!(format_clock(1440.0), "24:00");
        assert_eq!(format_clock(3723.0), "1:02:03");
        assert_eq!(format_clock(f64::NAN), "0:00");
        assert_eq!(format_minutes("24:00").as_deref(), Some("24 min"));
        assert_eq!(format_minutes("24:30").as_deref(), Some("24 min"));
        assert_eq!(format_minutes("24:59").as_deref(), Some("24 min"));
        assert_eq!(format_minutes("1:05:00").as_deref(), Some("65 min"));
    }

    #[test]
    fn test_series_slug() {
        assert_eq!(series_slug("Cursul de  Teologie 2"), "cursul-de-teologie-2");
        assert_eq!(series_slug("Viața Sfinților"), "viaa-sfinilor");
    }

    #[test]
    fn test_resolve_audio_url() {
        let joined = resolve_audio_url(Some("https://audio.example.org/predici"), "sundays/Vameș 1.opus").unwrap();
        assert_eq!(joined, "https://audio.example.org/predici/sundays/Vame%C8%99%201.opus");

        let absolute = resolve_audio_url(Some("https://other.org/"), "https://cdn.example.org/a.opus").unwrap();
        assert_eq!(absolute, "https://cdn.example.org/a.opus");

        assert_eq!(resolve_audio_url(None, "a.opus").unwrap(), "a.opus");
        assert!(matches!(resolve_audio_url(None, ""), Err(CatalogError::NotPlayable(_))));
    }
}
