//! Tests for the command-line interface

#[cfg(test)]
mod tests {
    use super::super::cli::{format_categories, format_pick, format_probe, format_sermons, format_series, format_status};
    use super::super::*;
    use crate::audio::{PlaybackError, ProbeReport};
    use crate::catalog::{CategorySummary, ScheduleType, SermonRecord, Series};
    use crate::liturgical::{SundayPick, LABEL_TODAY};
    use crate::session::{PlaybackState, SessionSnapshot};
    use chrono::NaiveDate;
    use clap::Parser;

    fn sermon(id: &str, title: &str) -> SermonRecord {
        SermonRecord {
            id: id.to_string(),
            title: title.to_string(),
            category: "sundays".to_string(),
            subcategory: None,
            audio_url: format!("https://audio.example.org/{}.mp3", id),
            schedule_type: ScheduleType::Movable,
            pascha_offset: Some(-49),
            known_duration_text: Some("24:00".to_string()),
            recording_year: Some(2019),
            liturgical_date: Some("2024-02-25".to_string()),
            part_number: None,
        }
    }

    #[test]
    fn test_args_parsing() {
        use clap::CommandFactory;
        let app = Args::command();
        app.debug_assert();
    }

    #[test]
    fn test_play_subcommand() {
        let args = Args::try_parse_from(["sermon-stream", "--catalog", "lib.json", "play", "s1", "--seconds", "20"]).unwrap();
        assert_eq!(args.catalog.as_deref(), Some("lib.json"));
        assert_eq!(args.command, Command::Play { id: "s1".to_string(), seconds: Some(20) });
    }

    #[test]
    fn test_sunday_date_parsing() {
        let args = Args::try_parse_from(["sermon-stream", "sunday", "--date", "2024-02-24"]).unwrap();
        assert_eq!(args.command, Command::Sunday { date: NaiveDate::from_ymd_opt(2024, 2, 24) });
        assert!(Args::try_parse_from(["sermon-stream", "sunday", "--date", "24/02/2024"]).is_err());
    }

    #[test]
    fn test_display_sermons() {
        let long = sermon("s2", "Predica la Duminica Izgonirii lui Adam din Rai, despre post si iertare");
        let mut silent = sermon("s3", "Fara inregistrare");
        silent.audio_url.clear();
        let plain = sermon("s1", "Duminica Iertarii");

        let out = format_sermons(&[&plain, &long, &silent]);
        assert!(out.contains("Duminica Iertarii"));
        assert!(out.contains("24 min"));
        assert!(out.contains("25 Februarie 2024"));
        assert!(out.contains("..."));
        assert!(out.contains("(fără audio)"));
    }

    #[test]
    fn test_display_categories_and_series() {
        let categories = vec![CategorySummary { key: "sundays".to_string(), name: "Duminici".to_string(), count: 3 }];
        assert!(format_categories(&categories).contains("Duminici"));

        let mut part_two = sermon("c2", "Partea a doua");
        part_two.part_number = Some(2);
        let series = Series { id: "psalmii".to_string(), name: "Psalmii".to_string(), sermons: vec![sermon("c1", "Partea intai"), part_two] };
        let out = format_series(&[&series]);
        assert!(out.starts_with("Psalmii [psalmii] - 2 predici"));
        assert!(out.contains(" 2. Partea a doua"));
    }

    #[test]
    fn test_display_pick() {
        let record = sermon("s1", "Duminica Iertarii");
        let date = NaiveDate::from_ymd_opt(2024, 2, 25).unwrap();
        let pick = SundayPick { date, label: LABEL_TODAY, sermon: Some(&record) };
        assert_eq!(format_pick(&pick), "Predica de Astăzi (25 Februarie 2024): Duminica Iertarii [s1]");

        let empty = SundayPick { date, label: LABEL_TODAY, sermon: None };
        assert!(format_pick(&empty).ends_with("nicio predică în arhivă"));
    }

    #[test]
    fn test_display_probe() {
        let report = ProbeReport {
            url: "https://audio.example.org/s1.mp3".to_string(),
            status: 206,
            accept_ranges: Some("bytes".to_string()),
            content_range: Some("bytes 0-65535/23040000".to_string()),
            total_bytes: Some(23_040_000),
            decoder_error: Some("unsupported".to_string()),
            ..Default::default()
        };
        let out = format_probe(&report, &sermon("s1", "Duminica Iertarii"));
        assert!(out.contains("Byte ranges: yes"));
        assert!(out.contains("Size: 23040000 bytes"));
        assert!(out.contains("Decoder: unsupported"));
        assert!(out.contains("Catalog duration: 24:00"));
    }

    #[test]
    fn test_status_prefers_catalog_duration() {
        let snapshot = SessionSnapshot {
            current_record: Some(sermon("s1", "Duminica Iertarii")),
            playback_state: PlaybackState::Playing,
            position_seconds: 75.0,
            reported_duration_seconds: Some(37.0),
            authoritative_duration_seconds: Some(1440.0),
            ..Default::default()
        };
        assert_eq!(format_status(&snapshot), "[Redare] Duminica Iertarii 1:15 / 24:00 x1 vol 100%");
    }

    #[test]
    fn test_status_shows_error_message() {
        let snapshot = SessionSnapshot {
            current_record: Some(sermon("s1", "Duminica Iertarii")),
            playback_state: PlaybackState::Errored,
            last_error: Some(PlaybackError::Network("reset".to_string())),
            ..Default::default()
        };
        let line = format_status(&snapshot);
        assert!(line.starts_with("[Eroare]"));
        assert!(line.ends_with(PlaybackError::Network(String::new()).user_message()));
    }

    #[test]
    fn test_display_error() {
        let cli = Cli { args: Args::try_parse_from(["sermon-stream", "series"]).unwrap() };
        let error = std::io::Error::new(std::io::ErrorKind::Other, "Test error");
        cli.display_error(&error);
    }

    #[test]
    fn test_parse_control_keys() {
        assert_eq!(parse_control("p"), Some(Control::TogglePlay));
        assert_eq!(parse_control(" f "), Some(Control::SkipForward));
        assert_eq!(parse_control("b"), Some(Control::SkipBackward));
        assert_eq!(parse_control("r"), Some(Control::CycleRate));
        assert_eq!(parse_control("q"), Some(Control::Quit));
        assert_eq!(parse_control("s 90"), Some(Control::Seek(90.0)));
        assert_eq!(parse_control("s 1:30"), Some(Control::Seek(90.0)));
        assert_eq!(parse_control("v 0.5"), Some(Control::Volume(0.5)));
    }

    #[test]
    fn test_parse_control_rejects_malformed_lines() {
        assert_eq!(parse_control(""), None);
        assert_eq!(parse_control("x"), None);
        assert_eq!(parse_control("s"), None);
        assert_eq!(parse_control("s -5"), None);
        assert_eq!(parse_control("v abc"), None);
        assert_eq!(parse_control("v NaN"), None);
        assert_eq!(parse_control("p extra"), None);
        assert_eq!(parse_control("s 1 2"), None);
    }

    #[test]
    fn test_controls_help_lists_every_key() {
        for key in ["p ", "f ", "b ", "s <", "v <", "r ", "q "] {
            assert!(CONTROLS_HELP.contains(key), "missing {:?}", key);
        }
    }
}
