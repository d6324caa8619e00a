//! Data models for the bundled sermon catalog

use serde::{Deserialize, Serialize};
use indexmap::IndexMap;

/// Raw sermon entry as it appears in the catalog JSON.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawSermon {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub audio_file: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub recording_year: Option<i32>,
    #[serde(default)]
    pub year: Option<i32>,
    /// Liturgical date of the occasion (`YYYY-MM-DD`).
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "type", default)]
    pub schedule_type: Option<String>,
    #[serde(default)]
    pub pascha_offset: Option<i32>,
    #[serde(default)]
    pub part_number: Option<u32>,
}

/// A category block: display name plus its sermons.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct RawCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sermons: Vec<RawSermon>,
}

/// Full library document. The catalog is either wrapped in `{ "categories": {...} }`
/// (optionally next to a `metadata` block) or is the bare category map.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum RawLibrary {
    Wrapped {
        categories: IndexMap<String, RawCategory>,
    },
    Bare(IndexMap<String, RawCategory>),
}

impl RawLibrary {
    pub fn into_categories(self) -> IndexMap<String, RawCategory> {
        match self {
            RawLibrary::Wrapped { categories } => categories,
            RawLibrary::Bare(categories) => categories,
        }
    }
}

/// Whether an occasion falls on a fixed calendar date or moves with Pascha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleType {
    FixedDate,
    Movable,
}

impl ScheduleType {
    fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("fixed-feast") => ScheduleType::FixedDate,
            _ => ScheduleType::Movable,
        }
    }
}

/// Normalized, immutable sermon record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SermonRecord {
    pub id: String,
    pub title: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub audio_url: String,
    pub schedule_type: ScheduleType,
    pub pascha_offset: Option<i32>,
    /// Human-authored `[[H:]MM:]SS` duration, trusted over decoder reports.
    pub known_duration_text: Option<String>,
    pub recording_year: Option<i32>,
    pub liturgical_date: Option<String>,
    pub part_number: Option<u32>,
}

impl SermonRecord {
    /// A record without an audio URL can be listed but never loaded.
    pub fn is_playable(&self) -> bool {
        !self.audio_url.trim().is_empty()
    }

    /// Authoritative duration in seconds, if the catalog carries a parseable one.
    pub fn known_duration_secs(&self) -> Option<f64> {
        self.known_duration_text
            .as_deref()
            .and_then(super::duration::parse_duration_text)
    }
}

impl From<RawSermon> for SermonRecord {
    fn from(raw: RawSermon) -> Self {
        SermonRecord {
            schedule_type: ScheduleType::from_raw(raw.schedule_type.as_deref()),
            id: raw.id,
            title: raw.title,
            category: raw.category,
            subcategory: raw.subcategory.filter(|s| !s.is_empty()),
            audio_url: raw.audio_file,
            pascha_offset: raw.pascha_offset,
            known_duration_text: raw.duration.filter(|d| !d.trim().is_empty()),
            recording_year: raw.recording_year.or(raw.year),
            liturgical_date: raw.date,
            part_number: raw.part_number,
        }
    }
}

/// Named, ordered group of records sharing a subcategory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub id: String,
    pub name: String,
    pub sermons: Vec<SermonRecord>,
}

/// Category summary in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub key: String,
    pub name: String,
    pub count: usize,
}
