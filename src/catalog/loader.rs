use crate::catalog::error::CatalogError;
use crate::catalog::models::{CategorySummary, RawLibrary, SermonRecord, Series};
use indexmap::IndexMap;
use tracing::{debug, info};
use url::Url;

const LOG_TARGET: &str = "sermon_stream::catalog";

/// Category whose untitled entries are gathered into a catch-all series.
const COURSES_CATEGORY: &str = "courses";
const UNGROUPED_COURSES: &str = "Alte Cursuri";

/// In-memory catalog: every record in source order plus the derived series index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<SermonRecord>,
    categories: Vec<CategorySummary>,
    series: IndexMap<String, Series>,
}

/// Transforms raw catalog JSON into normalized records and a series index.
///
/// Ordering is deterministic: source category order, then source order within each
/// category. Unknown fields are ignored. Only malformed JSON fails.
pub fn load_catalog(raw: &str) -> Result<Catalog, CatalogError> {
    let library: RawLibrary = serde_json::from_str(raw)?;
    let categories = library.into_categories();

    let mut records = Vec::new();
    let mut summaries = Vec::with_capacity(categories.len());
    for (key, category) in categories {
        debug!(target: LOG_TARGET, category = %key, count = category.sermons.len(), "Loading category");
        summaries.push(CategorySummary {
            name: if category.name.is_empty() { key.clone() } else { category.name.clone() },
            key: key.clone(),
            count: category.sermons.len(),
        });
        for raw_sermon in category.sermons {
            let mut record = SermonRecord::from(raw_sermon);
            if record.category.is_empty() {
                record.category = key.clone();
            }
            records.push(record);
        }
    }

    let series = build_series_index(&records);
    info!(target: LOG_TARGET, records = records.len(), series = series.len(), "Catalog loaded");

    Ok(Catalog { records, categories: summaries, series })
}

fn build_series_index(records: &[SermonRecord]) -> IndexMap<String, Series> {
    let mut grouped: IndexMap<String, Vec<SermonRecord>> = IndexMap::new();
    for record in records {
        let name = match (&record.subcategory, record.category.as_str()) {
            (Some(sub), _) => sub.clone(),
            (None, COURSES_CATEGORY) => UNGROUPED_COURSES.to_string(),
            (None, _) => continue,
        };
        grouped.entry(name).or_default().push(record.clone());
    }

    grouped
        .into_iter()
        .map(|(name, mut sermons)| {
            // stable: equal part numbers keep source order
            sermons.sort_by_key(|s| s.part_number.unwrap_or(0));
            let series = Series { id: series_slug(&name), name: name.clone(), sermons };
            (name, series)
        })
        .collect()
}

/// Lowercases, turns whitespace runs into `-` and drops anything outside `[a-z0-9-]`.
pub fn series_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            slug.push(ch);
        }
    }
    slug
}

/// Joins a record's audio path onto an optional base URL.
///
/// Absolute URLs pass through (normalized and percent-encoded). Relative paths are
/// joined onto `base`, or returned unchanged when no base is configured.
pub fn resolve_audio_url(base: Option<&str>, audio_file: &str) -> Result<String, CatalogError> {
    if audio_file.trim().is_empty() {
        return Err(CatalogError::NotPlayable(audio_file.to_string()));
    }
    if let Ok(absolute) = Url::parse(audio_file) {
        return Ok(absolute.to_string());
    }
    match base {
        Some(base) => {
            let base = if base.ends_with('/') { base.to_string() } else { format!("{}/", base) };
            let joined = Url::parse(&base)?.join(audio_file.trim_start_matches('/'))?;
            Ok(joined.to_string())
        }
        None => Ok(audio_file.to_string()),
    }
}

impl Catalog {
    pub fn records(&self) -> &[SermonRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&SermonRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn in_category<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a SermonRecord> + 'a {
        self.records.iter().filter(move |r| r.category == key)
    }

    pub fn categories(&self) -> &[CategorySummary] {
        &self.categories
    }

    /// Series keyed by name, in first-appearance order.
    pub fn series_index(&self) -> &IndexMap<String, Series> {
        &self.series
    }

    /// Series ordered by number of sermons, largest first.
    pub fn series_by_size(&self) -> Vec<&Series> {
        let mut all: Vec<&Series> = self.series.values().collect();
        all.sort_by(|a, b| b.sermons.len().cmp(&a.sermons.len()));
        all
    }

    /// Rewrites every playable record's audio URL against `base`.
    pub fn with_audio_base(mut self, base: Option<&str>) -> Result<Self, CatalogError> {
        if base.is_none() {
            return Ok(self);
        }
        for record in self.records.iter_mut().filter(|r| r.is_playable()) {
            record.audio_url = resolve_audio_url(base, &record.audio_url)?;
        }
        for series in self.series.values_mut() {
            for record in series.sermons.iter_mut().filter(|r| r.is_playable()) {
                record.audio_url = resolve_audio_url(base, &record.audio_url)?;
            }
        }
        Ok(self)
    }
}
