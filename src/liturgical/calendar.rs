use crate::catalog::SermonRecord;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub const LABEL_TOMORROW: &str = "Predica de Mâine";
pub const LABEL_TODAY: &str = "Predica de Astăzi";
pub const LABEL_LAST_SUNDAY: &str = "Duminica Trecută";
pub const LABEL_NEXT_SUNDAY: &str = "Duminica Viitoare";

const MONTHS_RO: [&str; 12] = [
    "Ianuarie", "Februarie", "Martie", "Aprilie", "Mai", "Iunie",
    "Iulie", "August", "Septembrie", "Octombrie", "Noiembrie", "Decembrie",
];

/// A Sunday chosen for the home screen together with its sermon, if the catalog has one.
#[derive(Debug, Clone, PartialEq)]
pub struct SundayPick<'a> {
    pub date: NaiveDate,
    pub label: &'static str,
    pub sermon: Option<&'a SermonRecord>,
}

fn days_since_sunday(date: NaiveDate) -> i64 {
    date.weekday().num_days_from_sunday() as i64
}

/// Most recent Sunday, or `date` itself on a Sunday.
pub fn most_recent_sunday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(days_since_sunday(date))
}

/// The Sunday strictly after `date`.
pub fn following_sunday(date: NaiveDate) -> NaiveDate {
    date + Duration::days(7 - days_since_sunday(date))
}

/// Target date for "this Sunday": tomorrow on Saturday, today on Sunday, otherwise last Sunday.
pub fn this_sunday_date(today: NaiveDate) -> (NaiveDate, &'static str) {
    match today.weekday() {
        Weekday::Sat => (today + Duration::days(1), LABEL_TOMORROW),
        Weekday::Sun => (today, LABEL_TODAY),
        _ => (most_recent_sunday(today), LABEL_LAST_SUNDAY),
    }
}

/// Target date for "next Sunday" relative to the one shown as "this Sunday".
pub fn next_sunday_date(today: NaiveDate) -> NaiveDate {
    match today.weekday() {
        Weekday::Sat => today + Duration::days(8),
        Weekday::Sun => today + Duration::days(7),
        _ => following_sunday(today),
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// First sermon whose liturgical date is exactly `date`.
pub fn find_for_date(sermons: &[SermonRecord], date: NaiveDate) -> Option<&SermonRecord> {
    let key = date_key(date);
    sermons.iter().find(|s| s.liturgical_date.as_deref() == Some(key.as_str()))
}

pub fn sunday_pick(sermons: &[SermonRecord], today: NaiveDate) -> SundayPick<'_> {
    let (date, label) = this_sunday_date(today);
    SundayPick { date, label, sermon: find_for_date(sermons, date) }
}

pub fn next_sunday_pick(sermons: &[SermonRecord], today: NaiveDate) -> SundayPick<'_> {
    let date = next_sunday_date(today);
    SundayPick { date, label: LABEL_NEXT_SUNDAY, sermon: find_for_date(sermons, date) }
}

/// Recordings of the same movable occasion: the target first, then the others
/// by recording year, newest first, undated last.
pub fn related_sermons<'a>(sermons: &'a [SermonRecord], target: &'a SermonRecord) -> Vec<&'a SermonRecord> {
    let offset = match target.pascha_offset {
        Some(offset) => offset,
        None => return vec![target],
    };

    let mut related: Vec<&SermonRecord> = sermons
        .iter()
        .filter(|s| s.id != target.id && s.pascha_offset == Some(offset))
        .collect();
    related.sort_by(|a, b| match (a.recording_year, b.recording_year) {
        (Some(ya), Some(yb)) => yb.cmp(&ya),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut out = Vec::with_capacity(related.len() + 1);
    out.push(target);
    out.extend(related);
    out
}

pub fn liturgical_only(sermons: &[SermonRecord]) -> Vec<&SermonRecord> {
    sermons.iter().filter(|s| s.liturgical_date.is_some()).collect()
}

/// The next `count` dated sermons on or after `today`, in date order.
pub fn upcoming(sermons: &[SermonRecord], today: NaiveDate, count: usize) -> Vec<&SermonRecord> {
    let today_key = date_key(today);
    let mut dated: Vec<&SermonRecord> = sermons
        .iter()
        .filter(|s| matches!(s.liturgical_date.as_deref(), Some(d) if d >= today_key.as_str()))
        .collect();
    dated.sort_by(|a, b| a.liturgical_date.cmp(&b.liturgical_date));
    dated.truncate(count);
    dated
}

/// `2024-02-25` -> `25 Februarie 2024`. Unparseable input is returned unchanged.
pub fn format_date_ro(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => format!("{} {} {}", d.day(), MONTHS_RO[d.month0() as usize], d.year()),
        Err(_) => date.to_string(),
    }
}
