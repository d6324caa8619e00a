//! Duration text grammar and time formatting.
//!
//! Catalog durations follow `[[H:]MM:]SS`: the rightmost field is seconds, the one
//! before it minutes, the first of three is hours. `"1:30"` is ninety seconds.

/// Parses a `[[H:]MM:]SS` duration into seconds.
///
/// Returns `None` for empty input, non-numeric fields or more than three fields.
pub fn parse_duration_text(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let fields: Vec<&str> = text.split(':').collect();
    if fields.len() > 3 {
        return None;
    }

    let mut total: u64 = 0;
    for field in &fields {
        let field = field.trim();
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u64 = field.parse().ok()?;
        total = total.checked_mul(60)?.checked_add(value)?;
    }
    Some(total as f64)
}

/// Renders seconds as `M:SS`, or `H:MM:SS` past the first hour.
pub fn format_clock(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = whole / 3600;
    let mins = (whole % 3600) / 60;
    let secs = whole % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Short listing label for a catalog duration, e.g. `"24:00"` -> `"24 min"`.
pub fn format_minutes(text: &str) -> Option<String> {
    let secs = parse_duration_text(text)?;
    let minutes = (secs / 60.0).floor() as u64;
    Some(format!("{} min", minutes))
}
