//! Command-line interface implementation

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::error::Error;

use crate::audio::ProbeReport;
use crate::catalog::{format_clock, format_minutes, parse_duration_text, CategorySummary, SermonRecord, Series};
use crate::liturgical::{format_date_ro, SundayPick};
use crate::session::{PlaybackState, SessionSnapshot};

const TITLE_WIDTH: usize = 42;

/// Command-line arguments for sermon-stream
#[derive(Parser, Debug)]
#[command(author, version, about = "Sermon library browser and streaming player", long_about = None)]
pub struct Args {
    /// Config file path
    #[arg(short, long, global = true, env = "SERMON_CONFIG")]
    pub config: Option<String>,

    /// Catalog JSON file or URL
    #[arg(long, global = true, env = "SERMON_CATALOG")]
    pub catalog: Option<String>,

    /// Base URL joined to relative audio paths
    #[arg(long, global = true, env = "SERMON_AUDIO_BASE_URL")]
    pub audio_base_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List categories, or the sermons of one category
    List {
        #[arg(short = 'k', long)]
        category: Option<String>,
    },
    /// List sermon series, largest first
    Series,
    /// Show this Sunday's and next Sunday's sermons
    Sunday {
        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Show the next dated sermons
    Upcoming {
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Show sermons for the same feast as the given one
    Related { id: String },
    /// Check range support and decoder duration of a sermon's audio
    Probe { id: String },
    /// Stream a sermon through the playback session
    Play {
        id: String,
        /// Stop after this many seconds
        #[arg(short, long)]
        seconds: Option<u64>,
    },
}

/// Help shown when playback starts and after an unknown control.
pub const CONTROLS_HELP: &str = "Controls: p play/pause, f forward, b back, s <sec|MM:SS> seek, v <0-1> volume, r speed, q quit";

/// A line typed on stdin while a sermon plays.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    TogglePlay,
    SkipForward,
    SkipBackward,
    Seek(f64),
    Volume(f32),
    CycleRate,
    Quit,
}

/// Parses one control line. Seek targets use the catalog duration grammar.
pub fn parse_control(line: &str) -> Option<Control> {
    let mut parts = line.split_whitespace();
    let command = parts.next()?;
    let arg = parts.next();
    if parts.next().is_some() {
        return None;
    }
    match (command, arg) {
        ("p", None) => Some(Control::TogglePlay),
        ("f", None) => Some(Control::SkipForward),
        ("b", None) => Some(Control::SkipBackward),
        ("r", None) => Some(Control::CycleRate),
        ("q", None) => Some(Control::Quit),
        ("s", Some(target)) => parse_duration_text(target).map(Control::Seek),
        ("v", Some(level)) => level.parse::<f32>().ok().filter(|l| l.is_finite()).map(Control::Volume),
        _ => None,
    }
}

/// CLI user interface for interacting with the application
pub struct Cli {
    pub args: Args,
}

impl Cli {
    /// Create a new CLI instance
    pub fn new() -> Self {
        Cli { args: Args::parse() }
    }

    pub fn display_categories(&self, categories: &[CategorySummary]) {
        print!("{}", format_categories(categories));
    }

    pub fn display_sermons(&self, sermons: &[&SermonRecord]) {
        print!("{}", format_sermons(sermons));
    }

    pub fn display_series(&self, series: &[&Series]) {
        print!("{}", format_series(series));
    }

    pub fn display_pick(&self, pick: &SundayPick<'_>) {
        println!("{}", format_pick(pick));
    }

    pub fn display_probe(&self, report: &ProbeReport, record: &SermonRecord) {
        print!("{}", format_probe(report, record));
    }

    /// One status line per published snapshot.
    pub fn display_status(&self, snapshot: &SessionSnapshot) {
        println!("{}", format_status(snapshot));
    }

    pub fn display_controls(&self) {
        println!("{}", CONTROLS_HELP);
    }

    /// Display error messages
    pub fn display_error(&self, error: &dyn Error) {
        eprintln!("Error: {}", error);
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{:.*}...", width.saturating_sub(3), text)
    } else {
        text.to_string()
    }
}

pub(super) fn format_categories(categories: &[CategorySummary]) -> String {
    let mut out = format!("{:<24} {:<32} {}\n", "Key", "Category", "Sermons");
    out.push_str(&"-".repeat(66));
    out.push('\n');
    for c in categories {
        out.push_str(&format!("{:<24} {:<32} {}\n", c.key, truncate(&c.name, 32), c.count));
    }
    out
}

pub(super) fn format_sermons(sermons: &[&SermonRecord]) -> String {
    let mut out = format!("{:<28} {:<w$} {:>8}  {}\n", "ID", "Title", "Length", "Date", w = TITLE_WIDTH);
    out.push_str(&"-".repeat(96));
    out.push('\n');
    for s in sermons {
        let length = s.known_duration_text.as_deref().and_then(format_minutes).unwrap_or_default();
        let date = s.liturgical_date.as_deref().map(format_date_ro).unwrap_or_default();
        let marker = if s.is_playable() { "" } else { " (fără audio)" };
        out.push_str(&format!(
            "{:<28} {:<w$} {:>8}  {}{}\n",
            s.id,
            truncate(&s.title, TITLE_WIDTH),
            length,
            date,
            marker,
            w = TITLE_WIDTH
        ));
    }
    out
}

pub(super) fn format_series(series: &[&Series]) -> String {
    let mut out = String::new();
    for s in series {
        out.push_str(&format!("{} [{}] - {} predici\n", s.name, s.id, s.sermons.len()));
        for (i, sermon) in s.sermons.iter().enumerate() {
            let part = sermon.part_number.map(|p| p as usize).unwrap_or(i + 1);
            out.push_str(&format!("  {:>2}. {}\n", part, sermon.title));
        }
    }
    out
}

pub(super) fn format_pick(pick: &SundayPick<'_>) -> String {
    let date = format_date_ro(&pick.date.format("%Y-%m-%d").to_string());
    match pick.sermon {
        Some(s) => format!("{} ({}): {} [{}]", pick.label, date, s.title, s.id),
        None => format!("{} ({}): nicio predică în arhivă", pick.label, date),
    }
}

pub(super) fn format_probe(report: &ProbeReport, record: &SermonRecord) -> String {
    let mut out = format!("{}\n  HTTP {}\n", report.url, report.status);
    let ranges = if report.supports_ranges() { "yes" } else { "NO" };
    out.push_str(&format!("  Byte ranges: {} (Accept-Ranges {:?}, Content-Range {:?})\n", ranges, report.accept_ranges, report.content_range));
    if let Some(total) = report.total_bytes {
        out.push_str(&format!("  Size: {} bytes\n", total));
    }
    match (&report.decoder, &report.decoder_error) {
        (Some(info), _) => {
            out.push_str(&format!(
                "  Codec: {} {} Hz, {} ch\n",
                info.codec.as_deref().unwrap_or("?"),
                info.sample_rate.map(|r| r.to_string()).unwrap_or_else(|| "?".to_string()),
                info.channels.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string())
            ));
            let reported = info.reported_duration.map(format_clock).unwrap_or_else(|| "unknown".to_string());
            out.push_str(&format!("  Decoder duration: {}\n", reported));
        }
        (None, Some(err)) => out.push_str(&format!("  Decoder: {}\n", err)),
        (None, None) => {}
    }
    let catalog = record.known_duration_secs().map(format_clock).unwrap_or_else(|| "none".to_string());
    out.push_str(&format!("  Catalog duration: {}\n", catalog));
    out
}

fn state_label(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Idle => "Oprit",
        PlaybackState::Loading => "Se încarcă",
        PlaybackState::Ready => "Pregătit",
        PlaybackState::Playing => "Redare",
        PlaybackState::Paused => "Pauză",
        PlaybackState::Ended => "Terminat",
        PlaybackState::Errored => "Eroare",
    }
}

pub(super) fn format_status(snapshot: &SessionSnapshot) -> String {
    let title = snapshot.current_record.as_ref().map(|r| truncate(&r.title, TITLE_WIDTH)).unwrap_or_default();
    let duration = snapshot.display_duration().map(format_clock).unwrap_or_else(|| "--:--".to_string());
    let mut line = format!(
        "[{}] {} {} / {} x{} vol {:.0}%",
        state_label(snapshot.playback_state),
        title,
        format_clock(snapshot.position_seconds),
        duration,
        snapshot.playback_rate,
        snapshot.volume * 100.0
    );
    if snapshot.is_buffering && snapshot.playback_state != PlaybackState::Errored {
        line.push_str(" (buffering)");
    }
    if let Some(message) = snapshot.error_message() {
        line.push_str(" - ");
        line.push_str(message);
    }
    line
}
