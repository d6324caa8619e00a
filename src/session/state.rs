use crate::audio::PlaybackError;
use crate::catalog::SermonRecord;
use tokio::sync::oneshot;

/// Discrete playback speeds, cycled in order.
pub const PLAYBACK_RATES: [f32; 3] = [1.0, 1.5, 2.0];

/// Rate following `current` in [`PLAYBACK_RATES`]; an unknown rate restarts the cycle.
pub fn next_playback_rate(current: f32) -> f32 {
    match PLAYBACK_RATES.iter().position(|r| (r - current).abs() < f32::EPSILON) {
        Some(idx) => PLAYBACK_RATES[(idx + 1) % PLAYBACK_RATES.len()],
        None => PLAYBACK_RATES[0],
    }
}

/// Lifecycle of the session's single playback resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    /// Resource created, waiting on the readiness gate or on the play request.
    Loading,
    /// Buffered but not started, because the listener paused while loading.
    Ready,
    Playing,
    Paused,
    Ended,
    Errored,
}

/// The one state object every presentation surface renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub current_record: Option<SermonRecord>,
    pub playback_state: PlaybackState,
    pub position_seconds: f64,
    /// Live decoder value; may start wrong and be corrected as data arrives.
    pub reported_duration_seconds: Option<f64>,
    /// Parsed once from the catalog, fixed for the record's lifetime.
    pub authoritative_duration_seconds: Option<f64>,
    pub volume: f32,
    pub playback_rate: f32,
    pub is_buffering: bool,
    pub last_error: Option<PlaybackError>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            current_record: None,
            playback_state: PlaybackState::Idle,
            position_seconds: 0.0,
            reported_duration_seconds: None,
            authoritative_duration_seconds: None,
            volume: 1.0,
            playback_rate: PLAYBACK_RATES[0],
            is_buffering: false,
            last_error: None,
        }
    }
}

impl SessionSnapshot {
    /// Duration for display and progress scaling: the catalog value when present,
    /// otherwise whatever the decoder reports.
    pub fn display_duration(&self) -> Option<f64> {
        self.authoritative_duration_seconds
            .or(self.reported_duration_seconds)
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    /// Position as a fraction of [`display_duration`](Self::display_duration), in `[0, 1]`.
    pub fn progress_fraction(&self) -> f64 {
        match self.display_duration() {
            Some(d) => (self.position_seconds / d).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback_state == PlaybackState::Playing
    }

    pub fn is_loading(&self) -> bool {
        self.playback_state == PlaybackState::Loading
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_record.as_ref().map(|r| r.id.as_str())
    }

    /// Localized message to show while errored.
    pub fn error_message(&self) -> Option<&'static str> {
        match self.playback_state {
            PlaybackState::Errored => self.last_error.as_ref().map(PlaybackError::user_message),
            _ => None,
        }
    }
}

/// Commands that can be sent to the session task.
#[derive(Debug)]
pub enum SessionCommand {
    LoadSermon(SermonRecord),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
    CyclePlaybackRate,
    SkipForward(f64),
    SkipBackward(f64),
    CloseSession,
    GetSnapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}
