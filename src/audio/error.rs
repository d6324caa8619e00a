use std::error::Error;
use std::fmt;
use std::io;
use symphonia::core::errors::Error as SymphoniaError;

/// Playback failures as seen by the session and its listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// Fetching the audio resource failed.
    Network(String),
    /// Unsupported or corrupt audio format.
    Decode(String),
    /// The platform refused to start playback.
    PlaybackRejected(String),
    /// Seek target outside the track; clamped, never surfaced to listeners.
    InvalidSeek(f64),
}

impl PlaybackError {
    /// Short message shown next to the current sermon while the session is errored.
    pub fn user_message(&self) -> &'static str {
        match self {
            PlaybackError::Network(_) => "Predica nu a putut fi descărcată. Verificați conexiunea.",
            PlaybackError::Decode(_) => "Formatul audio nu este suportat.",
            PlaybackError::PlaybackRejected(_) => "Redarea a fost blocată. Apăsați din nou pe redare.",
            PlaybackError::InvalidSeek(_) => "Poziție invalidă.",
        }
    }

    /// Whether this error moves the session into `Errored`.
    pub fn is_fatal_for_track(&self) -> bool {
        !matches!(self, PlaybackError::InvalidSeek(_))
    }
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::Network(e) => write!(f, "Network error: {}", e),
            PlaybackError::Decode(e) => write!(f, "Decoding error: {}", e),
            PlaybackError::PlaybackRejected(e) => write!(f, "Playback rejected: {}", e),
            PlaybackError::InvalidSeek(s) => write!(f, "Invalid seek position: {}", s),
        }
    }
}

impl Error for PlaybackError {}

/// Low-level failures of the streaming backend and the probe.
#[derive(Debug)]
pub enum AudioError {
    NetworkError(reqwest::Error),
    HttpStatus(u16),
    /// The file server answered a range request without honouring it.
    RangeNotSupported(String),
    SymphoniaError(SymphoniaError),
    UnsupportedFormat(String),
    IoError(io::Error),
    TaskJoinError(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NetworkError(e) => write!(f, "Network error: {}", e),
            AudioError::HttpStatus(code) => write!(f, "Unexpected HTTP status: {}", code),
            AudioError::RangeNotSupported(s) => write!(f, "Range requests not supported: {}", s),
            AudioError::SymphoniaError(e) => write!(f, "Symphonia error: {}", e),
            AudioError::UnsupportedFormat(s) => write!(f, "Unsupported format: {}", s),
            AudioError::IoError(e) => write!(f, "I/O error: {}", e),
            AudioError::TaskJoinError(e) => write!(f, "Async task join error: {}", e),
        }
    }
}

impl Error for AudioError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AudioError::NetworkError(e) => Some(e),
            AudioError::SymphoniaError(e) => Some(e),
            AudioError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AudioError {
    fn from(e: reqwest::Error) -> Self {
        AudioError::NetworkError(e)
    }
}

impl From<SymphoniaError> for AudioError {
    fn from(e: SymphoniaError) -> Self {
        AudioError::SymphoniaError(e)
    }
}

impl From<io::Error> for AudioError {
    fn from(e: io::Error) -> Self {
        AudioError::IoError(e)
    }
}

impl From<tokio::task::JoinError> for AudioError {
    fn from(e: tokio::task::JoinError) -> Self {
        AudioError::TaskJoinError(e.to_string())
    }
}

impl From<AudioError> for PlaybackError {
    fn from(e: AudioError) -> Self {
        match e {
            AudioError::NetworkError(_) | AudioError::HttpStatus(_) | AudioError::RangeNotSupported(_) | AudioError::IoError(_) => {
                PlaybackError::Network(e.to_string())
            }
            AudioError::SymphoniaError(_) | AudioError::UnsupportedFormat(_) => PlaybackError::Decode(e.to_string()),
            AudioError::TaskJoinError(_) => PlaybackError::PlaybackRejected(e.to_string()),
        }
    }
}
