use std::error::Error;
use std::fmt;

/// Errors returned synchronously by [`SessionHandle`](super::SessionHandle).
///
/// Runtime playback failures never show up here; they become state transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The record has no audio URL. Callers must filter these out before selection.
    NotPlayable(String),
    /// The session task is no longer running.
    SessionClosed,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotPlayable(id) => write!(f, "Sermon '{}' has no audio file", id),
            SessionError::SessionClosed => write!(f, "Audio session is closed"),
        }
    }
}

impl Error for SessionError {}
