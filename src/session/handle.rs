use super::{SessionCommand, SessionError, SessionSnapshot};
use crate::catalog::SermonRecord;
use tokio::sync::{mpsc, oneshot, watch};

/// Cloneable entry point to the session, shared by every presentation surface.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    state_rx: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub(super) fn new(command_tx: mpsc::Sender<SessionCommand>, state_rx: watch::Receiver<SessionSnapshot>) -> Self {
        Self { command_tx, state_rx }
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.command_tx.send(command).await.map_err(|_| SessionError::SessionClosed)
    }

    /// Replaces whatever is loaded with `record` and starts it once buffered.
    ///
    /// A record without an audio URL is a caller bug and is rejected here.
    pub async fn load_sermon(&self, record: SermonRecord) -> Result<(), SessionError> {
        if !record.is_playable() {
            return Err(SessionError::NotPlayable(record.id));
        }
        self.send(SessionCommand::LoadSermon(record)).await
    }

    pub async fn play(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Play).await
    }

    pub async fn pause(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Pause).await
    }

    /// Seeks to `seconds`, clamped to the track.
    pub async fn seek(&self, seconds: f64) -> Result<(), SessionError> {
        self.send(SessionCommand::Seek(seconds)).await
    }

    /// Sets the output level, clamped to `[0, 1]`.
    pub async fn set_volume(&self, level: f32) -> Result<(), SessionError> {
        self.send(SessionCommand::SetVolume(level)).await
    }

    pub async fn cycle_playback_rate(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::CyclePlaybackRate).await
    }

    pub async fn skip_forward(&self, seconds: f64) -> Result<(), SessionError> {
        self.send(SessionCommand::SkipForward(seconds)).await
    }

    pub async fn skip_backward(&self, seconds: f64) -> Result<(), SessionError> {
        self.send(SessionCommand::SkipBackward(seconds)).await
    }

    /// Tears the resource down and returns the session to idle.
    pub async fn close_session(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::CloseSession).await
    }

    /// Stops the session task. Other handles will see [`SessionError::SessionClosed`].
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown).await
    }

    /// Snapshot taken after every previously sent command has been handled.
    pub async fn fetch_snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::GetSnapshot(tx)).await?;
        rx.await.map_err(|_| SessionError::SessionClosed)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state_rx.borrow().clone()
    }

    /// A receiver that wakes on every published change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_rx.clone()
    }
}
