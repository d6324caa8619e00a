//! Audio session controller: owns the single playback resource and its state machine.
//!
//! Exactly one [`AudioSession`] runs per process. Presentation surfaces talk to it
//! through cloned [`SessionHandle`]s and observe it through the published
//! [`SessionSnapshot`]; none of them ever holds a resource of its own.

use crate::audio::{GateOutcome, MediaBackend, MediaResource, ReadinessGate, ResourceToken, TaggedEvent, DEFAULT_READINESS_TIMEOUT};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace};

mod command_handler;
mod error;
mod event_handler;
mod handle;
mod run_loop;
mod state;

pub use error::SessionError;
pub use handle::SessionHandle;
pub use state::{next_playback_rate, PlaybackState, SessionCommand, SessionSnapshot, PLAYBACK_RATES};

const SESSION_LOG_TARGET: &str = "sermon_stream::session";

/// Construction options for [`AudioSession`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub readiness_timeout: Duration,
    pub initial_volume: f32,
    pub command_buffer_size: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            readiness_timeout: DEFAULT_READINESS_TIMEOUT,
            initial_volume: 1.0,
            command_buffer_size: 32,
        }
    }
}

/// The playback session. All mutation happens on its own task, one message at a time.
pub struct AudioSession {
    // --- Audio Backend ---
    backend: Box<dyn MediaBackend>,
    resource: Option<Box<dyn MediaResource>>,
    current_token: Option<ResourceToken>,
    next_generation: u64,

    // --- Start policy ---
    play_on_ready: bool,
    play_requested: bool,

    // --- State ---
    snapshot: SessionSnapshot,
    state_tx: watch::Sender<SessionSnapshot>,

    // --- Communication ---
    command_rx: mpsc::Receiver<SessionCommand>,
    event_tx: mpsc::UnboundedSender<TaggedEvent>,
    event_rx: mpsc::UnboundedReceiver<TaggedEvent>,
    gate: ReadinessGate,
    gate_rx: mpsc::UnboundedReceiver<GateOutcome>,
}

impl AudioSession {
    /// Creates the session and the handle surfaces use to reach it.
    /// Run the session with [`AudioSession::run`] or [`AudioSession::spawn`].
    pub fn new(backend: Box<dyn MediaBackend>, options: SessionOptions) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(options.command_buffer_size.max(1));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (gate_tx, gate_rx) = mpsc::unbounded_channel();

        let snapshot = SessionSnapshot {
            volume: options.initial_volume.clamp(0.0, 1.0),
            ..Default::default()
        };
        let (state_tx, state_rx) = watch::channel(snapshot.clone());

        let session = AudioSession {
            backend,
            resource: None,
            current_token: None,
            next_generation: 0,
            play_on_ready: false,
            play_requested: false,
            snapshot,
            state_tx,
            command_rx,
            event_tx,
            event_rx,
            gate: ReadinessGate::new(options.readiness_timeout, gate_tx),
            gate_rx,
        };

        (session, SessionHandle::new(command_tx, state_rx))
    }

    /// Latest state, as published to listeners.
    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    /// Runs the session's message loop until shut down or every handle is dropped.
    #[instrument(skip(self))]
    pub async fn run(&mut self) {
        run_loop::run_session_loop(self).await;
    }

    /// Moves the session onto its own task.
    pub fn spawn(mut self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    // --- Private Helper Methods ---

    /// Publishes the current snapshot to every listener.
    fn publish(&self) {
        trace!(target: SESSION_LOG_TARGET, state = ?self.snapshot.playback_state, position = self.snapshot.position_seconds, "Publishing snapshot");
        self.state_tx.send_replace(self.snapshot.clone());
    }

    /// Whether `token` belongs to the resource currently loaded.
    fn is_current(&self, token: &ResourceToken) -> bool {
        self.current_token.as_ref() == Some(token)
    }

    /// Silences and drops the current resource and any readiness wait.
    fn teardown_resource(&mut self) {
        self.gate.cancel();
        if let Some(mut resource) = self.resource.take() {
            if let Some(token) = &self.current_token {
                debug!(target: SESSION_LOG_TARGET, generation = token.generation, record_id = %token.record_id, "Tearing down audio resource");
            }
            resource.teardown();
        }
        self.current_token = None;
        self.play_on_ready = false;
        self.play_requested = false;
    }

    /// Drains already-delivered resource events and gate outcomes without waiting.
    #[cfg(test)]
    fn pump(&mut self) {
        while let Ok((token, event)) = self.event_rx.try_recv() {
            event_handler::handle_resource_event(self, token, event);
        }
        while let Ok(outcome) = self.gate_rx.try_recv() {
            event_handler::handle_gate_resolved(self, outcome);
            while let Ok((token, event)) = self.event_rx.try_recv() {
                event_handler::handle_resource_event(self, token, event);
            }
        }
    }
}
