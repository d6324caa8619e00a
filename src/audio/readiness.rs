//! Playback readiness gate.
//!
//! Starting a compressed stream before enough of it is buffered stutters or appears
//! to loop on slow connections. The gate holds the start back until the resource
//! reports it can play through, or until the timeout elapses, whichever comes first.
//! The timeout is a tunable fallback: when it fires playback is attempted anyway and
//! may stutter. That degraded mode is accepted, not an error.

use crate::audio::resource::ResourceToken;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "sermon_stream::audio::readiness";

pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_millis(5000);

/// How a readiness wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The resource signalled it can play through.
    Buffered,
    /// No signal within the timeout; playback will be attempted regardless.
    TimedOut,
    /// The signal source went away before resolving.
    Cancelled,
}

/// Resolution of an armed gate, tagged with the load it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    pub token: ResourceToken,
    pub readiness: Readiness,
}

/// Waits for `signal` or `timeout`, whichever first.
pub async fn await_ready(signal: oneshot::Receiver<()>, timeout: Duration) -> Readiness {
    match tokio::time::timeout(timeout, signal).await {
        Ok(Ok(())) => Readiness::Buffered,
        Ok(Err(_)) => Readiness::Cancelled,
        Err(_) => Readiness::TimedOut,
    }
}

struct ArmedGate {
    token: ResourceToken,
    signal_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

/// Owns the single in-flight readiness wait of a session.
pub struct ReadinessGate {
    timeout: Duration,
    outcome_tx: mpsc::UnboundedSender<GateOutcome>,
    armed: Option<ArmedGate>,
}

impl ReadinessGate {
    pub fn new(timeout: Duration, outcome_tx: mpsc::UnboundedSender<GateOutcome>) -> Self {
        Self { timeout, outcome_tx, armed: None }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Starts a wait for `token`, discarding any previous one.
    pub fn arm(&mut self, token: ResourceToken) {
        self.cancel();

        let (signal_tx, signal_rx) = oneshot::channel();
        let outcome_tx = self.outcome_tx.clone();
        let timeout = self.timeout;
        let task_token = token.clone();
        debug!(target: LOG_TARGET, generation = token.generation, record_id = %token.record_id, ?timeout, "Arming readiness gate");

        let task = tokio::spawn(async move {
            let readiness = await_ready(signal_rx, timeout).await;
            match readiness {
                Readiness::Buffered => {
                    info!(target: LOG_TARGET, record_id = %task_token.record_id, "Enough data buffered, releasing playback");
                }
                Readiness::TimedOut => {
                    warn!(target: LOG_TARGET, record_id = %task_token.record_id, ?timeout, "Timed out waiting for buffer, attempting playback anyway");
                }
                Readiness::Cancelled => {
                    debug!(target: LOG_TARGET, record_id = %task_token.record_id, "Readiness wait cancelled");
                    return;
                }
            }
            let _ = outcome_tx.send(GateOutcome { token: task_token, readiness });
        });

        self.armed = Some(ArmedGate { token, signal_tx: Some(signal_tx), task });
    }

    /// Forwards a can-play-through signal. Returns false when no wait for `token` is armed.
    pub fn signal(&mut self, token: &ResourceToken) -> bool {
        match self.armed.as_mut() {
            Some(armed) if &armed.token == token => match armed.signal_tx.take() {
                Some(tx) => tx.send(()).is_ok(),
                None => false,
            },
            _ => false,
        }
    }

    /// Whether a wait for `token` is still pending.
    pub fn is_armed_for(&self, token: &ResourceToken) -> bool {
        self.armed.as_ref().map_or(false, |a| &a.token == token)
    }

    /// Forgets the wait for `token` once its outcome has been consumed.
    pub fn settle(&mut self, token: &ResourceToken) {
        if self.armed.as_ref().map_or(false, |a| &a.token == token) {
            self.armed = None;
        }
    }

    /// Drops the in-flight wait, if any. Its outcome will never be delivered.
    pub fn cancel(&mut self) {
        if let Some(armed) = self.armed.take() {
            debug!(target: LOG_TARGET, generation = armed.token.generation, "Cancelling readiness gate");
            armed.task.abort();
        }
    }
}

impl Drop for ReadinessGate {
    fn drop(&mut self) {
        self.cancel();
    }
}
