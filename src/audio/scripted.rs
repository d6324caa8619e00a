//! A backend driven by hand instead of by a network stream.
//!
//! Every request a resource receives is journaled, and each resource's event sink
//! stays reachable so callers can deliver buffering, progress, end-of-stream or
//! error notifications whenever they like, including late ones from resources the
//! session has already replaced.

use crate::audio::error::PlaybackError;
use crate::audio::resource::{EventSink, MediaBackend, MediaResource, ResourceEvent, ResourceToken};
use std::sync::{Arc, Mutex, MutexGuard};

/// A request as seen by a scripted resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedCall {
    Open(String),
    Play,
    Pause,
    Seek(f64),
    Volume(f32),
    Rate(f32),
    Teardown,
}

/// How scripted resources answer play requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayResponse {
    /// Emit `Playing` straight away.
    #[default]
    Accept,
    /// Emit `Error(PlaybackRejected)`.
    Reject,
    /// Say nothing; the caller emits the outcome.
    Silent,
}

#[derive(Debug, Default)]
struct Journal {
    calls: Vec<(ResourceToken, ScriptedCall)>,
    sinks: Vec<EventSink>,
    live: Vec<u64>,
    max_live: usize,
}

/// Cloneable: clones share one journal, so a test can keep a copy after handing
/// the backend to a session.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    journal: Arc<Mutex<Journal>>,
    play_response: PlayResponse,
}

fn lock(journal: &Arc<Mutex<Journal>>) -> MutexGuard<'_, Journal> {
    match journal.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_play_response(play_response: PlayResponse) -> Self {
        Self { play_response, ..Self::default() }
    }

    /// Every request so far, in order.
    pub fn calls(&self) -> Vec<(ResourceToken, ScriptedCall)> {
        lock(&self.journal).calls.clone()
    }

    /// Requests received by resources for `record_id`.
    pub fn calls_for(&self, record_id: &str) -> Vec<ScriptedCall> {
        lock(&self.journal)
            .calls
            .iter()
            .filter(|(t, _)| t.record_id == record_id)
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn opened(&self) -> usize {
        lock(&self.journal).sinks.len()
    }

    pub fn teardowns(&self) -> usize {
        lock(&self.journal).calls.iter().filter(|(_, c)| *c == ScriptedCall::Teardown).count()
    }

    /// Sink of the `index`-th resource ever opened.
    pub fn sink(&self, index: usize) -> Option<EventSink> {
        lock(&self.journal).sinks.get(index).cloned()
    }

    pub fn last_sink(&self) -> Option<EventSink> {
        lock(&self.journal).sinks.last().cloned()
    }

    /// Resources opened and not yet torn down.
    pub fn live_resources(&self) -> usize {
        lock(&self.journal).live.len()
    }

    /// Highest number of simultaneously live resources ever observed.
    pub fn max_live_resources(&self) -> usize {
        lock(&self.journal).max_live
    }
}

impl MediaBackend for ScriptedBackend {
    fn open(&mut self, url: &str, sink: EventSink) -> Box<dyn MediaResource> {
        let token = sink.token().clone();
        {
            let mut journal = lock(&self.journal);
            journal.calls.push((token.clone(), ScriptedCall::Open(url.to_string())));
            journal.sinks.push(sink.clone());
            journal.live.push(token.generation);
            journal.max_live = journal.max_live.max(journal.live.len());
        }
        sink.emit(ResourceEvent::LoadStarted);
        Box::new(ScriptedResource {
            token,
            sink,
            journal: self.journal.clone(),
            play_response: self.play_response,
            torn_down: false,
        })
    }
}

struct ScriptedResource {
    token: ResourceToken,
    sink: EventSink,
    journal: Arc<Mutex<Journal>>,
    play_response: PlayResponse,
    torn_down: bool,
}

impl ScriptedResource {
    fn record(&self, call: ScriptedCall) {
        lock(&self.journal).calls.push((self.token.clone(), call));
    }

    fn emit(&self, event: ResourceEvent) {
        if !self.torn_down {
            self.sink.emit(event);
        }
    }
}

impl MediaResource for ScriptedResource {
    fn request_play(&mut self) {
        self.record(ScriptedCall::Play);
        match self.play_response {
            PlayResponse::Accept => self.emit(ResourceEvent::Playing),
            PlayResponse::Reject => self.emit(ResourceEvent::Error(PlaybackError::PlaybackRejected(
                "autoplay blocked".to_string(),
            ))),
            PlayResponse::Silent => {}
        }
    }

    fn pause(&mut self) {
        self.record(ScriptedCall::Pause);
        self.emit(ResourceEvent::Paused);
    }

    fn seek(&mut self, seconds: f64) {
        self.record(ScriptedCall::Seek(seconds));
        self.emit(ResourceEvent::TimeUpdate(seconds));
    }

    fn set_volume(&mut self, level: f32) {
        self.record(ScriptedCall::Volume(level));
        self.emit(ResourceEvent::VolumeChanged(level));
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.record(ScriptedCall::Rate(rate));
        self.emit(ResourceEvent::RateChanged(rate));
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        let mut journal = lock(&self.journal);
        journal.calls.push((self.token.clone(), ScriptedCall::Teardown));
        let generation = self.token.generation;
        journal.live.retain(|g| *g != generation);
    }
}
