//! The seam between the session and whatever actually fetches and renders audio.
//!
//! A backend opens one resource per loaded sermon. Resources never touch session
//! state: everything they observe flows back as [`ResourceEvent`]s through the
//! [`EventSink`] they were opened with, tagged with the token of the load that
//! created them.

use crate::audio::error::PlaybackError;
use tokio::sync::mpsc;
use tracing::trace;

const LOG_TARGET: &str = "sermon_stream::audio::resource";

/// Identifies one resource lifetime: the load generation plus the record it plays.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceToken {
    pub generation: u64,
    pub record_id: String,
}

/// Notifications a resource delivers about itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent {
    LoadStarted,
    /// Enough data to start, not necessarily to play through.
    CanPlay,
    /// Enough data buffered to play through without further waiting.
    CanPlayThrough,
    /// A play request succeeded and output has started.
    Playing,
    /// Output stopped, whoever asked for it.
    Paused,
    /// Buffer ran dry during playback.
    Waiting,
    TimeUpdate(f64),
    /// Decoder-reported duration; may change as more data arrives.
    DurationChanged(f64),
    VolumeChanged(f32),
    RateChanged(f32),
    Ended,
    Error(PlaybackError),
}

/// Message carried on the session's resource event channel.
pub type TaggedEvent = (ResourceToken, ResourceEvent);

/// Write end of the session's event channel, bound to a single resource.
#[derive(Debug, Clone)]
pub struct EventSink {
    token: ResourceToken,
    tx: mpsc::UnboundedSender<TaggedEvent>,
}

impl EventSink {
    pub fn new(token: ResourceToken, tx: mpsc::UnboundedSender<TaggedEvent>) -> Self {
        Self { token, tx }
    }

    pub fn token(&self) -> &ResourceToken {
        &self.token
    }

    /// Delivers an event. Dropped silently once the session is gone.
    pub fn emit(&self, event: ResourceEvent) {
        trace!(target: LOG_TARGET, generation = self.token.generation, record_id = %self.token.record_id, ?event, "Resource event");
        let _ = self.tx.send((self.token.clone(), event));
    }
}

/// One open audio resource. Requests are fire-and-forget; outcomes arrive as events.
pub trait MediaResource: Send {
    /// Asks the platform to start output. Answers with `Playing` or `Error(PlaybackRejected | ...)`.
    fn request_play(&mut self);

    fn pause(&mut self);

    fn seek(&mut self, seconds: f64);

    fn set_volume(&mut self, level: f32);

    fn set_playback_rate(&mut self, rate: f32);

    /// Silences and releases the resource. Must take effect before returning.
    fn teardown(&mut self);
}

/// Opens audio resources for the session.
pub trait MediaBackend: Send {
    /// Creates a resource for `url` and starts buffering it.
    fn open(&mut self, url: &str, sink: EventSink) -> Box<dyn MediaResource>;
}
