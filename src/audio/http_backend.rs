// src/audio/http_backend.rs
//! Headless streaming backend.
//!
//! Streams the audio URL over HTTP, reads the container header for a decoder
//! duration, reports buffering the way a media element does and drives a playback
//! clock. It renders no sound; it lets the session run end to end against the real
//! file server.

use crate::audio::error::{AudioError, PlaybackError};
use crate::audio::probe::decoder_info;
use crate::audio::resource::{EventSink, MediaBackend, MediaResource, ResourceEvent};
use futures_util::StreamExt;
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

const LOG_TARGET: &str = "sermon_stream::audio::http_backend";

/// Tuning for [`HttpBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Bytes to buffer before signalling can-play-through.
    pub ready_buffer_bytes: usize,
    /// Bytes handed to the container probe.
    pub probe_bytes: usize,
    /// Playback clock resolution.
    pub tick: Duration,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            ready_buffer_bytes: 256 * 1024,
            probe_bytes: 64 * 1024,
            tick: Duration::from_millis(250),
        }
    }
}

/// Opens [`HttpResource`]s sharing one HTTP client.
pub struct HttpBackend {
    client: Client,
    config: HttpBackendConfig,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|e| {
                warn!(target: LOG_TARGET, "Error creating HTTP client: {:?}. Falling back to default.", e);
                Client::new()
            });
        Self { client, config }
    }
}

impl MediaBackend for HttpBackend {
    fn open(&mut self, url: &str, sink: EventSink) -> Box<dyn MediaResource> {
        info!(target: LOG_TARGET, url = %url, record_id = %sink.token().record_id, "Opening HTTP audio resource");
        Box::new(HttpResource::start(self.client.clone(), url.to_string(), sink, self.config.clone()))
    }
}

#[derive(Debug, Default)]
pub(super) struct ClockState {
    pub(super) buffered_bytes: u64,
    pub(super) total_bytes: Option<u64>,
    pub(super) download_complete: bool,
    pub(super) failed: bool,
    pub(super) duration: Option<f64>,
    pub(super) position: f64,
    pub(super) rate: f32,
    pub(super) volume: f32,
    pub(super) playing: bool,
    pub(super) stalled: bool,
}

impl ClockState {
    /// Seconds of audio available, estimated from the byte ratio.
    pub(super) fn buffered_seconds(&self) -> Option<f64> {
        if self.download_complete {
            return self.duration;
        }
        match (self.duration, self.total_bytes) {
            (Some(d), Some(total)) if total > 0 => Some(d * self.buffered_bytes as f64 / total as f64),
            _ => None,
        }
    }
}

pub(super) type SharedClock = Arc<Mutex<ClockState>>;

fn lock(shared: &SharedClock) -> MutexGuard<'_, ClockState> {
    match shared.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// One streamed sermon: a download task and a clock task.
pub struct HttpResource {
    pub(super) shared: SharedClock,
    pub(super) sink: EventSink,
    pub(super) download_task: Option<JoinHandle<()>>,
    pub(super) clock_task: Option<JoinHandle<()>>,
}

impl HttpResource {
    fn start(client: Client, url: String, sink: EventSink, config: HttpBackendConfig) -> Self {
        let shared: SharedClock = Arc::new(Mutex::new(ClockState { rate: 1.0, volume: 1.0, ..Default::default() }));

        let download_task = tokio::spawn(download(client, url, sink.clone(), shared.clone(), config.clone()));
        let clock_task = tokio::spawn(run_clock(sink.clone(), shared.clone(), config.tick));

        Self {
            shared,
            sink,
            download_task: Some(download_task),
            clock_task: Some(clock_task),
        }
    }
}

impl MediaResource for HttpResource {
    fn request_play(&mut self) {
        let mut state = lock(&self.shared);
        if state.failed {
            drop(state);
            self.sink.emit(ResourceEvent::Error(PlaybackError::PlaybackRejected(
                "resource failed to load".to_string(),
            )));
            return;
        }
        if let Some(d) = state.duration {
            if state.position >= d {
                state.position = 0.0;
            }
        }
        state.playing = true;
        drop(state);
        self.sink.emit(ResourceEvent::Playing);
    }

    fn pause(&mut self) {
        let was_playing = std::mem::replace(&mut lock(&self.shared).playing, false);
        if was_playing {
            self.sink.emit(ResourceEvent::Paused);
        }
    }

    fn seek(&mut self, seconds: f64) {
        let position = {
            let mut state = lock(&self.shared);
            state.position = seconds.max(0.0);
            state.position
        };
        self.sink.emit(ResourceEvent::TimeUpdate(position));
    }

    fn set_volume(&mut self, level: f32) {
        lock(&self.shared).volume = level;
        self.sink.emit(ResourceEvent::VolumeChanged(level));
    }

    fn set_playback_rate(&mut self, rate: f32) {
        lock(&self.shared).rate = rate;
        self.sink.emit(ResourceEvent::RateChanged(rate));
    }

    fn teardown(&mut self) {
        lock(&self.shared).playing = false;
        if let Some(handle) = self.clock_task.take() {
            handle.abort();
        }
        if let Some(handle) = self.download_task.take() {
            handle.abort();
            debug!(target: LOG_TARGET, record_id = %self.sink.token().record_id, "HTTP resource torn down");
        }
    }
}

impl Drop for HttpResource {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn fail(sink: &EventSink, shared: &SharedClock, err: PlaybackError) {
    error!(target: LOG_TARGET, record_id = %sink.token().record_id, "Audio resource failed: {}", err);
    lock(shared).failed = true;
    sink.emit(ResourceEvent::Error(err));
}

async fn download(client: Client, url: String, sink: EventSink, shared: SharedClock, config: HttpBackendConfig) {
    sink.emit(ResourceEvent::LoadStarted);

    let response = match client.get(&url).send().await {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => return fail(&sink, &shared, AudioError::HttpStatus(r.status().as_u16()).into()),
        Err(e) => return fail(&sink, &shared, AudioError::from(e).into()),
    };
    lock(&shared).total_bytes = response.content_length();

    let mut stream = response.bytes_stream();
    let mut prefix: Vec<u8> = Vec::with_capacity(config.probe_bytes);
    let mut probed = false;
    let mut signalled = false;

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => return fail(&sink, &shared, AudioError::from(e).into()),
        };
        let buffered = {
            let mut state = lock(&shared);
            state.buffered_bytes += chunk.len() as u64;
            state.buffered_bytes
        };
        trace!(target: LOG_TARGET, "Downloaded {} bytes (total {})", chunk.len(), buffered);

        if !probed {
            prefix.extend_from_slice(&chunk);
            if prefix.len() >= config.probe_bytes {
                probed = true;
                if !probe_prefix(std::mem::take(&mut prefix), &url, &sink, &shared).await {
                    return;
                }
                sink.emit(ResourceEvent::CanPlay);
            }
        }

        if !signalled && buffered >= config.ready_buffer_bytes as u64 {
            signalled = true;
            sink.emit(ResourceEvent::CanPlayThrough);
        }
    }

    lock(&shared).download_complete = true;
    info!(target: LOG_TARGET, record_id = %sink.token().record_id, "Download complete");

    if !probed {
        if !probe_prefix(prefix, &url, &sink, &shared).await {
            return;
        }
        sink.emit(ResourceEvent::CanPlay);
    }
    if !signalled {
        sink.emit(ResourceEvent::CanPlayThrough);
    }
}

/// Reads the container header. Returns false when the format is unusable.
async fn probe_prefix(bytes: Vec<u8>, url: &str, sink: &EventSink, shared: &SharedClock) -> bool {
    let hint = url.to_string();
    let result = match task::spawn_blocking(move || decoder_info(bytes, &hint)).await {
        Ok(result) => result,
        Err(e) => Err(AudioError::from(e)),
    };
    match result {
        Ok(info) => {
            debug!(target: LOG_TARGET, ?info, "Container header read");
            if let Some(duration) = info.reported_duration {
                lock(shared).duration = Some(duration);
                sink.emit(ResourceEvent::DurationChanged(duration));
            }
            true
        }
        Err(AudioError::SymphoniaError(symphonia::core::errors::Error::IoError(e))) => {
            // short prefix; the header may still be fine, only the duration stays unknown
            warn!(target: LOG_TARGET, "Container probe ran out of data: {}", e);
            true
        }
        Err(e) => {
            fail(sink, shared, e.into());
            false
        }
    }
}

pub(super) async fn run_clock(sink: EventSink, shared: SharedClock, tick: Duration) {
    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let event = {
            let mut state = lock(&shared);
            if !state.playing {
                continue;
            }

            if let Some(available) = state.buffered_seconds() {
                if !state.download_complete && state.position >= available {
                    if !state.stalled {
                        state.stalled = true;
                        Some(ResourceEvent::Waiting)
                    } else {
                        None
                    }
                } else {
                    state.stalled = false;
                    advance(&mut state, tick)
                }
            } else {
                advance(&mut state, tick)
            }
        };

        if let Some(event) = event {
            sink.emit(event);
        }
    }
}

pub(super) fn advance(state: &mut ClockState, tick: Duration) -> Option<ResourceEvent> {
    state.position += tick.as_secs_f64() * state.rate as f64;
    match state.duration {
        Some(d) if state.download_complete && state.position >= d => {
            state.position = d;
            state.playing = false;
            Some(ResourceEvent::Ended)
        }
        _ => Some(ResourceEvent::TimeUpdate(state.position)),
    }
}
