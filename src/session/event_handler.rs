use super::{AudioSession, PlaybackState, SESSION_LOG_TARGET};
use crate::audio::{GateOutcome, Readiness, ResourceEvent, ResourceToken};
use tracing::{debug, info, trace, warn};

/// Applies a resource notification, provided it comes from the current resource.
///
/// Events from a superseded resource are dropped here. Nothing about callback
/// ordering is trusted: only the token decides.
pub(super) fn handle_resource_event(session: &mut AudioSession, token: ResourceToken, event: ResourceEvent) {
    if !session.is_current(&token) {
        trace!(target: SESSION_LOG_TARGET, generation = token.generation, record_id = %token.record_id, ?event, "Ignoring event from superseded resource.");
        return;
    }

    let snapshot = &mut session.snapshot;
    match event {
        ResourceEvent::LoadStarted => {
            snapshot.is_buffering = true;
        }
        ResourceEvent::CanPlay => {
            debug!(target: SESSION_LOG_TARGET, "Resource can start playing.");
        }
        ResourceEvent::CanPlayThrough => {
            snapshot.is_buffering = false;
            session.gate.signal(&token);
        }
        ResourceEvent::Playing => match snapshot.playback_state {
            PlaybackState::Loading | PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Ended => {
                info!(target: SESSION_LOG_TARGET, record_id = %token.record_id, "Playback started.");
                snapshot.playback_state = PlaybackState::Playing;
                snapshot.is_buffering = false;
                session.play_requested = false;
            }
            PlaybackState::Playing => {}
            PlaybackState::Idle | PlaybackState::Errored => {
                debug!(target: SESSION_LOG_TARGET, state = ?snapshot.playback_state, "Ignoring playing notification.");
            }
        },
        ResourceEvent::Paused => {
            if snapshot.playback_state == PlaybackState::Playing {
                info!(target: SESSION_LOG_TARGET, "Playback paused by the platform.");
                snapshot.playback_state = PlaybackState::Paused;
            }
        }
        ResourceEvent::Waiting => {
            debug!(target: SESSION_LOG_TARGET, position = snapshot.position_seconds, "Buffering...");
            snapshot.is_buffering = true;
        }
        ResourceEvent::TimeUpdate(position) => {
            if !position.is_finite() || snapshot.playback_state == PlaybackState::Ended {
                return;
            }
            snapshot.position_seconds = position.max(0.0);
            if snapshot.playback_state == PlaybackState::Playing {
                snapshot.is_buffering = false;
            }
        }
        ResourceEvent::DurationChanged(duration) => {
            if duration.is_finite() && duration > 0.0 {
                debug!(target: SESSION_LOG_TARGET, duration, authoritative = ?snapshot.authoritative_duration_seconds, "Decoder duration changed.");
                snapshot.reported_duration_seconds = Some(duration);
            }
        }
        ResourceEvent::VolumeChanged(level) => {
            if level.is_finite() {
                snapshot.volume = level.clamp(0.0, 1.0);
            }
        }
        ResourceEvent::RateChanged(rate) => {
            if rate.is_finite() && rate > 0.0 {
                snapshot.playback_rate = rate;
            }
        }
        ResourceEvent::Ended => match snapshot.playback_state {
            PlaybackState::Playing | PlaybackState::Paused => {
                info!(target: SESSION_LOG_TARGET, record_id = %token.record_id, "Reached end of stream.");
                snapshot.playback_state = PlaybackState::Ended;
                snapshot.position_seconds = 0.0;
                snapshot.is_buffering = false;
                if let Some(resource) = session.resource.as_mut() {
                    resource.seek(0.0);
                }
            }
            _ => {
                debug!(target: SESSION_LOG_TARGET, state = ?snapshot.playback_state, "Ignoring end of stream.");
            }
        },
        ResourceEvent::Error(err) => {
            if !err.is_fatal_for_track() {
                debug!(target: SESSION_LOG_TARGET, "Recoverable resource error: {}", err);
                return;
            }
            warn!(target: SESSION_LOG_TARGET, record_id = %token.record_id, "Playback error: {}", err);
            snapshot.playback_state = PlaybackState::Errored;
            snapshot.last_error = Some(err);
            snapshot.is_buffering = false;
            session.gate.cancel();
            session.play_on_ready = false;
            session.play_requested = false;
        }
    }

    session.publish();
}

/// Starts playback once the readiness gate for the current load resolves.
pub(super) fn handle_gate_resolved(session: &mut AudioSession, outcome: GateOutcome) {
    if !session.is_current(&outcome.token) {
        trace!(target: SESSION_LOG_TARGET, generation = outcome.token.generation, "Ignoring gate outcome for superseded load.");
        return;
    }
    session.gate.settle(&outcome.token);

    if session.snapshot.playback_state != PlaybackState::Loading {
        debug!(target: SESSION_LOG_TARGET, state = ?session.snapshot.playback_state, "Gate resolved outside loading; nothing to start.");
        return;
    }

    if outcome.readiness == Readiness::TimedOut {
        warn!(target: SESSION_LOG_TARGET, record_id = %outcome.token.record_id, "Starting without a full buffer; playback may stutter.");
    }

    if session.play_on_ready {
        if let Some(resource) = session.resource.as_mut() {
            debug!(target: SESSION_LOG_TARGET, "Gate open, requesting playback start.");
            session.play_requested = true;
            resource.request_play();
        }
    } else {
        info!(target: SESSION_LOG_TARGET, "Gate open while paused; ready to play.");
        session.snapshot.playback_state = PlaybackState::Ready;
        session.snapshot.is_buffering = false;
        session.publish();
    }
}
