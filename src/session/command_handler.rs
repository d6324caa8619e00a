use super::{next_playback_rate, AudioSession, PlaybackState, SessionCommand, SessionSnapshot, SESSION_LOG_TARGET};
use crate::audio::{EventSink, PlaybackError, ResourceToken};
use crate::catalog::SermonRecord;
use tracing::{debug, error, info, instrument, warn};

/// Routes one command to its handler.
pub(super) fn dispatch(session: &mut AudioSession, command: SessionCommand) {
    match command {
        SessionCommand::LoadSermon(record) => handle_load_sermon(session, record),
        SessionCommand::Play => handle_play(session),
        SessionCommand::Pause => handle_pause(session),
        SessionCommand::Seek(seconds) => handle_seek(session, seconds),
        SessionCommand::SetVolume(level) => handle_set_volume(session, level),
        SessionCommand::CyclePlaybackRate => {
            handle_cycle_playback_rate(session);
        }
        SessionCommand::SkipForward(seconds) => handle_skip(session, seconds),
        SessionCommand::SkipBackward(seconds) => handle_skip(session, -seconds),
        SessionCommand::CloseSession => handle_close_session(session),
        SessionCommand::GetSnapshot(responder) => {
            let _ = responder.send(session.snapshot.clone());
        }
        SessionCommand::Shutdown => {
            // consumed by the run loop before dispatch
        }
    }
}

#[instrument(skip(session, record), fields(record_id = %record.id))]
pub(super) fn handle_load_sermon(session: &mut AudioSession, record: SermonRecord) {
    if !record.is_playable() {
        error!(target: SESSION_LOG_TARGET, "Refusing to load sermon without audio URL.");
        return;
    }

    if session.snapshot.playback_state == PlaybackState::Loading
        && session.current_token.as_ref().map(|t| t.record_id.as_str()) == Some(record.id.as_str())
    {
        info!(target: SESSION_LOG_TARGET, "Same sermon already loading, skipping.");
        return;
    }

    // The previous resource must be silent before the next one exists.
    session.teardown_resource();

    session.next_generation += 1;
    let token = ResourceToken { generation: session.next_generation, record_id: record.id.clone() };
    info!(target: SESSION_LOG_TARGET, generation = token.generation, title = %record.title, url = %record.audio_url, "Loading sermon.");

    let authoritative = record.known_duration_secs();
    if authoritative.is_none() {
        debug!(target: SESSION_LOG_TARGET, "No catalog duration, display falls back to decoder duration.");
    }

    let sink = EventSink::new(token.clone(), session.event_tx.clone());
    let mut resource = session.backend.open(&record.audio_url, sink);
    resource.set_volume(session.snapshot.volume);
    resource.set_playback_rate(session.snapshot.playback_rate);

    session.resource = Some(resource);
    session.current_token = Some(token.clone());
    session.play_on_ready = true;
    session.play_requested = false;
    session.gate.arm(token);

    session.snapshot = SessionSnapshot {
        current_record: Some(record),
        playback_state: PlaybackState::Loading,
        position_seconds: 0.0,
        reported_duration_seconds: None,
        authoritative_duration_seconds: authoritative,
        volume: session.snapshot.volume,
        playback_rate: session.snapshot.playback_rate,
        is_buffering: true,
        last_error: None,
    };
    session.publish();
}

#[instrument(skip(session), fields(state = ?session.snapshot.playback_state))]
pub(super) fn handle_play(session: &mut AudioSession) {
    match session.snapshot.playback_state {
        PlaybackState::Idle => {
            debug!(target: SESSION_LOG_TARGET, "Play: nothing loaded.");
        }
        PlaybackState::Playing => {}
        PlaybackState::Loading => {
            if !session.play_on_ready {
                debug!(target: SESSION_LOG_TARGET, "Play: re-arming automatic start.");
                session.play_on_ready = true;
            }
            // gate already resolved: nothing will start the resource but this request
            let gate_pending = session.current_token.as_ref().map_or(false, |t| session.gate.is_armed_for(t));
            if !gate_pending && !session.play_requested {
                if let Some(resource) = session.resource.as_mut() {
                    info!(target: SESSION_LOG_TARGET, "Gate already resolved, requesting playback start.");
                    session.play_requested = true;
                    resource.request_play();
                }
            }
        }
        PlaybackState::Errored => {
            // explicit retry: reload the record from scratch
            if let Some(record) = session.snapshot.current_record.clone() {
                info!(target: SESSION_LOG_TARGET, record_id = %record.id, "Play after error, reloading sermon.");
                handle_load_sermon(session, record);
            }
        }
        PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Ended => match session.resource.as_mut() {
            Some(resource) => {
                info!(target: SESSION_LOG_TARGET, "Requesting playback start.");
                resource.request_play();
            }
            None => warn!(target: SESSION_LOG_TARGET, "Play: no resource despite loaded state."),
        },
    }
}

#[instrument(skip(session), fields(state = ?session.snapshot.playback_state))]
pub(super) fn handle_pause(session: &mut AudioSession) {
    match session.snapshot.playback_state {
        PlaybackState::Loading => {
            session.play_on_ready = false;
            if session.play_requested {
                if let Some(resource) = session.resource.as_mut() {
                    resource.pause();
                }
                session.play_requested = false;
            }
            debug!(target: SESSION_LOG_TARGET, "Pause while loading: automatic start cancelled.");
        }
        PlaybackState::Playing => {
            if let Some(resource) = session.resource.as_mut() {
                resource.pause();
            }
            session.snapshot.playback_state = PlaybackState::Paused;
            session.publish();
        }
        PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Ended => {
            // drops a play request that may still be in flight
            if let Some(resource) = session.resource.as_mut() {
                resource.pause();
            }
        }
        PlaybackState::Idle | PlaybackState::Errored => {}
    }
}

#[instrument(skip(session))]
pub(super) fn handle_seek(session: &mut AudioSession, seconds: f64) {
    if session.resource.is_none() {
        return;
    }
    if !seconds.is_finite() {
        debug!(target: SESSION_LOG_TARGET, "{}; ignoring.", PlaybackError::InvalidSeek(seconds));
        return;
    }

    let upper = session.snapshot.display_duration().unwrap_or(f64::INFINITY);
    let clamped = seconds.clamp(0.0, upper);
    if clamped != seconds {
        debug!(target: SESSION_LOG_TARGET, "{}; clamped to {:.2}.", PlaybackError::InvalidSeek(seconds), clamped);
    }

    if let Some(resource) = session.resource.as_mut() {
        resource.seek(clamped);
    }
    session.snapshot.position_seconds = clamped;
    session.publish();
}

pub(super) fn handle_skip(session: &mut AudioSession, delta: f64) {
    if session.resource.is_none() {
        return;
    }
    let target = session.snapshot.position_seconds + delta;
    handle_seek(session, target);
}

#[instrument(skip(session))]
pub(super) fn handle_set_volume(session: &mut AudioSession, level: f32) {
    if !level.is_finite() {
        warn!(target: SESSION_LOG_TARGET, "Ignoring non-finite volume.");
        return;
    }
    let level = level.clamp(0.0, 1.0);
    session.snapshot.volume = level;
    if let Some(resource) = session.resource.as_mut() {
        resource.set_volume(level);
    }
    session.publish();
}

/// Advances to the next rate in the cycle and returns it.
#[instrument(skip(session))]
pub(super) fn handle_cycle_playback_rate(session: &mut AudioSession) -> f32 {
    let rate = next_playback_rate(session.snapshot.playback_rate);
    debug!(target: SESSION_LOG_TARGET, from = session.snapshot.playback_rate, to = rate, "Cycling playback rate.");
    session.snapshot.playback_rate = rate;
    if let Some(resource) = session.resource.as_mut() {
        resource.set_playback_rate(rate);
    }
    session.publish();
    rate
}

#[instrument(skip(session))]
pub(super) fn handle_close_session(session: &mut AudioSession) {
    info!(target: SESSION_LOG_TARGET, "Closing session.");
    session.teardown_resource();
    session.snapshot = SessionSnapshot {
        volume: session.snapshot.volume,
        playback_rate: session.snapshot.playback_rate,
        ..Default::default()
    };
    session.publish();
}
