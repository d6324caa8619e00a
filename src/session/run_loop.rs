// src/session/run_loop.rs
use super::{command_handler, event_handler, AudioSession, SessionCommand, SessionSnapshot, SESSION_LOG_TARGET};
use tracing::{info, trace};

/// Runs the session's message loop.
///
/// Commands, resource events and gate outcomes are handled strictly one at a time,
/// so no handler ever observes a half-applied transition.
pub async fn run_session_loop(session: &mut AudioSession) {
    info!(target: SESSION_LOG_TARGET, "Session run loop started.");

    loop {
        tokio::select! {
            biased; // Check commands first

            command = session.command_rx.recv() => match command {
                Some(SessionCommand::Shutdown) => {
                    info!(target: SESSION_LOG_TARGET, "Shutdown command received. Exiting run loop.");
                    break;
                }
                Some(command) => {
                    trace!(target: SESSION_LOG_TARGET, "Received command: {:?}", command);
                    command_handler::dispatch(session, command);
                }
                None => {
                    info!(target: SESSION_LOG_TARGET, "All session handles dropped. Exiting run loop.");
                    break;
                }
            },

            Some((token, event)) = session.event_rx.recv() => {
                event_handler::handle_resource_event(session, token, event);
            }

            Some(outcome) = session.gate_rx.recv() => {
                event_handler::handle_gate_resolved(session, outcome);
            }
        }
    }

    info!(target: SESSION_LOG_TARGET, "Session run loop finished. Performing final cleanup.");
    session.teardown_resource();
    session.snapshot = SessionSnapshot {
        volume: session.snapshot.volume,
        playback_rate: session.snapshot.playback_rate,
        ..Default::default()
    };
    session.publish();
}
