//! Integration tests for the audio session task
//!
//! The session runs on its own task and is driven only through a
//! `SessionHandle`, the way presentation surfaces use it. A scripted backend
//! stands in for the network stream so tests decide when buffering finishes
//! and can replay callbacks from resources the session already replaced.

use sermon_stream::audio::{PlaybackError, ResourceEvent, ScriptedBackend, ScriptedCall};
use sermon_stream::catalog::{load_catalog, Catalog, SermonRecord};
use sermon_stream::session::{AudioSession, PlaybackState, SessionError, SessionHandle, SessionOptions, SessionSnapshot};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use super::LIBRARY_JSON;

const WAIT: Duration = Duration::from_secs(2);

fn catalog() -> Catalog {
    load_catalog(LIBRARY_JSON).expect("fixture parses")
}

fn record(catalog: &Catalog, id: &str) -> SermonRecord {
    catalog.find(id).cloned().expect("fixture record")
}

fn start(backend: &ScriptedBackend, readiness_timeout: Duration) -> (SessionHandle, JoinHandle<()>) {
    let options = SessionOptions { readiness_timeout, ..Default::default() };
    let (session, handle) = AudioSession::new(Box::new(backend.clone()), options);
    (handle, session.spawn())
}

/// Waits until a published snapshot satisfies `pred`.
async fn wait_for<F>(rx: &mut watch::Receiver<SessionSnapshot>, pred: F) -> SessionSnapshot
where
    F: Fn(&SessionSnapshot) -> bool,
{
    let result = timeout(WAIT, async {
        loop {
            {
                let snapshot = rx.borrow_and_update();
                if pred(&snapshot) {
                    return snapshot.clone();
                }
            }
            if rx.changed().await.is_err() {
                panic!("session stopped while waiting");
            }
        }
    })
    .await;
    match result {
        Ok(snapshot) => snapshot,
        Err(_) => panic!("timed out waiting; last snapshot: {:?}", rx.borrow().clone()),
    }
}

#[cfg(test)]
mod session_integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_listening_session_lifecycle() {
        let catalog = catalog();
        let backend = ScriptedBackend::new();
        let (handle, task) = start(&backend, Duration::from_secs(5));
        let mut rx = handle.subscribe();

        handle.load_sermon(record(&catalog, "vames")).await.unwrap();
        let loading = wait_for(&mut rx, |s| s.is_loading()).await;
        assert_eq!(loading.display_duration(), Some(1440.0));

        backend.last_sink().unwrap().emit(ResourceEvent::CanPlayThrough);
        wait_for(&mut rx, |s| s.is_playing()).await;

        handle.seek(600.0).await.unwrap();
        handle.skip_forward(30.0).await.unwrap();
        handle.skip_backward(15.0).await.unwrap();
        wait_for(&mut rx, |s| s.position_seconds == 615.0).await;

        handle.cycle_playback_rate().await.unwrap();
        handle.set_volume(0.5).await.unwrap();
        handle.pause().await.unwrap();
        let paused = wait_for(&mut rx, |s| s.playback_state == PlaybackState::Paused).await;
        assert_eq!(paused.playback_rate, 1.5);
        assert_eq!(paused.volume, 0.5);

        handle.close_session().await.unwrap();
        let idle = wait_for(&mut rx, |s| s.current_record.is_none()).await;
        assert_eq!(idle.playback_state, PlaybackState::Idle);
        assert_eq!(idle.playback_rate, 1.5);
        assert_eq!(backend.live_resources(), 0);

        handle.shutdown().await.unwrap();
        timeout(WAIT, task).await.unwrap().unwrap();
        assert_eq!(handle.play().await, Err(SessionError::SessionClosed));
    }

    #[tokio::test]
    async fn test_rapid_switching_keeps_one_resource() {
        let catalog = catalog();
        let backend = ScriptedBackend::new();
        let (handle, task) = start(&backend, Duration::from_secs(5));
        let mut rx = handle.subscribe();

        for id in ["vames", "fiu", "vames-2015", "vames", "fiu"] {
            handle.load_sermon(record(&catalog, id)).await.unwrap();
        }
        wait_for(&mut rx, |s| s.current_id() == Some("fiu") && backend.opened() == 5).await;
        assert_eq!(backend.max_live_resources(), 1);
        assert_eq!(backend.live_resources(), 1);

        // stale callbacks from every replaced resource, then the current one buffers
        for i in 0..4 {
            let stale = backend.sink(i).unwrap();
            stale.emit(ResourceEvent::CanPlayThrough);
            stale.emit(ResourceEvent::TimeUpdate(321.0));
            stale.emit(ResourceEvent::DurationChanged(12.0));
            stale.emit(ResourceEvent::Error(PlaybackError::Network("stale".to_string())));
        }
        backend.last_sink().unwrap().emit(ResourceEvent::CanPlayThrough);

        let playing = wait_for(&mut rx, |s| s.is_playing()).await;
        assert_eq!(playing.current_id(), Some("fiu"));
        assert_eq!(playing.position_seconds, 0.0);
        assert!(playing.reported_duration_seconds.is_none());
        assert!(playing.last_error.is_none());

        let played: Vec<String> = backend
            .calls()
            .into_iter()
            .filter(|(_, call)| *call == ScriptedCall::Play)
            .map(|(token, _)| token.record_id)
            .collect();
        assert_eq!(played, vec!["fiu".to_string()]);

        handle.shutdown().await.unwrap();
        timeout(WAIT, task).await.unwrap().unwrap();
        assert_eq!(backend.live_resources(), 0);
    }

    #[tokio::test]
    async fn test_readiness_timeout_starts_playback() {
        let catalog = catalog();
        let backend = ScriptedBackend::new();
        let (handle, task) = start(&backend, Duration::from_millis(50));
        let mut rx = handle.subscribe();

        handle.load_sermon(record(&catalog, "fiu")).await.unwrap();
        let playing = wait_for(&mut rx, |s| s.is_playing()).await;
        // no catalog duration: the decoder value is all there is
        assert!(playing.display_duration().is_none());

        handle.shutdown().await.unwrap();
        timeout(WAIT, task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_end_of_stream_then_replay() {
        let catalog = catalog();
        let backend = ScriptedBackend::new();
        let (handle, task) = start(&backend, Duration::from_secs(5));
        let mut rx = handle.subscribe();

        handle.load_sermon(record(&catalog, "vames-2015")).await.unwrap();
        wait_for(&mut rx, |s| s.is_loading()).await;
        let sink = backend.last_sink().unwrap();
        sink.emit(ResourceEvent::CanPlayThrough);
        wait_for(&mut rx, |s| s.is_playing()).await;

        sink.emit(ResourceEvent::TimeUpdate(99.0));
        sink.emit(ResourceEvent::Ended);
        let ended = wait_for(&mut rx, |s| s.playback_state == PlaybackState::Ended).await;
        assert_eq!(ended.position_seconds, 0.0);
        assert!(!ended.is_playing());

        handle.play().await.unwrap();
        wait_for(&mut rx, |s| s.is_playing()).await;
        assert_eq!(backend.opened(), 1);

        handle.shutdown().await.unwrap();
        timeout(WAIT, task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_network_error_then_retry() {
        let catalog = catalog();
        let backend = ScriptedBackend::new();
        let (handle, task) = start(&backend, Duration::from_secs(5));
        let mut rx = handle.subscribe();

        handle.load_sermon(record(&catalog, "vames")).await.unwrap();
        wait_for(&mut rx, |s| s.is_loading()).await;
        backend.last_sink().unwrap().emit(ResourceEvent::Error(PlaybackError::Network("connection reset".to_string())));

        let errored = wait_for(&mut rx, |s| s.playback_state == PlaybackState::Errored).await;
        assert!(errored.error_message().is_some());

        handle.play().await.unwrap();
        let reloading = wait_for(&mut rx, |s| s.is_loading()).await;
        assert!(reloading.last_error.is_none());
        assert_eq!(backend.opened(), 2);

        handle.shutdown().await.unwrap();
        timeout(WAIT, task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_unplayable_record_is_rejected() {
        let catalog = catalog();
        let backend = ScriptedBackend::new();
        let (handle, task) = start(&backend, Duration::from_secs(5));

        let result = handle.load_sermon(record(&catalog, "nota")).await;
        assert_eq!(result, Err(SessionError::NotPlayable("nota".to_string())));
        assert_eq!(handle.fetch_snapshot().await.unwrap().playback_state, PlaybackState::Idle);
        assert_eq!(backend.opened(), 0);

        drop(handle);
        // the session stops once every handle is gone
        timeout(WAIT, task).await.unwrap().unwrap();
    }
}
