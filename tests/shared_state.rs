mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use common::{ScriptedDetector, ScriptedSource};
use sentrycam::config::Config;
use sentrycam::detection::IntrusionEvent;
use sentrycam::{Collaborators, Engine, SentryError, SharedState};

/// Writer pattern: frame g (1-based) matches iff g is odd, adding one event.
/// Any consistent snapshot therefore satisfies
/// `log_len == (generation + 1) / 2` and `intrusion_active == generation is odd`.
#[test]
fn snapshots_are_never_torn() {
    const FRAMES: u64 = 20_000;

    let state = Arc::new(SharedState::new());
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let state = state.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut last_generation = 0;
                let mut observed = 0u64;
                while !done.load(Ordering::Acquire) {
                    let status = state.snapshot_status();
                    assert_eq!(status.log_len as u64, (status.generation + 1) / 2);
                    assert_eq!(status.intrusion_active, status.generation % 2 == 1);
                    assert!(status.generation >= last_generation, "visibility went backwards");
                    last_generation = status.generation;

                    let snap = state.snapshot();
                    assert_eq!(snap.events.len(), snap.status.log_len);
                    assert_eq!(snap.status.intrusion_active, snap.status.generation % 2 == 1);
                    observed += 1;
                }
                observed
            })
        })
        .collect();

    for generation in 1..=FRAMES {
        if generation % 2 == 1 {
            state.record_frame_result(true, vec![IntrusionEvent::now()]);
        } else {
            state.record_frame_result(false, Vec::new());
        }
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }

    let status = state.snapshot_status();
    assert_eq!(status.generation, FRAMES);
    assert_eq!(status.log_len as u64, FRAMES / 2);
}

#[test]
fn concurrent_start_stop_never_touches_results() {
    let state = Arc::new(SharedState::new());
    state.record_frame_result(true, vec![IntrusionEvent::now()]);

    let togglers: Vec<_> = (0..8)
        .map(|i| {
            let state = state.clone();
            thread::spawn(move || {
                for _ in 0..1000 {
                    state.set_running(i % 2 == 0);
                }
            })
        })
        .collect();
    for t in togglers {
        t.join().unwrap();
    }

    let status = state.snapshot_status();
    assert!(status.intrusion_active);
    assert_eq!(status.log_len, 1);
    assert_eq!(status.generation, 1);
}

#[tokio::test]
async fn engine_spawns_worker_once() {
    let mut config = Config::default();
    config.detection.period_ms = 5;

    let collaborators = Collaborators {
        source: Box::new(ScriptedSource::frames(0)),
        detector: Arc::new(ScriptedDetector::new()),
        alert: Arc::new(common::CountingAlert::default()),
    };
    let engine = Engine::new(config, collaborators);

    let handle = engine.spawn().unwrap();
    assert!(matches!(engine.spawn(), Err(SentryError::AlreadySpawned)));

    let control = engine.control();
    control.start();
    control.start();
    assert!(engine.state().is_running());

    engine.shutdown();
    handle.await.unwrap();
}

#[tokio::test]
async fn engine_start_on_launch() {
    let mut config = Config::default();
    config.detection.start_on_launch = true;

    let collaborators = Collaborators {
        source: Box::new(ScriptedSource::frames(0)),
        detector: Arc::new(ScriptedDetector::new()),
        alert: Arc::new(common::CountingAlert::default()),
    };
    let engine = Engine::new(config, collaborators);
    assert!(engine.state().is_running());
}

#[test]
fn collaborators_require_a_detector() {
    let config = Config::default();
    let err = match Collaborators::from_config(&config) {
        Ok(_) => panic!("expected missing detector error"),
        Err(e) => e,
    };
    assert!(err.to_string().contains("no detector configured"));

    let mut config = Config::default();
    config.demo_mode = true;
    assert!(Collaborators::from_config(&config).is_ok());
}
