//! Capture engine integration tests
//!
//! Drive guided, manual and gallery sessions against scripted devices
//! and check what lands in the session's photo set.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{picked, Call, FakeDevices};
use intake_common::events::{
    CameraFacing, CaptureExitReason, CaptureMode, CapturePhase, IntakeEvent,
};
use intake_flow::capture::{CameraAccess, CaptureOutcome, PermissionStatus, PickOutcome, CAPTURE_STEPS};
use intake_flow::{ImageRef, Route};
use tokio::sync::Notify;

fn handle(name: &str) -> ImageRef {
    ImageRef::Handle(name.to_string())
}

#[tokio::test]
async fn test_guided_step_speaks_counts_down_then_captures() {
    let session = helpers::session();
    let (providers, log) = FakeDevices::new().build();
    let engine = session.capture(CaptureMode::Guided, None, providers).unwrap();

    assert_eq!(engine.start().await, CaptureOutcome::Ready);
    assert_eq!(
        engine.run_guided_step().await.unwrap(),
        CaptureOutcome::Advanced { next_index: 1 }
    );

    let second = Duration::from_secs(1);
    assert_eq!(
        log.calls(),
        vec![
            Call::CameraPermission,
            Call::Speak(CAPTURE_STEPS[0].voice_instruction.to_string()),
            Call::Wait(second),
            Call::Wait(second),
            Call::Wait(second),
            Call::TakePicture(CameraFacing::Front),
        ]
    );

    let status = engine.status().await;
    assert_eq!(status.step_index, 1);
    assert!(!status.capturing);
    assert_eq!(status.countdown, None);
}

#[tokio::test]
async fn test_guided_run_fills_every_slot_and_hands_off_to_review() {
    let session = helpers::session();
    let (providers, log) = FakeDevices::new().build();
    let engine = session.capture(CaptureMode::Guided, None, providers).unwrap();

    engine.start().await;
    assert_eq!(engine.run_guided().await.unwrap(), CaptureOutcome::Finished(Route::Review));

    assert_eq!(log.count(|c| matches!(c, Call::Speak(_))), 5);
    assert_eq!(log.count(|c| matches!(c, Call::Wait(_))), 15);
    assert_eq!(log.count(|c| matches!(c, Call::TakePicture(_))), 5);

    let photos = session.photos();
    let photos = photos.read().await;
    assert!(photos.is_complete());
    assert_eq!(photos.photo(4), Some(&handle("shot-5")));
    assert!(engine.status().await.finished);
}

#[tokio::test]
async fn test_guided_needs_camera_permission_first() {
    let session = helpers::session();
    let (providers, log) = FakeDevices::new().build();
    let engine = session.capture(CaptureMode::Guided, None, providers).unwrap();

    assert_eq!(engine.run_guided_step().await.unwrap(), CaptureOutcome::PermissionRequired);
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn test_speech_failure_does_not_stop_the_countdown() {
    let session = helpers::session();
    let (providers, log) = FakeDevices::new().failing_speech().build();
    let engine = session.capture(CaptureMode::Guided, None, providers).unwrap();

    engine.start().await;
    assert_eq!(
        engine.run_guided_step().await.unwrap(),
        CaptureOutcome::Advanced { next_index: 1 }
    );
    assert_eq!(log.count(|c| matches!(c, Call::Wait(_))), 3);
    assert!(session.photos().read().await.photo(0).is_some());
}

#[tokio::test]
async fn test_manual_session_walks_all_five_steps() {
    let session = helpers::session();
    let (providers, _log) = FakeDevices::new().build();
    let engine = session.capture(CaptureMode::Manual, None, providers).unwrap();

    engine.start().await;
    for expected in 1..5 {
        assert_eq!(
            engine.capture_manual().await.unwrap(),
            CaptureOutcome::Advanced { next_index: expected }
        );
        assert_eq!(engine.current_step().await.id, CAPTURE_STEPS[expected].id);
    }
    assert_eq!(engine.capture_manual().await.unwrap(), CaptureOutcome::Finished(Route::Review));

    // Nothing happens after hand-off
    assert_eq!(engine.capture_manual().await.unwrap(), CaptureOutcome::Ignored);
    assert_eq!(session.photos().read().await.filled_count(), 5);
}

#[tokio::test]
async fn test_retake_replaces_one_slot_then_returns_to_review() {
    let session = helpers::session();
    helpers::fill_photos(&session, "old").await;
    let (providers, _log) = FakeDevices::new().build();
    let engine = session.capture(CaptureMode::Manual, Some(2), providers).unwrap();

    assert_eq!(engine.status().await.step_index, 2);
    engine.start().await;
    assert_eq!(engine.capture_manual().await.unwrap(), CaptureOutcome::Finished(Route::Review));

    let photos = session.photos();
    let photos = photos.read().await;
    assert_eq!(photos.photo(2), Some(&handle("shot-1")));
    for i in [0, 1, 3, 4] {
        assert_eq!(photos.photo(i), Some(&handle(&format!("old-{}", i))));
    }
}

#[tokio::test]
async fn test_retake_on_empty_set_goes_straight_to_review() {
    let session = helpers::session();
    let (providers, _log) = FakeDevices::new().build();
    let engine = session.capture(CaptureMode::Manual, Some(1), providers).unwrap();

    engine.start().await;
    assert_eq!(engine.capture_manual().await.unwrap(), CaptureOutcome::Finished(Route::Review));

    let photos = session.photos();
    let photos = photos.read().await;
    assert_eq!(photos.filled_count(), 1);
    assert_eq!(photos.photo(1), Some(&handle("shot-1")));
}

#[tokio::test]
async fn test_retake_index_out_of_range_rejected() {
    let session = helpers::session();
    let (providers, _log) = FakeDevices::new().build();
    assert!(session.capture(CaptureMode::Manual, Some(5), providers).is_err());
}

#[tokio::test]
async fn test_failed_capture_releases_the_step() {
    let session = helpers::session();
    let mut rx = session.subscribe();
    let (providers, _log) = FakeDevices::new()
        .camera(|c| c.with_failure("lens busy"))
        .build();
    let engine = session.capture(CaptureMode::Manual, None, providers).unwrap();

    engine.start().await;
    assert!(matches!(engine.capture_manual().await.unwrap(), CaptureOutcome::Failed(_)));

    let status = engine.status().await;
    assert!(!status.capturing);
    assert_eq!(status.step_index, 0);
    assert!(session.photos().read().await.photo(0).is_none());

    let failed = loop {
        if let IntakeEvent::CaptureFailed { step_index, .. } = rx.recv().await.unwrap() {
            break step_index;
        }
    };
    assert_eq!(failed, 0);

    assert_eq!(
        engine.capture_manual().await.unwrap(),
        CaptureOutcome::Advanced { next_index: 1 }
    );
}

#[tokio::test]
async fn test_second_trigger_while_capturing_is_ignored() {
    let session = helpers::session();
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let (providers, log) = FakeDevices::new()
        .camera(|c| c.gated(entered.clone(), release.clone()))
        .build();
    let engine = session.capture(CaptureMode::Manual, None, providers).unwrap();
    engine.start().await;

    let first = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.capture_manual().await })
    };
    entered.notified().await;
    assert!(engine.status().await.capturing);

    assert_eq!(engine.capture_manual().await.unwrap(), CaptureOutcome::Ignored);

    release.notify_one();
    assert_eq!(
        first.await.unwrap().unwrap(),
        CaptureOutcome::Advanced { next_index: 1 }
    );
    assert_eq!(log.count(|c| matches!(c, Call::TakePicture(_))), 1);
}

#[tokio::test]
async fn test_abandoned_session_drops_late_photo() {
    let session = helpers::session();
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let (providers, _log) = FakeDevices::new()
        .camera(|c| c.gated(entered.clone(), release.clone()))
        .build();
    let engine = session.capture(CaptureMode::Manual, None, providers).unwrap();
    engine.start().await;

    let pending = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.capture_manual().await })
    };
    entered.notified().await;

    engine.abandon().await;
    release.notify_one();

    assert_eq!(pending.await.unwrap().unwrap(), CaptureOutcome::Abandoned);
    assert_eq!(session.photos().read().await.filled_count(), 0);
    assert_eq!(engine.status().await.step_index, 0);
}

#[tokio::test]
async fn test_abandon_during_guided_speech_stops_the_chain() {
    let session = helpers::session();
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let (providers, log) = FakeDevices::new()
        .speech(|s| s.gated(entered.clone(), release.clone()))
        .build();
    let engine = session.capture(CaptureMode::Guided, None, providers).unwrap();
    engine.start().await;

    let pending = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.run_guided_step().await })
    };
    entered.notified().await;

    engine.abandon().await;
    release.notify_one();

    assert_eq!(pending.await.unwrap().unwrap(), CaptureOutcome::Abandoned);
    assert_eq!(log.count(|c| matches!(c, Call::Wait(_))), 0);
    assert_eq!(log.count(|c| matches!(c, Call::TakePicture(_))), 0);
    assert_eq!(session.photos().read().await.filled_count(), 0);
    assert!(!engine.status().await.capturing);
}

#[tokio::test]
async fn test_guided_phases_end_with_done() {
    let session = helpers::session();
    let mut rx = session.subscribe();
    let (providers, _log) = FakeDevices::new().build();
    let engine = session.capture(CaptureMode::Guided, None, providers).unwrap();
    engine.start().await;
    engine.run_guided_step().await.unwrap();

    let mut phases = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let IntakeEvent::CapturePhaseChanged { phase, .. } = event {
            phases.push(phase);
        }
    }
    assert_eq!(
        phases,
        vec![
            CapturePhase::Speaking,
            CapturePhase::CountingDown(3),
            CapturePhase::CountingDown(2),
            CapturePhase::CountingDown(1),
            CapturePhase::Capturing,
            CapturePhase::Done,
        ]
    );
}

#[tokio::test]
async fn test_camera_denied_once_asks_again() {
    let session = helpers::session();
    let (providers, _log) = FakeDevices::new()
        .camera(|c| c.with_permissions(&[PermissionStatus::Denied, PermissionStatus::Granted]))
        .build();
    let engine = session.capture(CaptureMode::Manual, None, providers).unwrap();

    assert_eq!(engine.start().await, CaptureOutcome::PermissionRequired);
    assert_eq!(engine.status().await.camera, CameraAccess::DeniedOnce);
    assert_eq!(engine.capture_manual().await.unwrap(), CaptureOutcome::PermissionRequired);

    assert_eq!(engine.request_camera_permission().await, CaptureOutcome::Ready);
    assert_eq!(
        engine.capture_manual().await.unwrap(),
        CaptureOutcome::Advanced { next_index: 1 }
    );
}

#[tokio::test]
async fn test_camera_denied_twice_leaves_capture() {
    let session = helpers::session();
    let mut rx = session.subscribe();
    let (providers, _log) = FakeDevices::new()
        .camera(|c| c.with_permissions(&[PermissionStatus::Denied, PermissionStatus::Denied]))
        .build();
    let engine = session.capture(CaptureMode::Guided, None, providers).unwrap();

    assert_eq!(engine.start().await, CaptureOutcome::PermissionRequired);
    match engine.request_camera_permission().await {
        CaptureOutcome::Exited { route, reason, message } => {
            assert_eq!(route, Route::ModeSelection);
            assert_eq!(reason, CaptureExitReason::PermissionDenied);
            assert_eq!(message, "Kamera izni gerekiyor");
        }
        other => panic!("expected exit, got {:?}", other),
    }
    assert!(matches!(rx.recv().await.unwrap(), IntakeEvent::CaptureExited { .. }));
    assert_eq!(engine.run_guided_step().await.unwrap(), CaptureOutcome::Ignored);
}

#[tokio::test]
async fn test_toggle_facing_keeps_step() {
    let session = helpers::session();
    let (providers, log) = FakeDevices::new().build();
    let engine = session.capture(CaptureMode::Manual, None, providers).unwrap();
    engine.start().await;

    assert_eq!(engine.toggle_facing().await.unwrap(), CameraFacing::Back);
    engine.capture_manual().await.unwrap();
    assert!(log.calls().contains(&Call::TakePicture(CameraFacing::Back)));
    assert_eq!(engine.toggle_facing().await.unwrap(), CameraFacing::Front);
    assert_eq!(engine.status().await.step_index, 1);
}

#[tokio::test]
async fn test_toggle_during_speech_uses_new_lens() {
    let session = helpers::session();
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let (providers, log) = FakeDevices::new()
        .speech(|s| s.gated(entered.clone(), release.clone()))
        .build();
    let engine = session.capture(CaptureMode::Guided, None, providers).unwrap();
    engine.start().await;

    let pending = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.run_guided_step().await })
    };
    entered.notified().await;

    assert_eq!(engine.toggle_facing().await.unwrap(), CameraFacing::Back);
    release.notify_one();

    assert_eq!(
        pending.await.unwrap().unwrap(),
        CaptureOutcome::Advanced { next_index: 1 }
    );
    assert_eq!(
        log.calls().last(),
        Some(&Call::TakePicture(CameraFacing::Back))
    );
}

#[tokio::test]
async fn test_gallery_session_has_no_camera() {
    let session = helpers::session();
    let (providers, log) = FakeDevices::new().build();
    let engine = session.capture(CaptureMode::Gallery, None, providers).unwrap();

    assert_eq!(engine.start().await, CaptureOutcome::Ready);
    assert!(engine.toggle_facing().await.is_err());
    assert!(engine.capture_manual().await.is_err());
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn test_gallery_run_reprompts_after_cancel() {
    let session = helpers::session();
    let (providers, log) = FakeDevices::new()
        .picker(|p| {
            p.with_picks(vec![
                picked("g0"),
                PickOutcome::Cancelled,
                picked("g1"),
                picked("g2"),
                picked("g3"),
                picked("g4"),
            ])
        })
        .build();
    let engine = session.capture(CaptureMode::Gallery, None, providers).unwrap();

    engine.start().await;
    assert_eq!(engine.run_gallery().await.unwrap(), CaptureOutcome::Finished(Route::Review));

    assert_eq!(log.count(|c| *c == Call::PickerPermission), 1);
    assert_eq!(log.count(|c| matches!(c, Call::Pick(_))), 6);
    assert_eq!(log.count(|c| *c == Call::Wait(Duration::from_millis(500))), 5);

    let photos = session.photos();
    let photos = photos.read().await;
    for i in 0..5 {
        assert_eq!(photos.photo(i), Some(&handle(&format!("g{}", i))));
    }
}

#[tokio::test]
async fn test_gallery_cancel_on_later_step_stays_put() {
    let session = helpers::session();
    let (providers, _log) = FakeDevices::new()
        .picker(|p| p.with_picks(vec![picked("g0"), PickOutcome::Cancelled]))
        .build();
    let engine = session.capture(CaptureMode::Gallery, None, providers).unwrap();

    engine.import_from_gallery().await.unwrap();
    assert_eq!(engine.import_from_gallery().await.unwrap(), CaptureOutcome::Reprompt);
    let status = engine.status().await;
    assert_eq!(status.step_index, 1);
    assert!(!status.capturing);
}

#[tokio::test]
async fn test_gallery_cancel_on_first_step_exits() {
    let session = helpers::session();
    let (providers, _log) = FakeDevices::new()
        .picker(|p| p.with_picks(vec![PickOutcome::Cancelled]))
        .build();
    let engine = session.capture(CaptureMode::Gallery, None, providers).unwrap();

    match engine.run_gallery().await.unwrap() {
        CaptureOutcome::Exited { route, reason, .. } => {
            assert_eq!(route, Route::ModeSelection);
            assert_eq!(reason, CaptureExitReason::PickerCancelled);
        }
        other => panic!("expected exit, got {:?}", other),
    }
    assert_eq!(session.photos().read().await.filled_count(), 0);
}

#[tokio::test]
async fn test_gallery_permission_denied_exits() {
    let session = helpers::session();
    let (providers, log) = FakeDevices::new().picker(|p| p.denied()).build();
    let engine = session.capture(CaptureMode::Gallery, None, providers).unwrap();

    match engine.import_from_gallery().await.unwrap() {
        CaptureOutcome::Exited { reason, message, .. } => {
            assert_eq!(reason, CaptureExitReason::PermissionDenied);
            assert_eq!(message, "Galeri izni vermeniz gerekiyor.");
        }
        other => panic!("expected exit, got {:?}", other),
    }
    assert_eq!(log.count(|c| matches!(c, Call::Pick(_))), 0);
}

#[tokio::test]
async fn test_late_gallery_denial_after_abandon_is_dropped() {
    let session = helpers::session();
    let mut rx = session.subscribe();
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let (providers, log) = FakeDevices::new()
        .picker(|p| p.denied().gated_permission(entered.clone(), release.clone()))
        .build();
    let engine = session.capture(CaptureMode::Gallery, None, providers).unwrap();

    let pending = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.import_from_gallery().await })
    };
    entered.notified().await;

    engine.abandon().await;
    release.notify_one();

    assert_eq!(pending.await.unwrap().unwrap(), CaptureOutcome::Abandoned);
    assert!(!engine.status().await.finished);
    assert!(rx.try_recv().is_err());
    assert_eq!(log.count(|c| matches!(c, Call::Pick(_))), 0);
}

#[tokio::test]
async fn test_gallery_permission_error_is_not_fatal() {
    let session = helpers::session();
    let (providers, log) = FakeDevices::new()
        .picker(|p| p.broken("photo library unavailable"))
        .build();
    let engine = session.capture(CaptureMode::Gallery, None, providers).unwrap();

    match engine.run_gallery().await.unwrap() {
        CaptureOutcome::Failed(message) => assert!(message.contains("photo library unavailable")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(!engine.status().await.finished);
    assert_eq!(log.count(|c| matches!(c, Call::Pick(_))), 0);
}

#[tokio::test]
async fn test_photo_events_name_the_target() {
    let session = helpers::session();
    let mut rx = session.subscribe();
    let (providers, _log) = FakeDevices::new().build();
    let engine = session.capture(CaptureMode::Manual, Some(1), providers).unwrap();
    engine.start().await;
    engine.capture_manual().await.unwrap();

    match rx.recv().await.unwrap() {
        IntakeEvent::PhotoCaptured { step_index, target, mode, retake, .. } => {
            assert_eq!(step_index, 1);
            assert_eq!(target, "crown");
            assert_eq!(mode, CaptureMode::Manual);
            assert!(retake);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}
