use super::*;
use crate::foundation::error::MotionError;
use crate::output::RecordingSender;

fn session() -> FixtureSession<RecordingSender> {
    FixtureSession::new(EngineConfig::default(), RecordingSender::new()).unwrap()
}

fn send(s: &mut FixtureSession<RecordingSender>, json: &str) -> MotionResult<()> {
    s.dispatch(Payload::from_json(json).unwrap())
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = EngineConfig {
        frame_size: 0,
        ..EngineConfig::default()
    };
    assert!(FixtureSession::new(cfg, RecordingSender::new()).is_err());
}

#[test]
fn immediate_write_sends_one_frame() {
    let mut s = session();
    send(&mut s, r#"{"channel": 2, "value": 127.6}"#).unwrap();
    assert_eq!(s.value(Channel::at(2)), 128);
    assert_eq!(s.sender().count(), 1);
    assert_eq!(s.sender().last().unwrap().values.len(), 512);
}

#[test]
fn batch_write_sends_once_after_all_buckets() {
    let mut s = session();
    send(
        &mut s,
        r#"{"buckets": [{"channel": 1, "value": 10}, {"channel": 2, "value": 300}, {"channel": 0, "value": 5}]}"#,
    )
    .unwrap();
    assert_eq!(s.sender().count(), 1);
    assert_eq!(&s.sender().last().unwrap().values[..3], &[10, 255, 0]);
}

#[test]
fn batch_write_cancels_running_fades_without_extra_sends() {
    let mut s = session();
    send(&mut s, r#"{"channel": 1, "value": 200, "transition": "linear", "duration": 400}"#).unwrap();
    s.advance_to(ms(80));
    assert_eq!(s.sender().count(), 2);

    send(&mut s, r#"{"buckets": [{"channel": 1, "value": 5}]}"#).unwrap();
    assert_eq!(s.sender().count(), 3);
    assert_eq!(s.value(Channel::at(1)), 5);
    assert_eq!(s.run_until_idle(), 0);
}

#[test]
fn batch_fade_runs_one_fade_per_bucket() {
    let mut s = session();
    send(
        &mut s,
        r#"{"buckets": [{"channel": 1, "value": 100}, {"channel": 2, "value": 50}], "transition": "linear", "duration": 400}"#,
    )
    .unwrap();
    assert_eq!(s.scheduler().active_count(), 2);
    s.run_until_idle();
    assert_eq!(s.value(Channel::at(1)), 100);
    assert_eq!(s.value(Channel::at(2)), 50);
}

#[test]
fn start_buckets_apply_before_the_request_with_one_send() {
    let mut s = session();
    send(&mut s, r#"{"channel": 4, "value": 200, "transition": "linear", "duration": 400}"#).unwrap();
    s.advance_to(ms(40));
    let before = s.sender().count();

    send(
        &mut s,
        r#"{"start_buckets": [{"channel": 4, "value": 0}, {"channel": 5, "value": 9}], "channel": 4, "value": 100, "transition": "linear", "duration": 400}"#,
    )
    .unwrap();
    // One send for the start group; the fade replaced nothing so it sent nothing yet.
    assert_eq!(s.sender().count(), before + 1);
    let frame = &s.sender().last().unwrap().values;
    assert_eq!((frame[3], frame[4]), (0, 9));

    s.run_until_idle();
    assert_eq!(s.value(Channel::at(4)), 100);
    assert_eq!(s.sender().channel_history(4)[before + 1], 10);
}

#[test]
fn universe_follows_the_payload_then_falls_back() {
    let mut s = session();
    send(&mut s, r#"{"channel": 1, "value": 1, "universe": 3}"#).unwrap();
    assert_eq!(s.universe(), 3);
    assert_eq!(s.sender().last().unwrap().universe, 3);

    send(&mut s, r#"{"channel": 1, "value": 2}"#).unwrap();
    assert_eq!(s.universe(), 0);
    assert_eq!(s.sender().last().unwrap().universe, 0);
}

#[test]
fn arc_defaults_its_start_to_the_current_orientation() {
    let mut s = session();
    send(
        &mut s,
        r#"{"buckets": [{"channel": 1, "value": 17}, {"channel": 3, "value": 60}]}"#,
    )
    .unwrap();
    send(
        &mut s,
        r#"{"transition": "arc", "end": {"pan": 34, "tilt": 60}, "center": {"pan": 0, "tilt": 0}, "duration": 400}"#,
    )
    .unwrap();
    s.advance_to(Duration::ZERO);
    assert_eq!((s.value(Channel::at(1)), s.value(Channel::at(3))), (17, 60));
    s.run_until_idle();
    assert_eq!((s.value(Channel::at(1)), s.value(Channel::at(3))), (34, 60));
}

#[test]
fn rejected_arc_is_reported_and_leaves_state_alone() {
    let mut s = session();
    send(&mut s, r#"{"channel": 1, "value": 200, "transition": "linear", "duration": 400}"#).unwrap();
    let err = send(
        &mut s,
        r#"{"transition": "arc", "start": {"pan": 17, "tilt": 60}, "end": {"pan": 34, "tilt": 80}, "center": {"pan": 0, "tilt": 0}, "duration": 400}"#,
    )
    .unwrap_err();
    assert!(matches!(err, MotionError::InconsistentCenter { .. }));
    assert!(s.scheduler().active(Channel::at(1)).is_some());
    assert_eq!(s.sender().count(), 0);

    let err = send(&mut s, r#"{"transition": "arc", "end": {"pan": 1, "tilt": 1}}"#).unwrap_err();
    assert!(matches!(err, MotionError::InvalidArcPayload(_)));

    // Still usable afterwards.
    s.run_until_idle();
    assert_eq!(s.value(Channel::at(1)), 200);
}

#[test]
fn writes_outside_the_frame_are_refused() {
    let mut s = session();
    for payload in [
        r#"{"channel": 65535, "value": 9}"#,
        r#"{"channel": 513, "value": 9, "transition": "linear", "duration": 400}"#,
        r#"{"buckets": [{"channel": 1, "value": 9}, {"channel": 600, "value": 9}]}"#,
        r#"{"start_buckets": [{"channel": 1000, "value": 9}], "channel": 1, "value": 9}"#,
        r#"{"transition": "arc", "pan": 700, "start": {"pan": 17, "tilt": 60}, "end": {"pan": 34, "tilt": 60}, "center": {"pan": 0, "tilt": 0}, "duration": 400}"#,
    ] {
        let err = send(&mut s, payload).unwrap_err();
        assert!(matches!(err, MotionError::Validation(_)), "{payload}: {err}");
    }
    assert_eq!(s.sender().count(), 0);
    assert_eq!(s.scheduler().store().len(), 512);
    assert_eq!(s.value(Channel::at(1)), 0);
    assert_eq!(s.scheduler().active_count(), 0);

    send(&mut s, r#"{"channel": 512, "value": 9}"#).unwrap();
    assert_eq!(s.sender().last().unwrap().values.len(), 512);
}

#[test]
fn script_playback_counts_outcomes() {
    let steps = crate::request::parse_script(
        r#"[
            {"at": 0, "payload": {"channel": 5, "value": 100, "transition": "linear", "duration": 400}},
            {"at": 200, "payload": {"channel": 5, "value": 0, "transition": "linear", "duration": 200}},
            {"at": 250, "payload": {}}
        ]"#
        .as_bytes(),
    )
    .unwrap();
    let mut s = session();
    let report = s.play_script(&steps, PlaybackClock::Virtual);
    assert_eq!(report.accepted, 2);
    assert_eq!(report.rejected, 1);
    assert_eq!(s.value(Channel::at(5)), 0);
    assert!(s.scheduler().is_idle());
    // Five steps of the first fade, the forced 100, then the second fade.
    let history = s.sender().channel_history(5);
    assert_eq!(&history[..6], &[10, 20, 30, 40, 50, 100]);
    assert_eq!(*history.last().unwrap(), 0);
    assert_eq!(report.ticks + 1, history.len());
}

#[test]
fn shutdown_forces_targets_and_returns_the_store() {
    let mut s = session();
    send(&mut s, r#"{"channel": 9, "value": 250, "transition": "linear", "duration": 1000}"#).unwrap();
    s.advance_to(ms(100));
    let store = s.shutdown();
    assert_eq!(store.get(Channel::at(9)), 250);
    assert_eq!(store.len(), 512);
}

#[test]
fn saved_store_seeds_a_new_session() {
    let mut store = ChannelStore::new(3);
    store.set(Channel::at(2), 77);
    let s = FixtureSession::with_store(EngineConfig::default(), store, RecordingSender::new()).unwrap();
    assert_eq!(s.value(Channel::at(2)), 77);
    assert_eq!(s.scheduler().store().len(), 512);
}

#[test]
fn realtime_drive_fires_everything() {
    let cfg = EngineConfig {
        rate_ms: 5,
        ..EngineConfig::default()
    };
    let mut s = FixtureSession::new(cfg, RecordingSender::new()).unwrap();
    send(&mut s, r#"{"channel": 1, "value": 4, "transition": "linear", "duration": 20}"#).unwrap();
    assert_eq!(s.run_until_idle_realtime(), 4);
    assert_eq!(s.value(Channel::at(1)), 4);
}
