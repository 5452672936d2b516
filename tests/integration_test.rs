//! Integration tests for the strip servo

use route_servo::{
    detect, spawn_servo_thread, BandClassifier, ChannelOrder, ColorThresholds, ControlLoop,
    ControllerState, DetectionResult, PidController, PidGains, PixelStrip, RawCapture,
    RecordingPointer, Sample, ServoConfig, SyntheticRoute, TickState, TimedCapture,
};
use std::time::Duration;

const RED: Sample = Sample::new(220, 20, 20);
const GREY: Sample = Sample::new(120, 120, 120);

fn strip(width: usize, colored: impl Fn(usize) -> bool) -> PixelStrip {
    (0..width).map(|x| if colored(x) { RED } else { GREY }).collect()
}

// ============================================================================
// DETECTION TESTS
// ============================================================================

#[test]
fn test_every_band_position_is_recovered() {
    let thresholds = ColorThresholds::default();
    let width = 32;

    for first in 0..width {
        for last in first..width {
            let s = strip(width, |x| (first..=last).contains(&x));
            assert_eq!(detect(&s, &thresholds), DetectionResult::Band { first, last });
        }
    }
}

#[test]
fn test_strip_without_color_is_lost() {
    let config = ServoConfig::with_width(64);
    let classifier = BandClassifier::from_config(&config);
    let noisy: PixelStrip = (0..64u8)
        .map(|x| Sample::new(199, x.wrapping_mul(37), 36 + x))
        .collect();

    let detection = detect(&noisy, &config.color);
    assert_eq!(detection, DetectionResult::NotFound);
    assert_eq!(classifier.classify(detection), TickState::Lost);
}

#[test]
fn test_wide_band_is_unreliable() {
    let config = ServoConfig::with_width(128);
    let classifier = BandClassifier::from_config(&config);

    let s = strip(128, |x| x == 10 || x == 106);
    assert_eq!(classifier.classify(detect(&s, &config.color)), TickState::Unreliable);

    let s = strip(128, |x| x == 10 || x == 105);
    assert!(classifier.classify(detect(&s, &config.color)).is_tracking());
}

// ============================================================================
// RAW BUFFER TESTS
// ============================================================================

/// Runs five ticks over a seeded route whose screen emits `emitted` bytes,
/// read back through a capture configured for `configured`.
fn states_through_raw_capture(emitted: ChannelOrder, configured: ChannelOrder) -> Vec<TickState> {
    let mut config = ServoConfig::with_width(128);
    config.strip.channel_order = configured;
    config.timing.iteration_rate = 1000.0;

    let mut route = SyntheticRoute::new(11, 70.0);
    route.raw_order = emitted;
    let capture = RawCapture::from_config(route, &config);
    let mut servo = ControlLoop::new(config, capture, RecordingPointer::new()).unwrap();

    let mut states = Vec::new();
    servo.run_ticks(5, |report| states.push(report.state));
    states
}

#[test]
fn test_channel_order_does_not_change_tick_states() {
    let bgr = states_through_raw_capture(ChannelOrder::Bgr, ChannelOrder::Bgr);
    let rgb = states_through_raw_capture(ChannelOrder::Rgb, ChannelOrder::Rgb);
    let bgra = states_through_raw_capture(ChannelOrder::Bgra, ChannelOrder::Bgra);

    assert_eq!(bgr.len(), 5);
    assert!(bgr.iter().all(|s| s.is_tracking()), "{:?}", bgr);
    assert_eq!(bgr, rgb);
    assert_eq!(bgr, bgra);
}

#[test]
fn test_misconfigured_channel_order_loses_the_route() {
    // Red read as blue never passes the default thresholds
    let states = states_through_raw_capture(ChannelOrder::Rgb, ChannelOrder::Bgr);
    assert_eq!(states, vec![TickState::Lost; 5]);
}

// ============================================================================
// PID CONTROLLER TESTS
// ============================================================================

#[test]
fn test_reference_scenario() {
    let config = ServoConfig::with_width(128);
    let classifier = BandClassifier::from_config(&config);
    let pid = PidController::from_config(&config);
    let mut state = ControllerState::default();
    let dt = config.dt();

    let tick1 = classifier.classify(detect(&strip(128, |x| (60..=66).contains(&x)), &config.color));
    assert_eq!(tick1, TickState::Tracking(-0.5));
    assert_eq!(pid.step(&tick1, &mut state, dt), None);
    assert_eq!(state.previous_error, Some(-0.5));

    let tick2 = classifier.classify(detect(&strip(128, |x| (64..=70).contains(&x)), &config.color));
    assert_eq!(tick2, TickState::Tracking(3.5));
    let output = pid.step(&tick2, &mut state, dt).expect("second tracking tick actuates");
    assert!((output - 60.875).abs() < 1e-9);
    assert!((state.integral - 0.0467).abs() < 1e-4);

    assert_eq!(pid.step(&TickState::Lost, &mut state, dt), None);
    assert_eq!(state, ControllerState::default());
    assert_eq!(pid.step(&tick2, &mut state, dt), None);
}

#[test]
fn test_closed_loop_brings_band_to_center() {
    let mut config = ServoConfig::with_width(128);
    config.pid = PidGains::new(0.5, 0.0, 0.0);
    config.timing.iteration_rate = 1000.0;

    let route = SyntheticRoute::new(42, 100.0);
    let steering = route.steering(1.0);
    let mut servo = ControlLoop::new(config, route, steering).unwrap();

    servo.run_ticks(40, |_| {});

    let error = servo.capture().band_center() - 63.5;
    assert!(error.abs() < 1.5, "band should settle near center, error {}", error);
}

#[test]
fn test_default_gains_reduce_offset() {
    let config = ServoConfig::with_width(128);

    let route = SyntheticRoute::new(7, 90.0);
    let steering = route.steering(0.01);
    let mut servo = ControlLoop::new(config, route, steering).unwrap();

    let start = (servo.capture().band_center() - 63.5).abs();
    servo.run_ticks(100, |_| {});
    let end = (servo.capture().band_center() - 63.5).abs();
    assert!(end < start, "offset should shrink: {} -> {}", start, end);
}

// ============================================================================
// LOOP / THREADING TESTS
// ============================================================================

#[test]
fn test_threaded_loop_stops_on_shutdown() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut config = ServoConfig::with_width(128);
    config.timing.iteration_rate = 500.0;
    config.timing.capture_timeout_ms = 1000;

    let route = SyntheticRoute::new(1, 70.0);
    let capture = TimedCapture::spawn(route, config.capture_timeout()).unwrap();
    let servo = ControlLoop::new(config, capture, RecordingPointer::new()).unwrap();

    let (handle, stats) = spawn_servo_thread(servo, |_| {}).unwrap();
    std::thread::sleep(Duration::from_millis(100));
    stats.request_shutdown();

    let servo = handle.join().expect("servo thread should not panic");
    let snapshot = stats.snapshot();
    assert!(snapshot.total_ticks > 5);
    assert_eq!(snapshot.total_ticks, snapshot.tracking_ticks);
    assert_eq!(servo.actuator().moves().len() as u64, snapshot.actuations);
    assert!(servo.actuator().moves().iter().all(|m| m.dy == 0.0));

    let (capture, _) = servo.into_parts();
    capture.shutdown();
}

#[test]
fn test_shipped_config_parses() {
    let config = ServoConfig::from_toml_str(include_str!("../config/servo_config.toml")).unwrap();
    assert_eq!(config, ServoConfig::default());
}
