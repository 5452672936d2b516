use criterion::{black_box, criterion_group, criterion_main, Criterion};
use route_servo::{
    detect, BandClassifier, ColorThresholds, ControllerState, PidController, ServoConfig,
    SyntheticRoute, TickState,
};

fn benchmark_detection(c: &mut Criterion) {
    let mut route = SyntheticRoute::new(42, 120.0);
    let strip = route.generate(210);
    let thresholds = ColorThresholds::default();
    c.bench_function("detect_210px", |b| b.iter(|| detect(black_box(&strip), &thresholds)));

    let classifier = BandClassifier::from_config(&ServoConfig::default());
    c.bench_function("detect_and_classify_210px", |b| {
        b.iter(|| classifier.classify(detect(black_box(&strip), &thresholds)))
    });
}

fn benchmark_pid_control(c: &mut Criterion) {
    let config = ServoConfig::default();
    let pid = PidController::from_config(&config);
    let dt = config.dt();
    let mut state = ControllerState::default();
    let mut error = 0.0;
    c.bench_function("pid_step", |b| {
        b.iter(|| {
            error = if error > 10.0 { -10.0 } else { error + 0.5 };
            pid.step(black_box(&TickState::Tracking(error)), &mut state, dt)
        })
    });
}

criterion_group!(benches, benchmark_detection, benchmark_pid_control);
criterion_main!(benches);
