use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};

use route_servo::{
    load_config, spawn_servo_thread, ControlLoop, RawCapture, Result, ServoConfig, ServoError,
    StatusPrinter, SyntheticRoute, TickReport, TimedCapture,
};

/// Runs the strip servo against a simulated route.
#[derive(Parser, Debug)]
#[command(name = "route-servo", version, about)]
struct Args {
    /// TOML configuration file; defaults are used when it does not exist
    #[arg(long, default_value = "config/servo_config.toml")]
    config: PathBuf,

    /// How long to run before shutting down
    #[arg(long, default_value_t = 10)]
    seconds: u64,

    /// Seed for the simulated route
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Band shift per pixel of pointer movement
    #[arg(long, default_value_t = 0.05)]
    steering_gain: f64,

    /// Route drift in pixels per tick
    #[arg(long, default_value_t = 0.02)]
    drift: f64,

    /// Suppress the per-tick status line
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn read_config(args: &Args) -> Result<ServoConfig> {
    match load_config(&args.config) {
        Ok(config) => Ok(config),
        Err(ServoError::Io(err)) if err.kind() == ErrorKind::NotFound => {
            warn!("{} not found, using defaults", args.config.display());
            Ok(ServoConfig::default())
        }
        Err(err) => Err(err),
    }
}

fn run(args: Args) -> Result<()> {
    println!("===========================================");
    println!("Starting Route Servo");
    println!("===========================================\n");

    let config = read_config(&args)?;
    let width = config.strip_width();

    // Start the band off-center so the controller has work to do
    let mut route = SyntheticRoute::new(args.seed, config.center_static() + width as f64 * 0.2);
    route.drift_per_tick = args.drift;
    route.dropout_probability = 0.01;
    route.glare_probability = 0.005;
    // The simulated screen hands out bytes in the configured layout
    route.raw_order = config.strip.channel_order;
    let steering = route.steering(args.steering_gain);

    let capture = TimedCapture::spawn(RawCapture::from_config(route, &config), config.capture_timeout())?;
    let control_loop = ControlLoop::new(config, capture, steering)?;
    let metrics = control_loop.metrics().clone();

    let mut printer = (!args.quiet).then(StatusPrinter::stdout);
    let on_tick = move |report: &TickReport| {
        if let Some(printer) = printer.as_mut() {
            printer.show(report);
        }
    };

    let (handle, stats) = spawn_servo_thread(control_loop, on_tick)?;

    info!("running for {} seconds", args.seconds);
    std::thread::sleep(Duration::from_secs(args.seconds));

    stats.request_shutdown();
    let control_loop = handle
        .join()
        .map_err(|_| ServoError::ThreadPanic("servo-loop".to_string()))?;
    if !args.quiet {
        println!();
    }

    let controller_state = control_loop.controller_state();
    let (capture, steering) = control_loop.into_parts();
    capture.shutdown();

    let summary = stats.snapshot();
    let report = metrics.report();

    println!("\n===========================================");
    println!("FINAL SERVO RESULTS");
    println!("===========================================");
    println!("Total Ticks: {}", summary.total_ticks);
    println!("Tracking: {} ({:.1}%)", summary.tracking_ticks, summary.tracking_ratio());
    println!("Route out of sight: {}", summary.lost_ticks);
    println!("Detection unreliable: {}", summary.unreliable_ticks);
    println!("Capture failures: {}", summary.capture_failures);
    println!("Pointer moves: {} ({} failed)", summary.actuations, summary.actuation_failures);
    println!("Deadline Compliance: {:.2}% ({} overruns)", summary.deadline_compliance(), summary.overruns);
    println!("Final integral: {:.4}, steering offset: {:.2}", controller_state.integral, steering.offset());

    println!("\n=== Performance Metrics ===");
    println!("Capture P50: {:?}, P99: {:?}", report.capture_p50, report.capture_p99);
    println!("Processing P50: {:?}, P99: {:?}", report.processing_p50, report.processing_p99);
    println!("Tick P50: {:?}, P99: {:?}", report.tick_p50, report.tick_p99);
    println!("Jitter P50: {:?}, P99: {:?}", report.jitter_p50, report.jitter_p99);

    Ok(())
}
