pub mod error;
pub mod config;
pub mod sensor;
pub mod actuator;
pub mod ipc;
pub mod metrics;
pub mod servo;
pub mod status;

pub use error::{Result, ServoError, SignalFault};
pub use config::{load_config, ServoConfig};
pub use sensor::{
    detect, BandClassifier, ChannelOrder, ColorPredicate, ColorThresholds, DetectionResult,
    PixelStrip, RawCapture, RawStripSource, Sample, SimulatedSteering, StripCapture, StripRegion,
    SyntheticRoute, TickState,
};
pub use actuator::{
    ControllerState, PidController, PidGains, PidTerms, PointerActuator, PointerMove,
    RecordingPointer,
};
pub use ipc::TimedCapture;
pub use metrics::{MetricsReport, TimingMetrics};
pub use servo::{spawn_servo_thread, ControlLoop, LoopStats, StatsSnapshot, TickReport};
pub use status::{status_line, StatusPrinter};
