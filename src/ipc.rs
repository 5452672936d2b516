//! IPC module - bounded-latency strip capture over channels

pub mod channels;
pub mod timed_capture;

pub use channels::{CaptureChannels, CaptureRequest, CaptureResponse};
pub use timed_capture::TimedCapture;
