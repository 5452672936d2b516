//! Actuator module - PID control and pointer output

pub mod controller;
pub mod pointer;

pub use controller::{clamp_symmetric, ControllerState, PidController, PidGains, PidTerms};
pub use pointer::{PointerActuator, PointerMove, RecordingPointer};
