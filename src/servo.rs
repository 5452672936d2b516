//! Servo module - the fixed-rate control loop and its runner thread

pub mod control_loop;
pub mod servo_thread;

pub use control_loop::{ControlLoop, TickReport};
pub use servo_thread::{spawn_servo_thread, LoopStats, StatsSnapshot};
