use serde::Deserialize;

use crate::config::ServoConfig;
use crate::error::{Result, ServoError};
use crate::sensor::classifier::TickState;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PidGains {
    pub kp: f64, // Proportional
    pub ki: f64, // Integral
    pub kd: f64, // Derivative
}

impl Default for PidGains {
    fn default() -> Self {
        Self { kp: 0.25, ki: 0.0, kd: 0.2 }
    }
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    pub fn validate(&self) -> Result<()> {
        if [self.kp, self.ki, self.kd].iter().all(|g| g.is_finite()) {
            Ok(())
        } else {
            Err(ServoError::config("pid gains must be finite"))
        }
    }
}

/// History carried between ticks. Owned by the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerState {
    pub integral: f64,
    pub previous_error: Option<f64>,
}

impl ControllerState {
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = None;
    }
}

/// Everything computed on an actuating tick. `p`, `i` and `d` are the
/// gain-weighted contributions to `output` before clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidTerms {
    pub error: f64,
    pub change: f64,
    pub integral: f64,
    pub derivative: f64,
    pub p: f64,
    pub i: f64,
    pub d: f64,
    pub output: f64,
}

/// Symmetric clamp to `[-limit, limit]`.
pub fn clamp_symmetric(value: f64, limit: f64) -> f64 {
    value.clamp(-limit, limit)
}

/// Discrete PID over the band error.
///
/// Holds no history of its own; every step reads and updates a
/// [`ControllerState`]. The integral accumulator and the output share the
/// same bound, half the strip width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidController {
    gains: PidGains,
    limit: f64,
}

impl PidController {
    pub fn new(gains: PidGains, limit: f64) -> Self {
        Self { gains, limit: limit.abs() }
    }

    pub fn from_config(config: &ServoConfig) -> Self {
        Self::new(config.pid, config.output_limit())
    }

    pub fn step(&self, tick: &TickState, state: &mut ControllerState, dt: f64) -> Option<f64> {
        self.step_terms(tick, state, dt).map(|terms| terms.output)
    }

    /// Like [`step`](Self::step) but returns the full breakdown.
    pub fn step_terms(&self, tick: &TickState, state: &mut ControllerState, dt: f64) -> Option<PidTerms> {
        let error = match *tick {
            TickState::Tracking(error) => error,
            TickState::Lost | TickState::Unreliable => {
                state.reset();
                return None;
            }
        };

        // No derivative on the first sample of a tracking run
        let previous = match state.previous_error {
            Some(previous) => previous,
            None => {
                state.previous_error = Some(error);
                return None;
            }
        };

        let change = error - previous;

        // Integral term with anti-windup
        let integral = clamp_symmetric(state.integral + error * dt, self.limit);

        // Derivative term
        let derivative = if dt > 0.0 { change / dt } else { 0.0 };

        let p = self.gains.kp * error;
        let i = self.gains.ki * integral;
        let d = self.gains.kd * derivative;
        let output = clamp_symmetric(p + i + d, self.limit);

        state.integral = integral;
        state.previous_error = Some(error);

        Some(PidTerms { error, change, integral, derivative, p, i, d, output })
    }
}
