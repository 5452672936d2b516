//! Configuration loading. Fixed at startup, never mutated afterwards.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::actuator::controller::PidGains;
use crate::error::{Result, ServoError};
use crate::sensor::color::ColorThresholds;
use crate::sensor::strip::{ChannelOrder, StripRegion};

// ============================================================================
// SERVO CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServoConfig {
    pub strip: StripConfig,
    pub color: ColorThresholds,
    pub pid: PidGains,
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StripConfig {
    pub top: i32,
    pub left: i32,
    pub width: usize,
    /// Overrides the geometric center (`width / 2 - 0.5`).
    pub center_static: Option<f64>,
    pub unreliable_fraction: f64,
    pub channel_order: ChannelOrder,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Ticks per second.
    pub iteration_rate: f64,
    pub capture_timeout_ms: u64,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            top: 848,
            left: 1584,
            width: 210,
            center_static: None,
            unreliable_fraction: 0.75,
            channel_order: ChannelOrder::Bgra,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            iteration_rate: 75.0,
            capture_timeout_ms: 50,
        }
    }
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            strip: StripConfig::default(),
            color: ColorThresholds::default(),
            pid: PidGains::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl ServoConfig {
    /// Default configuration for a strip of `width` samples.
    pub fn with_width(width: usize) -> Self {
        Self {
            strip: StripConfig { width, ..StripConfig::default() },
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: ServoConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn strip_width(&self) -> usize {
        self.strip.width
    }

    /// Position the band center is steered towards.
    pub fn center_static(&self) -> f64 {
        self.strip
            .center_static
            .unwrap_or(self.strip.width as f64 / 2.0 - 0.5)
    }

    /// Bound shared by the integral accumulator and the controller output.
    pub fn output_limit(&self) -> f64 {
        self.strip.width as f64 / 2.0
    }

    /// Band widths at or above this are classified unreliable.
    pub fn reliability_limit(&self) -> f64 {
        self.strip.width as f64 * self.strip.unreliable_fraction
    }

    /// Controller period in seconds.
    pub fn dt(&self) -> f64 {
        1.0 / self.timing.iteration_rate
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(self.dt())
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.capture_timeout_ms)
    }

    pub fn region(&self) -> StripRegion {
        StripRegion {
            top: self.strip.top,
            left: self.strip.left,
            width: self.strip.width,
            height: 1,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.strip.width == 0 {
            return Err(ServoError::config("strip.width must be at least 1"));
        }
        let fraction = self.strip.unreliable_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ServoError::config(format!(
                "strip.unreliable_fraction must be in (0, 1], got {}",
                fraction
            )));
        }
        if let Some(center) = self.strip.center_static {
            if !center.is_finite() {
                return Err(ServoError::config("strip.center_static must be finite"));
            }
        }
        self.color.validate()?;
        self.pid.validate()?;
        let rate = self.timing.iteration_rate;
        if !(rate.is_finite() && rate > 0.0) {
            return Err(ServoError::config(format!(
                "timing.iteration_rate must be positive, got {}",
                rate
            )));
        }
        if self.timing.capture_timeout_ms == 0 {
            return Err(ServoError::config("timing.capture_timeout_ms must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// CONFIG FILE LOADING
// ============================================================================

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServoConfig> {
    let s = std::fs::read_to_string(path)?;
    ServoConfig::from_toml_str(&s)
}
