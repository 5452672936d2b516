use super::edge::DetectionResult;
use crate::config::ServoConfig;
use crate::error::SignalFault;

/// Outcome of one tick's detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickState {
    /// Band found; signed offset from the static center, positive = right.
    Tracking(f64),
    Lost,
    Unreliable,
}

impl TickState {
    pub fn error(&self) -> Option<f64> {
        match *self {
            TickState::Tracking(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self, TickState::Tracking(_))
    }

    pub fn fault(&self) -> Option<SignalFault> {
        match self {
            TickState::Tracking(_) => None,
            TickState::Lost => Some(SignalFault::SignalLost),
            TickState::Unreliable => Some(SignalFault::SignalUnreliable),
        }
    }

    /// Status label for non-tracking ticks.
    pub fn label(&self) -> &'static str {
        match self {
            TickState::Tracking(_) => "Tracking",
            TickState::Lost => "Route out of sight",
            TickState::Unreliable => "Route detection unreliable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandClassifier {
    center_static: f64,
    reliability_limit: f64,
}

impl BandClassifier {
    pub fn new(center_static: f64, reliability_limit: f64) -> Self {
        Self { center_static, reliability_limit }
    }

    pub fn from_config(config: &ServoConfig) -> Self {
        Self::new(config.center_static(), config.reliability_limit())
    }

    pub fn center_static(&self) -> f64 {
        self.center_static
    }

    pub fn classify(&self, detection: DetectionResult) -> TickState {
        let (first, last) = match detection {
            DetectionResult::NotFound => return TickState::Lost,
            DetectionResult::Band { first, last } => (first, last),
        };

        let width = (last - first) as f64;
        if width >= self.reliability_limit {
            return TickState::Unreliable;
        }

        let center = first as f64 + width / 2.0;
        TickState::Tracking(center - self.center_static)
    }
}
