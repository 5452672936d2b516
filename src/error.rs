//! Error types for the servo loop

use thiserror::Error;

/// Result type alias for the servo library
pub type Result<T> = std::result::Result<T, ServoError>;

/// Errors raised by collaborators and configuration.
///
/// Nothing here is fatal to a running loop: capture and actuation errors are
/// absorbed per tick. Only `Config`, `Io`, `Toml` and `ThreadPanic` are
/// expected to reach `main`.
#[derive(Error, Debug)]
pub enum ServoError {
    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Capture timed out after {0:?}")]
    CaptureTimeout(std::time::Duration),

    #[error("Strip length mismatch: expected {expected} samples, got {actual}")]
    StripLength { expected: usize, actual: usize },

    #[error("Raw pixel buffer of {len} bytes is not a multiple of stride {stride}")]
    RawBuffer { len: usize, stride: usize },

    #[error("Actuation failed: {0}")]
    Actuation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Worker thread panicked: {0}")]
    ThreadPanic(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ServoError {
    pub fn capture<S: Into<String>>(msg: S) -> Self {
        Self::Capture(msg.into())
    }

    pub fn actuation<S: Into<String>>(msg: S) -> Self {
        Self::Actuation(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

}

/// Non-fatal per-tick faults. Each one suppresses actuation and resets the
/// controller for that tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalFault {
    /// No colored pixels in the strip.
    SignalLost,
    /// Colored band wider than the reliability limit.
    SignalUnreliable,
    /// The capture collaborator produced no usable strip.
    CaptureFailure,
}

impl std::fmt::Display for SignalFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalFault::SignalLost => write!(f, "SignalLost"),
            SignalFault::SignalUnreliable => write!(f, "SignalUnreliable"),
            SignalFault::CaptureFailure => write!(f, "CaptureFailure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_their_context() {
        assert_eq!(ServoError::capture("no display").to_string(), "Capture failed: no display");
        assert_eq!(
            ServoError::StripLength { expected: 4, actual: 3 }.to_string(),
            "Strip length mismatch: expected 4 samples, got 3"
        );
        assert_eq!(ServoError::config("bad").to_string(), "Configuration error: bad");
    }

    #[test]
    fn io_errors_convert() {
        let err: ServoError = std::io::Error::new(std::io::ErrorKind::Other, "spawn").into();
        assert!(matches!(err, ServoError::Io(_)));
    }
}
