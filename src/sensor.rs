//! Sensor module - strip capture, color membership, band detection and classification

pub mod strip;
pub mod color;
pub mod edge;
pub mod classifier;
pub mod capture;
pub mod generator;

pub use strip::{ChannelOrder, PixelStrip, Sample, StripRegion};
pub use color::{ColorPredicate, ColorThresholds};
pub use edge::{detect, DetectionResult};
pub use classifier::{BandClassifier, TickState};
pub use capture::{RawCapture, RawStripSource, StripCapture};
pub use generator::{SimulatedSteering, SyntheticRoute};
