use serde::Deserialize;

use crate::error::{Result, ServoError};

/// One pixel, channels normalized to red/green/blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sample {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Sample {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// Byte layout of a raw capture buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    Rgb,
    Bgr,
    Rgba,
    Bgra,
}

impl ChannelOrder {
    /// Bytes per pixel.
    pub fn stride(self) -> usize {
        match self {
            ChannelOrder::Rgb | ChannelOrder::Bgr => 3,
            ChannelOrder::Rgba | ChannelOrder::Bgra => 4,
        }
    }

    fn sample(self, px: &[u8]) -> Sample {
        match self {
            ChannelOrder::Rgb | ChannelOrder::Rgba => Sample::new(px[0], px[1], px[2]),
            ChannelOrder::Bgr | ChannelOrder::Bgra => Sample::new(px[2], px[1], px[0]),
        }
    }

    /// Appends `sample` in this layout; alpha is written opaque.
    pub fn encode(self, sample: Sample, out: &mut Vec<u8>) {
        match self {
            ChannelOrder::Rgb => out.extend_from_slice(&[sample.red, sample.green, sample.blue]),
            ChannelOrder::Bgr => out.extend_from_slice(&[sample.blue, sample.green, sample.red]),
            ChannelOrder::Rgba => out.extend_from_slice(&[sample.red, sample.green, sample.blue, 255]),
            ChannelOrder::Bgra => out.extend_from_slice(&[sample.blue, sample.green, sample.red, 255]),
        }
    }
}

/// Screen area a strip is grabbed from. `height` is always 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripRegion {
    pub top: i32,
    pub left: i32,
    pub width: usize,
    pub height: usize,
}

/// A single row of samples, index 0 is the leftmost pixel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelStrip {
    samples: Vec<Sample>,
}

impl PixelStrip {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Normalizes a raw row buffer into RGB samples.
    pub fn from_raw(bytes: &[u8], order: ChannelOrder) -> Result<Self> {
        let stride = order.stride();
        if bytes.len() % stride != 0 {
            return Err(ServoError::RawBuffer { len: bytes.len(), stride });
        }
        let samples = bytes.chunks_exact(stride).map(|px| order.sample(px)).collect();
        Ok(Self { samples })
    }

    /// A strip of `width` copies of `sample`.
    pub fn filled(width: usize, sample: Sample) -> Self {
        Self { samples: vec![sample; width] }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }
}

impl From<Vec<Sample>> for PixelStrip {
    fn from(samples: Vec<Sample>) -> Self {
        Self::new(samples)
    }
}

impl FromIterator<Sample> for PixelStrip {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
