use super::strip::{ChannelOrder, PixelStrip, StripRegion};
use crate::config::ServoConfig;
use crate::error::Result;

/// Supplies one strip per tick.
///
/// Implementations must return RGB-normalized samples. Sources that hand out
/// raw screen bytes go through [`RawCapture`]. The loop rejects strips whose
/// length differs from the configured width.
pub trait StripCapture {
    fn capture(&mut self, region: &StripRegion) -> Result<PixelStrip>;
}

impl<C: StripCapture + ?Sized> StripCapture for Box<C> {
    fn capture(&mut self, region: &StripRegion) -> Result<PixelStrip> {
        (**self).capture(region)
    }
}

impl<C: StripCapture + ?Sized> StripCapture for &mut C {
    fn capture(&mut self, region: &StripRegion) -> Result<PixelStrip> {
        (**self).capture(region)
    }
}

/// A screen grabber returning one row of pixels in its native byte layout.
pub trait RawStripSource {
    fn grab(&mut self, region: &StripRegion) -> Result<Vec<u8>>;
}

/// Normalizes a [`RawStripSource`] to RGB samples using the configured
/// channel order.
pub struct RawCapture<S> {
    source: S,
    order: ChannelOrder,
}

impl<S: RawStripSource> RawCapture<S> {
    pub fn new(source: S, order: ChannelOrder) -> Self {
        Self { source, order }
    }

    pub fn from_config(source: S, config: &ServoConfig) -> Self {
        Self::new(source, config.strip.channel_order)
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: RawStripSource> StripCapture for RawCapture<S> {
    fn capture(&mut self, region: &StripRegion) -> Result<PixelStrip> {
        let bytes = self.source.grab(region)?;
        PixelStrip::from_raw(&bytes, self.order)
    }
}
