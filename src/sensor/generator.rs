use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::capture::{RawStripSource, StripCapture};
use super::strip::{ChannelOrder, PixelStrip, Sample, StripRegion};
use crate::actuator::pointer::PointerActuator;
use crate::error::Result;

/// Simulated capture source: a noisy grey background with a red guide band.
///
/// The band drifts by `drift_per_tick` and is pushed back by moves applied
/// through the paired [`SimulatedSteering`].
pub struct SyntheticRoute {
    rng: StdRng,
    sequence_counter: u64,
    steering_offset: Arc<Mutex<f64>>,
    pub base_center: f64,
    pub band_width: usize,
    pub drift_per_tick: f64,
    pub noise_amplitude: u8,
    /// Chance per tick that the band is missing.
    pub dropout_probability: f64,
    /// Chance per tick that the band is smeared over most of the strip.
    pub glare_probability: f64,
    /// Byte layout used when read as a [`RawStripSource`].
    pub raw_order: ChannelOrder,
}

/// NaN counts as "never".
fn chance(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

impl SyntheticRoute {
    pub fn new(seed: u64, base_center: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            sequence_counter: 0,
            steering_offset: Arc::new(Mutex::new(0.0)),
            base_center,
            band_width: 7,
            drift_per_tick: 0.0,
            noise_amplitude: 60,
            dropout_probability: 0.0,
            glare_probability: 0.0,
            raw_order: ChannelOrder::Bgra,
        }
    }

    /// Actuator that steers this route. Moving right shifts the band left.
    pub fn steering(&self, gain: f64) -> SimulatedSteering {
        SimulatedSteering {
            offset: self.steering_offset.clone(),
            gain,
        }
    }

    /// Band center as it will be rendered on the next capture, before drift.
    pub fn band_center(&self) -> f64 {
        self.base_center - *self.steering_offset.lock()
    }

    pub fn get_sequence(&self) -> u64 {
        self.sequence_counter
    }

    pub fn inject_disturbance(&mut self, center_delta: f64) {
        self.base_center += center_delta;
    }

    fn background(&mut self) -> Sample {
        let noise = self.noise_amplitude;
        let channel = |rng: &mut StdRng| 80u8.saturating_add(rng.gen_range(0..=noise));
        let red = channel(&mut self.rng);
        let green = channel(&mut self.rng);
        let blue = channel(&mut self.rng);
        Sample::new(red.min(190), green, blue)
    }

    fn band(&mut self) -> Sample {
        Sample::new(
            self.rng.gen_range(220..=255),
            self.rng.gen_range(0..=20),
            self.rng.gen_range(0..=20),
        )
    }

    pub fn generate(&mut self, width: usize) -> PixelStrip {
        self.sequence_counter += 1;
        self.base_center += self.drift_per_tick;

        let dropout = self.rng.gen_bool(chance(self.dropout_probability));
        let glare = self.rng.gen_bool(chance(self.glare_probability));

        let span = if dropout {
            None
        } else if glare {
            Some((0i64, width as i64 - 1))
        } else {
            let half = (self.band_width.max(1) as f64 - 1.0) / 2.0;
            let start = (self.band_center() - half).round() as i64;
            Some((start, start + self.band_width.max(1) as i64 - 1))
        };

        (0..width)
            .map(|x| {
                let x = x as i64;
                match span {
                    Some((start, end)) if (start..=end).contains(&x) => self.band(),
                    _ => self.background(),
                }
            })
            .collect()
    }
}

impl StripCapture for SyntheticRoute {
    fn capture(&mut self, region: &StripRegion) -> Result<PixelStrip> {
        Ok(self.generate(region.width))
    }
}

impl RawStripSource for SyntheticRoute {
    fn grab(&mut self, region: &StripRegion) -> Result<Vec<u8>> {
        let order = self.raw_order;
        let strip = self.generate(region.width);
        let mut bytes = Vec::with_capacity(strip.len() * order.stride());
        for &sample in strip.iter() {
            order.encode(sample, &mut bytes);
        }
        Ok(bytes)
    }
}

/// Pointer stand-in that feeds horizontal moves back into a [`SyntheticRoute`].
#[derive(Clone)]
pub struct SimulatedSteering {
    offset: Arc<Mutex<f64>>,
    gain: f64,
}

impl SimulatedSteering {
    pub fn offset(&self) -> f64 {
        *self.offset.lock()
    }
}

impl PointerActuator for SimulatedSteering {
    fn move_by(&mut self, dx: f64, _dy: f64) -> Result<()> {
        *self.offset.lock() += dx * self.gain;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::color::ColorThresholds;
    use crate::sensor::edge::{detect, DetectionResult};

    #[test]
    fn band_is_rendered_around_center() {
        let mut route = SyntheticRoute::new(7, 63.0);
        let strip = route.generate(128);
        assert_eq!(strip.len(), 128);
        assert_eq!(
            detect(&strip, &ColorThresholds::default()),
            DetectionResult::Band { first: 60, last: 66 }
        );
        assert_eq!(route.get_sequence(), 1);
    }

    #[test]
    fn background_never_matches_default_thresholds() {
        let mut route = SyntheticRoute::new(1, 0.0);
        route.dropout_probability = 1.0;
        route.noise_amplitude = 255;
        for _ in 0..50 {
            assert_eq!(detect(&route.generate(64), &ColorThresholds::default()), DetectionResult::NotFound);
        }
    }

    #[test]
    fn glare_covers_the_strip() {
        let mut route = SyntheticRoute::new(3, 20.0);
        route.glare_probability = 1.0;
        assert_eq!(
            detect(&route.generate(32), &ColorThresholds::default()),
            DetectionResult::Band { first: 0, last: 31 }
        );
    }

    #[test]
    fn nan_probabilities_never_fire() {
        let mut route = SyntheticRoute::new(4, 30.0);
        route.dropout_probability = f64::NAN;
        route.glare_probability = f64::NAN;
        for _ in 0..20 {
            assert_eq!(
                detect(&route.generate(64), &ColorThresholds::default()),
                DetectionResult::Band { first: 27, last: 33 }
            );
        }
    }

    #[test]
    fn raw_bytes_follow_raw_order() {
        let region = StripRegion { top: 0, left: 0, width: 16, height: 1 };
        let mut route = SyntheticRoute::new(11, 8.0);
        route.raw_order = ChannelOrder::Bgr;
        let bytes = route.grab(&region).unwrap();
        assert_eq!(bytes.len(), 16 * 3);
        let strip = PixelStrip::from_raw(&bytes, ChannelOrder::Bgr).unwrap();
        assert_eq!(
            detect(&strip, &ColorThresholds::default()),
            DetectionResult::Band { first: 5, last: 11 }
        );
    }

    #[test]
    fn steering_right_moves_band_left() {
        let route = SyntheticRoute::new(3, 50.0);
        let mut steering = route.steering(0.5);
        steering.move_by(10.0, 0.0).unwrap();
        assert_eq!(steering.offset(), 5.0);
        assert_eq!(route.band_center(), 45.0);
    }
}
