use serde::Deserialize;

use super::strip::Sample;
use crate::error::{Result, ServoError};

/// Decides whether a sample belongs to the guide band.
pub trait ColorPredicate {
    fn is_colored(&self, sample: Sample) -> bool;
}

impl<F> ColorPredicate for F
where
    F: Fn(Sample) -> bool,
{
    fn is_colored(&self, sample: Sample) -> bool {
        self(sample)
    }
}

/// Inclusive per-channel ranges. A sample matches when all three channels fall
/// inside their range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorThresholds {
    pub red_min: u8,
    pub red_max: u8,
    pub green_min: u8,
    pub green_max: u8,
    pub blue_min: u8,
    pub blue_max: u8,
}

impl Default for ColorThresholds {
    fn default() -> Self {
        Self {
            red_min: 200,
            red_max: 255,
            green_min: 0,
            green_max: 35,
            blue_min: 0,
            blue_max: 35,
        }
    }
}

impl ColorThresholds {
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("red", self.red_min, self.red_max),
            ("green", self.green_min, self.green_max),
            ("blue", self.blue_min, self.blue_max),
        ];
        for (name, min, max) in ranges {
            if min > max {
                return Err(ServoError::config(format!(
                    "color.{name}_min ({min}) exceeds color.{name}_max ({max})"
                )));
            }
        }
        Ok(())
    }
}

impl ColorPredicate for ColorThresholds {
    fn is_colored(&self, s: Sample) -> bool {
        (self.red_min..=self.red_max).contains(&s.red)
            && (self.green_min..=self.green_max).contains(&s.green)
            && (self.blue_min..=self.blue_max).contains(&s.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let t = ColorThresholds::default();
        assert!(t.is_colored(Sample::new(200, 0, 0)));
        assert!(t.is_colored(Sample::new(255, 35, 35)));
        assert!(!t.is_colored(Sample::new(199, 0, 0)));
        assert!(!t.is_colored(Sample::new(255, 36, 0)));
        assert!(!t.is_colored(Sample::new(255, 0, 36)));
    }

    #[test]
    fn closures_are_predicates() {
        let blue = |s: Sample| s.blue > 200 && s.red < 50;
        assert!(blue.is_colored(Sample::new(0, 0, 255)));
        assert!(!blue.is_colored(Sample::new(255, 0, 0)));
    }
}
