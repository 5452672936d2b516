use super::color::ColorPredicate;
use super::strip::PixelStrip;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionResult {
    NotFound,
    /// Leftmost and rightmost colored indices, `first <= last`.
    Band { first: usize, last: usize },
}

impl DetectionResult {
    /// `last - first`, or `None` when nothing matched.
    pub fn width(&self) -> Option<usize> {
        match *self {
            DetectionResult::NotFound => None,
            DetectionResult::Band { first, last } => Some(last - first),
        }
    }
}

/// Finds the global leftmost and rightmost samples accepted by `predicate`.
///
/// Every sample is visited; the band spans the extremes even when uncolored
/// gaps lie between them.
pub fn detect<P>(strip: &PixelStrip, predicate: &P) -> DetectionResult
where
    P: ColorPredicate + ?Sized,
{
    let mut extremes: Option<(usize, usize)> = None;

    for (x, &sample) in strip.iter().enumerate() {
        if !predicate.is_colored(sample) {
            continue;
        }
        extremes = match extremes {
            None => Some((x, x)),
            Some((first, last)) => Some((first.min(x), last.max(x))),
        };
    }

    match extremes {
        Some((first, last)) => DetectionResult::Band { first, last },
        None => DetectionResult::NotFound,
    }
}
