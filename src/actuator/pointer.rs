use crate::error::Result;

/// Relative pointer output. The servo only ever moves horizontally; `dy` is
/// passed as zero.
pub trait PointerActuator {
    /// Positive `dx` moves right.
    fn move_by(&mut self, dx: f64, dy: f64) -> Result<()>;
}

impl<A: PointerActuator + ?Sized> PointerActuator for Box<A> {
    fn move_by(&mut self, dx: f64, dy: f64) -> Result<()> {
        (**self).move_by(dx, dy)
    }
}

impl<A: PointerActuator + ?Sized> PointerActuator for &mut A {
    fn move_by(&mut self, dx: f64, dy: f64) -> Result<()> {
        (**self).move_by(dx, dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMove {
    pub dx: f64,
    pub dy: f64,
}

/// Keeps every move it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingPointer {
    moves: Vec<PointerMove>,
}

impl RecordingPointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn moves(&self) -> &[PointerMove] {
        &self.moves
    }

    /// Sum of all horizontal moves.
    pub fn total_dx(&self) -> f64 {
        self.moves.iter().map(|m| m.dx).sum()
    }
}

impl PointerActuator for RecordingPointer {
    fn move_by(&mut self, dx: f64, dy: f64) -> Result<()> {
        self.moves.push(PointerMove { dx, dy });
        Ok(())
    }
}
