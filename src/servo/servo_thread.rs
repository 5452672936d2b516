use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use super::control_loop::{ControlLoop, TickReport};
use crate::actuator::pointer::PointerActuator;
use crate::error::Result;
use crate::sensor::capture::StripCapture;
use crate::sensor::color::ColorPredicate;

pub struct LoopStats {
    pub total_ticks: AtomicU64,
    pub tracking_ticks: AtomicU64,
    pub lost_ticks: AtomicU64,
    pub unreliable_ticks: AtomicU64,
    pub capture_failures: AtomicU64,
    pub actuations: AtomicU64,
    pub actuation_failures: AtomicU64,
    pub overruns: AtomicU64,
    /// Cooperative stop flag, checked once per tick.
    pub shutdown: AtomicBool,
}

impl LoopStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_ticks: AtomicU64::new(0),
            tracking_ticks: AtomicU64::new(0),
            lost_ticks: AtomicU64::new(0),
            unreliable_ticks: AtomicU64::new(0),
            capture_failures: AtomicU64::new(0),
            actuations: AtomicU64::new(0),
            actuation_failures: AtomicU64::new(0),
            overruns: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
        })
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_ticks: self.total_ticks.load(Ordering::Relaxed),
            tracking_ticks: self.tracking_ticks.load(Ordering::Relaxed),
            lost_ticks: self.lost_ticks.load(Ordering::Relaxed),
            unreliable_ticks: self.unreliable_ticks.load(Ordering::Relaxed),
            capture_failures: self.capture_failures.load(Ordering::Relaxed),
            actuations: self.actuations.load(Ordering::Relaxed),
            actuation_failures: self.actuation_failures.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub total_ticks: u64,
    pub tracking_ticks: u64,
    pub lost_ticks: u64,
    pub unreliable_ticks: u64,
    pub capture_failures: u64,
    pub actuations: u64,
    pub actuation_failures: u64,
    pub overruns: u64,
}

impl StatsSnapshot {
    /// Percentage of ticks that finished within their period.
    pub fn deadline_compliance(&self) -> f64 {
        if self.total_ticks > 0 {
            (self.total_ticks.saturating_sub(self.overruns) as f64 / self.total_ticks as f64) * 100.0
        } else {
            100.0
        }
    }

    /// Percentage of ticks with a trustworthy band.
    pub fn tracking_ratio(&self) -> f64 {
        if self.total_ticks > 0 {
            (self.tracking_ticks as f64 / self.total_ticks as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Moves the loop onto its own thread. Raise `shutdown` on the returned stats
/// to stop it; joining hands the loop back.
pub fn spawn_servo_thread<C, A, P, F>(
    mut control_loop: ControlLoop<C, A, P>,
    on_tick: F,
) -> Result<(thread::JoinHandle<ControlLoop<C, A, P>>, Arc<LoopStats>)>
where
    C: StripCapture + Send + 'static,
    A: PointerActuator + Send + 'static,
    P: ColorPredicate + Send + 'static,
    F: FnMut(&TickReport) + Send + 'static,
{
    let stats = control_loop.stats();

    let handle = thread::Builder::new()
        .name("servo-loop".to_string())
        .spawn(move || {
            control_loop.run(on_tick);
            control_loop
        })?;

    Ok((handle, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compliance_and_ratio() {
        let snapshot = StatsSnapshot { total_ticks: 200, tracking_ticks: 150, overruns: 10, ..Default::default() };
        assert_eq!(snapshot.deadline_compliance(), 95.0);
        assert_eq!(snapshot.tracking_ratio(), 75.0);
        assert_eq!(StatsSnapshot::default().deadline_compliance(), 100.0);
    }
}
