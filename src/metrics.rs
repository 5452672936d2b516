//! Metrics module - Per-tick timing histograms

use hdrhistogram::Histogram;
use std::time::Duration;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// TIMING METRICS - Thread-safe latency tracking
// ============================================================================

fn histogram() -> Arc<Mutex<Histogram<u64>>> {
    // 3 significant figures is always within hdrhistogram's supported range
    Arc::new(Mutex::new(Histogram::new(3).expect("valid histogram precision")))
}

#[derive(Clone)]
pub struct TimingMetrics {
    capture_hist: Arc<Mutex<Histogram<u64>>>,
    processing_hist: Arc<Mutex<Histogram<u64>>>,
    tick_hist: Arc<Mutex<Histogram<u64>>>,
    // Deviation of the tick-to-tick interval from the configured period
    last_tick_start_ns: Arc<AtomicU64>,
    jitter_hist: Arc<Mutex<Histogram<u64>>>,
}

impl Default for TimingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingMetrics {
    pub fn new() -> Self {
        Self {
            capture_hist: histogram(),
            processing_hist: histogram(),
            tick_hist: histogram(),
            last_tick_start_ns: Arc::new(AtomicU64::new(0)),
            jitter_hist: histogram(),
        }
    }

    pub fn record_capture(&self, duration: Duration) {
        self.capture_hist.lock().record(duration.as_nanos() as u64).ok();
    }

    /// Detection, classification and control for one tick.
    pub fn record_processing(&self, duration: Duration) {
        self.processing_hist.lock().record(duration.as_nanos() as u64).ok();
    }

    /// Capture through actuation for one tick.
    pub fn record_tick(&self, duration: Duration) {
        self.tick_hist.lock().record(duration.as_nanos() as u64).ok();
    }

    /// `start_ns` is the tick start relative to loop start.
    pub fn record_tick_start(&self, start_ns: u64, period: Duration) {
        let last = self.last_tick_start_ns.swap(start_ns.max(1), Ordering::Relaxed);
        if last > 0 {
            let interval = start_ns.saturating_sub(last);
            let period_ns = period.as_nanos() as u64;
            self.jitter_hist.lock().record(interval.abs_diff(period_ns)).ok();
        }
    }

    pub fn report(&self) -> MetricsReport {
        let capture = self.capture_hist.lock();
        let proc = self.processing_hist.lock();
        let tick = self.tick_hist.lock();
        let jitter = self.jitter_hist.lock();

        MetricsReport {
            samples: tick.len(),
            capture_p50: Duration::from_nanos(capture.value_at_quantile(0.5)),
            capture_p99: Duration::from_nanos(capture.value_at_quantile(0.99)),
            processing_p50: Duration::from_nanos(proc.value_at_quantile(0.5)),
            processing_p99: Duration::from_nanos(proc.value_at_quantile(0.99)),
            tick_p50: Duration::from_nanos(tick.value_at_quantile(0.5)),
            tick_p99: Duration::from_nanos(tick.value_at_quantile(0.99)),
            jitter_p50: Duration::from_nanos(jitter.value_at_quantile(0.5)),
            jitter_p99: Duration::from_nanos(jitter.value_at_quantile(0.99)),
        }
    }
}

// ============================================================================
// METRICS REPORT - Summary statistics
// ============================================================================

#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub samples: u64,
    pub capture_p50: Duration,
    pub capture_p99: Duration,
    pub processing_p50: Duration,
    pub processing_p99: Duration,
    pub tick_p50: Duration,
    pub tick_p99: Duration,
    pub jitter_p50: Duration,
    pub jitter_p99: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_reflects_recorded_ticks() {
        let metrics = TimingMetrics::new();
        for _ in 0..10 {
            metrics.record_tick(Duration::from_micros(100));
        }
        let report = metrics.report();
        assert_eq!(report.samples, 10);
        assert!(report.tick_p50 >= Duration::from_micros(99));
        assert!(report.tick_p99 <= Duration::from_micros(101));
    }

    #[test]
    fn jitter_measures_period_deviation() {
        let metrics = TimingMetrics::new();
        let period = Duration::from_millis(10);
        metrics.record_tick_start(1_000_000, period);
        metrics.record_tick_start(13_000_000, period);
        let report = metrics.report();
        let jitter = report.jitter_p50.as_nanos() as i64;
        assert!((jitter - 2_000_000).abs() < 5_000);
    }
}
