use std::mem::discriminant;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::servo_thread::LoopStats;
use crate::actuator::controller::{ControllerState, PidController, PidTerms};
use crate::actuator::pointer::PointerActuator;
use crate::config::ServoConfig;
use crate::error::{Result, ServoError, SignalFault};
use crate::metrics::TimingMetrics;
use crate::sensor::capture::StripCapture;
use crate::sensor::classifier::{BandClassifier, TickState};
use crate::sensor::color::{ColorPredicate, ColorThresholds};
use crate::sensor::edge::{detect, DetectionResult};
use crate::sensor::strip::{PixelStrip, StripRegion};

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub sequence_id: u64,
    /// `None` when no usable strip was captured.
    pub detection: Option<DetectionResult>,
    pub state: TickState,
    pub fault: Option<SignalFault>,
    pub terms: Option<PidTerms>,
    pub actuated: bool,
    pub elapsed: Duration,
}

impl TickReport {
    pub fn output(&self) -> Option<f64> {
        self.terms.map(|t| t.output)
    }
}

/// Capture → detect → classify → control → actuate, once per period.
///
/// Owns the controller history for its whole lifetime. Ticks never overlap:
/// the move for tick N is issued (or skipped) before tick N+1 captures.
pub struct ControlLoop<C, A, P = ColorThresholds> {
    config: ServoConfig,
    region: StripRegion,
    dt: f64,
    capture: C,
    actuator: A,
    predicate: P,
    classifier: BandClassifier,
    controller: PidController,
    state: ControllerState,
    stats: Arc<LoopStats>,
    metrics: TimingMetrics,
    sequence: u64,
    last_state: Option<TickState>,
    capture_failure_streak: u64,
}

impl<C, A> ControlLoop<C, A, ColorThresholds>
where
    C: StripCapture,
    A: PointerActuator,
{
    /// Builds a loop matching colors with the configured thresholds.
    pub fn new(config: ServoConfig, capture: C, actuator: A) -> Result<Self> {
        config.validate()?;
        let predicate = config.color;
        Ok(Self {
            region: config.region(),
            dt: config.dt(),
            classifier: BandClassifier::from_config(&config),
            controller: PidController::from_config(&config),
            config,
            capture,
            actuator,
            predicate,
            state: ControllerState::default(),
            stats: LoopStats::new(),
            metrics: TimingMetrics::new(),
            sequence: 0,
            last_state: None,
            capture_failure_streak: 0,
        })
    }
}

impl<C, A, P> ControlLoop<C, A, P>
where
    C: StripCapture,
    A: PointerActuator,
    P: ColorPredicate,
{
    /// Replaces the color membership test.
    pub fn with_predicate<Q: ColorPredicate>(self, predicate: Q) -> ControlLoop<C, A, Q> {
        ControlLoop {
            config: self.config,
            region: self.region,
            dt: self.dt,
            capture: self.capture,
            actuator: self.actuator,
            predicate,
            classifier: self.classifier,
            controller: self.controller,
            state: self.state,
            stats: self.stats,
            metrics: self.metrics,
            sequence: self.sequence,
            last_state: self.last_state,
            capture_failure_streak: self.capture_failure_streak,
        }
    }

    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    pub fn stats(&self) -> Arc<LoopStats> {
        self.stats.clone()
    }

    pub fn metrics(&self) -> &TimingMetrics {
        &self.metrics
    }

    pub fn controller_state(&self) -> ControllerState {
        self.state
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn into_parts(self) -> (C, A) {
        (self.capture, self.actuator)
    }

    fn acquire(&mut self) -> Result<PixelStrip> {
        let strip = self.capture.capture(&self.region)?;
        if strip.len() != self.region.width {
            return Err(ServoError::StripLength {
                expected: self.region.width,
                actual: strip.len(),
            });
        }
        Ok(strip)
    }

    /// Runs one tick without sleeping.
    pub fn tick(&mut self) -> TickReport {
        self.sequence += 1;
        let sequence_id = self.sequence;
        let tick_start = Instant::now();

        // 1. Capture
        let captured = self.acquire();
        self.metrics.record_capture(tick_start.elapsed());

        // 2. Detect, classify, control
        let proc_start = Instant::now();
        let (detection, state, fault) = match captured {
            Ok(strip) => {
                self.capture_failure_streak = 0;
                let detection = detect(&strip, &self.predicate);
                let state = self.classifier.classify(detection);
                (Some(detection), state, state.fault())
            }
            Err(err) => {
                self.capture_failure_streak += 1;
                if self.capture_failure_streak == 1 {
                    warn!("tick #{}: {}", sequence_id, err);
                } else {
                    debug!("tick #{}: {} ({} in a row)", sequence_id, err, self.capture_failure_streak);
                }
                (None, TickState::Lost, Some(SignalFault::CaptureFailure))
            }
        };
        let terms = self.controller.step_terms(&state, &mut self.state, self.dt);
        self.metrics.record_processing(proc_start.elapsed());

        self.record_state(sequence_id, state, fault);

        // 3. Actuate
        let mut actuated = false;
        if let Some(terms) = terms {
            match self.actuator.move_by(terms.output, 0.0) {
                Ok(()) => {
                    actuated = true;
                    self.stats.actuations.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    warn!("tick #{}: {}", sequence_id, err);
                    self.stats.actuation_failures.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        let elapsed = tick_start.elapsed();
        self.metrics.record_tick(elapsed);

        TickReport { sequence_id, detection, state, fault, terms, actuated, elapsed }
    }

    fn record_state(&mut self, sequence_id: u64, state: TickState, fault: Option<SignalFault>) {
        self.stats.total_ticks.fetch_add(1, Ordering::Relaxed);
        let counter = match fault {
            None => &self.stats.tracking_ticks,
            Some(SignalFault::SignalLost) => &self.stats.lost_ticks,
            Some(SignalFault::SignalUnreliable) => &self.stats.unreliable_ticks,
            Some(SignalFault::CaptureFailure) => &self.stats.capture_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        let changed = self
            .last_state
            .map_or(true, |last| discriminant(&last) != discriminant(&state));
        if changed {
            debug!("tick #{}: {}", sequence_id, state.label());
        }
        self.last_state = Some(state);
    }

    /// Ticks at the configured rate until the shutdown flag is raised.
    pub fn run<F>(&mut self, on_tick: F) -> u64
    where
        F: FnMut(&TickReport),
    {
        self.drive(None, on_tick)
    }

    /// Ticks at the configured rate, at most `ticks` times.
    pub fn run_ticks<F>(&mut self, ticks: u64, on_tick: F) -> u64
    where
        F: FnMut(&TickReport),
    {
        self.drive(Some(ticks), on_tick)
    }

    fn drive<F>(&mut self, limit: Option<u64>, mut on_tick: F) -> u64
    where
        F: FnMut(&TickReport),
    {
        let period = self.config.tick_period();
        let loop_start = Instant::now();
        let mut next_tick = loop_start;
        let mut count = 0u64;

        info!(
            "servo loop started: {} px strip at ({}, {}), {:.1} Hz",
            self.region.width, self.region.left, self.region.top, self.config.timing.iteration_rate
        );

        loop {
            if self.stats.shutdown.load(Ordering::Relaxed) {
                break;
            }
            if limit.map_or(false, |limit| count >= limit) {
                break;
            }

            let start_ns = loop_start.elapsed().as_nanos() as u64;
            self.metrics.record_tick_start(start_ns, period);

            let report = self.tick();
            on_tick(&report);
            count += 1;

            // Sleep to the next boundary; after an overrun, re-anchor instead of bursting
            next_tick += period;
            let now = Instant::now();
            if now < next_tick {
                thread::sleep(next_tick - now);
            } else {
                self.stats.overruns.fetch_add(1, Ordering::Relaxed);
                next_tick = now;
            }
        }

        info!("servo loop stopped after {} ticks", count);
        count
    }
}
