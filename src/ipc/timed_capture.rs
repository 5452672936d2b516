use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use log::debug;

use super::channels::{CaptureChannels, CaptureRequest, CaptureResponse};
use crate::error::{Result, ServoError};
use crate::sensor::capture::StripCapture;
use crate::sensor::strip::{PixelStrip, StripRegion};

/// Runs a [`StripCapture`] on its own thread and bounds every request by a
/// timeout.
///
/// The caller still sees a plain blocking `capture`, so ticks stay strictly
/// sequential. Answers that arrive after their request timed out are matched
/// by sequence id and dropped.
pub struct TimedCapture {
    request_tx: Option<Sender<CaptureRequest>>,
    response_rx: Receiver<CaptureResponse>,
    timeout: Duration,
    next_sequence: u64,
    handle: Option<thread::JoinHandle<()>>,
}

impl TimedCapture {
    pub fn spawn<C>(mut capture: C, timeout: Duration) -> Result<Self>
    where
        C: StripCapture + Send + 'static,
    {
        let channels = CaptureChannels::new(4);
        let request_rx = channels.request_rx;
        let response_tx = channels.response_tx;

        let handle = thread::Builder::new()
            .name("strip-capture".to_string())
            .spawn(move || {
                for request in request_rx.iter() {
                    let result = capture.capture(&request.region);
                    let response = CaptureResponse { sequence_id: request.sequence_id, result };
                    if response_tx.send(response).is_err() {
                        break;
                    }
                }
                debug!("capture worker exiting");
            })?;

        Ok(Self {
            request_tx: Some(channels.request_tx),
            response_rx: channels.response_rx,
            timeout,
            next_sequence: 0,
            handle: Some(handle),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Stops the worker and waits for it. Blocks if a capture is stuck.
    pub fn shutdown(mut self) {
        self.request_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn worker_gone() -> ServoError {
        ServoError::capture("capture worker stopped")
    }
}

impl StripCapture for TimedCapture {
    fn capture(&mut self, region: &StripRegion) -> Result<PixelStrip> {
        let sequence_id = self.next_sequence;
        self.next_sequence += 1;
        let deadline = Instant::now() + self.timeout;

        while let Ok(stale) = self.response_rx.try_recv() {
            debug!("discarding late strip #{}", stale.sequence_id);
        }

        let tx = self.request_tx.as_ref().ok_or_else(Self::worker_gone)?;
        let request = CaptureRequest { sequence_id, region: *region };
        match tx.send_timeout(request, self.timeout) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => return Err(ServoError::CaptureTimeout(self.timeout)),
            Err(SendTimeoutError::Disconnected(_)) => return Err(Self::worker_gone()),
        }

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.response_rx.recv_timeout(remaining) {
                Ok(response) if response.sequence_id == sequence_id => return response.result,
                Ok(stale) => debug!("discarding late strip #{}", stale.sequence_id),
                Err(RecvTimeoutError::Timeout) => return Err(ServoError::CaptureTimeout(self.timeout)),
                Err(RecvTimeoutError::Disconnected) => return Err(Self::worker_gone()),
            }
        }
    }
}

impl Drop for TimedCapture {
    fn drop(&mut self) {
        // Closing the request channel lets the worker finish on its own.
        self.request_tx.take();
    }
}
