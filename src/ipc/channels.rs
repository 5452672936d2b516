use crossbeam::channel::{bounded, Receiver, Sender};

use crate::error::Result;
use crate::sensor::strip::{PixelStrip, StripRegion};

#[derive(Debug, Clone, Copy)]
pub struct CaptureRequest {
    pub sequence_id: u64,
    pub region: StripRegion,
}

#[derive(Debug)]
pub struct CaptureResponse {
    pub sequence_id: u64,
    pub result: Result<PixelStrip>,
}

pub struct CaptureChannels {
    // Loop -> capture worker
    pub request_tx: Sender<CaptureRequest>,
    pub request_rx: Receiver<CaptureRequest>,

    // Capture worker -> loop
    pub response_tx: Sender<CaptureResponse>,
    pub response_rx: Receiver<CaptureResponse>,
}

impl CaptureChannels {
    /// A single queued request at most; responses get `buffer_size` slots so
    /// late answers never block the worker.
    pub fn new(buffer_size: usize) -> Self {
        let (request_tx, request_rx) = bounded(1);
        let (response_tx, response_rx) = bounded(buffer_size.max(1));

        Self {
            request_tx,
            request_rx,
            response_tx,
            response_rx,
        }
    }
}
