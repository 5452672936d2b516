//! Single-line console status, overwritten every tick

use std::io::{self, Write};

use log::warn;

use crate::error::SignalFault;
use crate::servo::control_loop::TickReport;
use crate::sensor::classifier::TickState;

pub fn status_line(report: &TickReport) -> String {
    if let Some(t) = report.terms {
        return format!(
            "P: {:+8.3}  I: {:+8.3}  D: {:+8.3}  error: {:+7.2}  change: {:+7.2}  move: {:+7.2}",
            t.p, t.i, t.d, t.error, t.change, t.output
        );
    }
    match (report.state, report.fault) {
        (_, Some(SignalFault::CaptureFailure)) => "Route out of sight (capture failed)".to_string(),
        (TickState::Tracking(error), _) => format!("Acquiring route  error: {:+7.2}", error),
        (state, _) => state.label().to_string(),
    }
}

/// Writes status lines with a leading carriage return, padding over any
/// longer previous line.
pub struct StatusPrinter<W: Write> {
    out: W,
    last_len: usize,
    write_failures: u64,
}

impl StatusPrinter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StatusPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, last_len: 0, write_failures: 0 }
    }

    pub fn print(&mut self, report: &TickReport) -> io::Result<()> {
        let line = status_line(report);
        write!(self.out, "\r{:<width$}", line, width = self.last_len)?;
        self.last_len = line.len();
        self.out.flush()
    }

    /// Like [`print`](Self::print), but a failed write only counts. The first
    /// failure is logged.
    pub fn show(&mut self, report: &TickReport) {
        if let Err(err) = self.print(report) {
            if self.write_failures == 0 {
                warn!("status output failed: {}", err);
            }
            self.write_failures += 1;
        }
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    /// Ends the status line so later output starts on a fresh row.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.last_len > 0 {
            writeln!(self.out)?;
            self.last_len = 0;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
