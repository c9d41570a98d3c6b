//! ReportSink trait - status and diagnostics back to the host

use crate::estimation::{Diagnostics, SweepPoint};

/// Receiver for orchestrator output
///
/// Called from worker threads, hence `Send + Sync`.
pub trait ReportSink: Send + Sync {
    /// Coarse progress text ("Trial 10 of 100", "Cancelled", ...)
    fn on_status(&self, text: &str);

    /// Buffers of the one designated diagnostic trial
    fn on_diagnostic(&self, diagnostics: &Diagnostics);

    /// One completed point of a sweep
    fn on_sweep_point(&self, _point: &SweepPoint) {}
}
