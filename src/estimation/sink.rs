//! Stock `ReportSink` implementations

use tracing::{debug, info};

use super::orchestrator::SweepPoint;
use super::scenario::Diagnostics;
use crate::traits::ReportSink;

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn on_status(&self, _text: &str) {}

    fn on_diagnostic(&self, _diagnostics: &Diagnostics) {}
}

/// Forwards reports to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn on_status(&self, text: &str) {
        info!(target: "multipath_signal::status", "{}", text);
    }

    fn on_diagnostic(&self, diagnostics: &Diagnostics) {
        debug!(
            target: "multipath_signal::status",
            clean = diagnostics.clean.len(),
            impaired = diagnostics.impaired.len(),
            lags = diagnostics.correlation.len(),
            estimate = diagnostics.estimate,
            "diagnostic trial"
        );
    }

    fn on_sweep_point(&self, point: &SweepPoint) {
        info!(target: "multipath_signal::status", x = point.x, value = point.value, "sweep point");
    }
}
