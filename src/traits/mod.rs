//! Core traits for the estimation engine
//!
//! Each trait is one seam of the pipeline: carrier generation, symbol
//! timing, lag search, and reporting back to the host.

mod carrier;
mod timing;
mod correlator;
mod report;

pub use carrier::Carrier;
pub use timing::SymbolTiming;
pub use correlator::Correlator;
pub use report::ReportSink;
