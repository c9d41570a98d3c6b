//! SymbolTiming trait - Sample/symbol rate relationship

/// Symbol timing trait
///
/// Implementations define how many samples one keyed symbol occupies.
pub trait SymbolTiming: Send + Sync {
    /// Samples per symbol period (always >= 1)
    fn samples_per_symbol(&self) -> usize;

    /// Sample rate in Hz
    fn sample_rate(&self) -> f64;

    /// Symbol rate in baud
    fn symbol_rate(&self) -> f64;

    /// Symbol period in seconds
    fn symbol_period(&self) -> f64 {
        1.0 / self.symbol_rate()
    }

    /// Convert a duration in seconds to the nearest whole sample count
    fn samples_for(&self, seconds: f64) -> usize {
        (seconds * self.sample_rate()).round().max(0.0) as usize
    }
}
