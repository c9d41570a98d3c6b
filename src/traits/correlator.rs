//! Correlator trait - lag search between two sample buffers

use rustfft::num_complex::Complex64;

use crate::error::EstimationResult;

/// Cross-correlation algorithm
///
/// For every lag `k` in `[0, received.len() - reference.len())` the result
/// holds `Σ received[i + k] · conj(reference[i]) / reference.len()`.
/// Implementations differ in cost, never in the values they return (up to
/// floating-point rounding).
pub trait Correlator: Send + Sync {
    /// Correlate a long received buffer against a shorter reference
    ///
    /// # Errors
    /// `ReferenceLongerThanReceived` when the arguments are swapped,
    /// `EmptyReference` when there is nothing to normalise by.
    fn correlate(
        &self,
        received: &[Complex64],
        reference: &[Complex64],
    ) -> EstimationResult<Vec<Complex64>>;

    /// Short algorithm name for logs
    fn name(&self) -> &'static str;
}
