//! Error taxonomy for the estimation core
//!
//! Argument errors are contract violations by the caller and are never
//! retried. Consistency errors mean an internal invariant broke. Cancellation
//! is not represented here: batch calls report it through
//! [`RunOutcome`](crate::estimation::RunOutcome).

/// Result type for estimation operations
pub type EstimationResult<T> = Result<T, EstimationError>;

/// Errors raised by the signal-processing and estimation pipeline
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimationError {
    #[error("reference ({reference} samples) is longer than received ({received} samples); place the larger array first")]
    ReferenceLongerThanReceived { received: usize, reference: usize },

    #[error("reference buffer is empty")]
    EmptyReference,

    #[error("register structures differ in length: {left} vs {right}")]
    StructureLengthMismatch { left: usize, right: usize },

    #[error("expected '0' or '1', got '{0}'")]
    InvalidBinaryDigit(char),

    #[error("register state has {actual} bits, expected {expected}")]
    StateLengthMismatch { expected: usize, actual: usize },

    #[error("register width {0} is outside 1..=24")]
    RegisterTooWide(usize),

    #[error("SNR must be a positive linear ratio, got {0}")]
    InvalidSnr(f64),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("metric {metric} is not available: {reason}")]
    UnsupportedMetric { metric: &'static str, reason: &'static str },

    #[error("{0} is not implemented")]
    NotImplemented(String),

    #[error("maximal sequences differ in length ({left} vs {right})")]
    SequenceLengthMismatch { left: usize, right: usize },

    #[error("register with structure {structure} never returns to its seed state")]
    NonPeriodicRegister { structure: String },
}

impl EstimationError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_error_mentions_argument_order() {
        let err = EstimationError::ReferenceLongerThanReceived { received: 4, reference: 8 };
        assert!(err.to_string().contains("place the larger array first"));
    }

    #[test]
    fn test_binary_digit_message() {
        let err = EstimationError::InvalidBinaryDigit('x');
        assert_eq!(err.to_string(), "expected '0' or '1', got 'x'");
    }
}
