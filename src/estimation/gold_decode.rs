//! Window decoder for Gold-spread symbols
//!
//! The noisy composite is correlated against each of the four
//! single-symbol reference waveforms. Symbol `s` starts at lag
//! `s * span`; within `[s * span, (s + 1) * span)` the code whose trace
//! peaks highest wins.

/// Decode `symbols` 2-bit values from four magnitude traces
///
/// Ties go to the lower code index. Windows that fall off the end of the
/// traces decode from whatever lags remain (or as code 0 if none do).
pub(crate) fn decode_symbols(traces: &[Vec<f64>; 4], span: usize, symbols: usize) -> Vec<usize> {
    (0..symbols)
        .map(|s| {
            let start = s * span;
            let mut best = (0, f64::NEG_INFINITY);
            for (code, trace) in traces.iter().enumerate() {
                let end = ((s + 1) * span).min(trace.len());
                let peak = trace
                    .get(start..end)
                    .unwrap_or(&[])
                    .iter()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max);
                if peak > best.1 {
                    best = (code, peak);
                }
            }
            best.0
        })
        .collect()
}

/// Expand 2-bit symbol values MSB first
pub(crate) fn symbols_to_bits(symbols: &[usize]) -> Vec<bool> {
    symbols
        .iter()
        .flat_map(|&symbol| [symbol & 0b10 != 0, symbol & 0b01 != 0])
        .collect()
}

/// Positions where `decoded` differs from `sent`, over `sent.len()` bits
pub(crate) fn count_bit_errors(sent: &[bool], decoded: &[bool]) -> usize {
    sent.iter()
        .enumerate()
        .filter(|&(i, bit)| decoded.get(i) != Some(bit))
        .count()
}
