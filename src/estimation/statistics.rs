//! Peak search and trace statistics

use rustfft::num_complex::Complex64;

/// Lag of the largest correlation magnitude
///
/// Ties resolve to the earliest lag. `None` for an empty trace.
pub fn find_peak(trace: &[Complex64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (lag, value) in trace.iter().enumerate() {
        let magnitude = value.norm();
        match best {
            Some((_, peak)) if magnitude <= peak => {}
            _ => best = Some((lag, magnitude)),
        }
    }
    best.map(|(lag, _)| lag)
}

/// Peak-to-deviation ratio of a magnitude trace
///
/// Lags within `exclusion` of `peak` are left out of the deviation, so
/// the main lobe does not inflate its own background. `None` when fewer
/// than two lags remain or the background is flat.
pub fn stability_metric(magnitudes: &[f64], peak: usize, exclusion: usize) -> Option<f64> {
    let peak_value = *magnitudes.get(peak)?;
    let low = peak.saturating_sub(exclusion);
    let high = peak.saturating_add(exclusion);

    let background: Vec<f64> = magnitudes
        .iter()
        .enumerate()
        .filter(|(lag, _)| *lag < low || *lag > high)
        .map(|(_, &m)| m)
        .collect();

    let deviation = std_dev(&background)?;
    if deviation > 0.0 {
        Some(peak_value / deviation)
    } else {
        None
    }
}

/// Arithmetic mean, `None` when empty
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation, `None` below two samples
fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mu = mean(values)?;
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}
