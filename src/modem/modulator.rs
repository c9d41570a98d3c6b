//! Runtime-keyed modulator
//!
//! Composes a `Carrier` and a `SymbolTiming`; the scheme is a runtime
//! enum so one scenario can swap schemes without rebuilding the pipeline.
//! Real-carrier schemes (OOK, BPSK, BFSK) leave the imaginary part of
//! every output sample at exactly zero.

use rustfft::num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::sync::Arc;

use super::ModulationScheme;
use crate::error::{EstimationError, EstimationResult};
use crate::spreading::GoldCodebook;
use crate::traits::{Carrier, SymbolTiming};

/// Bit-to-sample modulator
///
/// # Type Parameters
/// * `K` - Carrier (phase accumulator)
/// * `T` - Symbol timing (samples per symbol)
#[derive(Debug, Clone)]
pub struct Modulator<K, T>
where
    K: Carrier,
    T: SymbolTiming,
{
    scheme: ModulationScheme,
    carrier: K,
    timing: T,
    carrier_freq: f64,
    depth: f64,
    codebook: Option<Arc<GoldCodebook>>,
}

impl<K, T> Modulator<K, T>
where
    K: Carrier,
    T: SymbolTiming,
{
    /// Create a new modulator
    ///
    /// The carrier's current frequency is taken as the nominal carrier;
    /// BFSK deviates around it.
    ///
    /// # Arguments
    /// * `scheme` - Modulation scheme
    /// * `carrier` - Carrier oscillator
    /// * `timing` - Symbol timing
    /// * `depth` - Amplitude (OOK) or frequency (BFSK) deviation fraction
    /// * `codebook` - Spreading codes, required by `GoldQuadrature`
    ///
    /// # Errors
    /// `InvalidParameter` for a negative or non-finite depth, or a Gold
    /// scheme without a codebook.
    pub fn new(
        scheme: ModulationScheme,
        carrier: K,
        timing: T,
        depth: f64,
        codebook: Option<Arc<GoldCodebook>>,
    ) -> EstimationResult<Self> {
        if !(depth.is_finite() && depth >= 0.0) {
            return Err(EstimationError::invalid(format!(
                "modulation depth must be non-negative, got {}",
                depth
            )));
        }
        if scheme == ModulationScheme::GoldQuadrature && codebook.is_none() {
            return Err(EstimationError::invalid(
                "gold_quadrature modulation needs a spreading codebook",
            ));
        }

        let carrier_freq = carrier.frequency();
        Ok(Self {
            scheme,
            carrier,
            timing,
            carrier_freq,
            depth,
            codebook,
        })
    }

    /// Bits consumed per modulation symbol
    pub fn bits_per_symbol(&self) -> usize {
        self.scheme.bits_per_symbol()
    }

    /// Samples emitted per modulation symbol
    pub fn symbol_span(&self) -> usize {
        let sps = self.timing.samples_per_symbol();
        match (self.scheme, &self.codebook) {
            (ModulationScheme::Msk, _) => 2 * sps,
            (ModulationScheme::GoldQuadrature, Some(book)) => book.chips_per_symbol() * sps,
            _ => sps,
        }
    }

    /// Samples produced for `bits` input bits (partial symbols padded)
    pub fn samples_for_bits(&self, bits: usize) -> usize {
        bits.div_ceil(self.bits_per_symbol()) * self.symbol_span()
    }

    /// Modulate bits to samples
    ///
    /// Emits `samples_for_bits(bits.len())` samples. A trailing odd bit in
    /// a two-bit scheme is paired with `0`.
    pub fn modulate(&mut self, bits: &[bool]) -> Vec<Complex64> {
        let mut output = Vec::with_capacity(self.samples_for_bits(bits.len()));

        match self.scheme {
            ModulationScheme::Ook => {
                for &bit in bits {
                    let level = if bit { 1.0 + self.depth } else { 1.0 - self.depth };
                    self.emit_real(level, &mut output);
                }
            }
            ModulationScheme::BpskNrz => {
                for &bit in bits {
                    let level = if bit { -1.0 } else { 1.0 };
                    self.emit_real(level, &mut output);
                }
            }
            ModulationScheme::BpskNrzi => {
                for &bit in bits {
                    if bit {
                        self.carrier.shift_phase(PI);
                    }
                    self.emit_real(1.0, &mut output);
                }
            }
            ModulationScheme::Bfsk => {
                for &bit in bits {
                    let deviation = if bit { 1.0 + self.depth } else { 1.0 - self.depth };
                    self.carrier.set_frequency(self.carrier_freq * deviation);
                    self.emit_real(1.0, &mut output);
                }
            }
            ModulationScheme::Msk => {
                for pair in bits.chunks(2) {
                    let a_i = antipodal(pair[0]);
                    let a_q = antipodal(pair.get(1).copied().unwrap_or(false));
                    self.emit_msk_pair(a_i, a_q, &mut output);
                }
            }
            ModulationScheme::GoldQuadrature => {
                if let Some(book) = self.codebook.clone() {
                    for pair in bits.chunks(2) {
                        let symbol = (pair[0] as usize) << 1 | pair.get(1).copied().unwrap_or(false) as usize;
                        self.emit_gold_symbol(book.code(symbol), &mut output);
                    }
                }
            }
        }

        output
    }

    /// Reset phase and restore the nominal carrier frequency
    pub fn reset(&mut self) {
        self.carrier.reset();
        self.carrier.set_frequency(self.carrier_freq);
    }

    fn emit_real(&mut self, level: f64, output: &mut Vec<Complex64>) {
        for _ in 0..self.timing.samples_per_symbol() {
            output.push(Complex64::new(self.carrier.next_real() * level, 0.0));
        }
    }

    /// Half-sinusoid weighting across a pair: I rides cos, Q rides sin,
    /// so the envelope stays constant
    fn emit_msk_pair(&mut self, a_i: f64, a_q: f64, output: &mut Vec<Complex64>) {
        let span = 2 * self.timing.samples_per_symbol();
        for j in 0..span {
            let theta = PI * j as f64 / span as f64;
            let baseband = Complex64::new(a_i * theta.cos(), a_q * theta.sin());
            output.push(baseband * self.carrier.next_complex());
        }
    }

    fn emit_gold_symbol(&mut self, code: &[bool], output: &mut Vec<Complex64>) {
        let sps = self.timing.samples_per_symbol();
        for chip in code.chunks_exact(2) {
            let iq = Complex64::new(antipodal(chip[0]), antipodal(chip[1])) * FRAC_1_SQRT_2;
            for _ in 0..sps {
                output.push(iq * self.carrier.next_complex());
            }
        }
    }
}

/// 0 → +1, 1 → −1
#[inline]
fn antipodal(bit: bool) -> f64 {
    if bit {
        -1.0
    } else {
        1.0
    }
}
