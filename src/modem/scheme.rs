//! Modulation scheme selector

use std::fmt;
use std::str::FromStr;

use crate::error::EstimationError;

/// Supported modulation schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModulationScheme {
    /// On-off keying: carrier amplitude `1 ± depth`
    Ook,
    /// Binary PSK, sign flips per bit
    BpskNrz,
    /// Binary PSK, permanent π phase step on every `1` bit
    BpskNrzi,
    /// Binary FSK: carrier `f·(1 ± depth)` for the bit duration
    Bfsk,
    /// Minimum-shift keying on a complex carrier, bits taken in I/Q pairs
    Msk,
    /// 2-bit symbols spread by one of four Gold codes as I/Q chips
    GoldQuadrature,
}

impl ModulationScheme {
    pub const ALL: [ModulationScheme; 6] = [
        Self::Ook,
        Self::BpskNrz,
        Self::BpskNrzi,
        Self::Bfsk,
        Self::Msk,
        Self::GoldQuadrature,
    ];

    /// Bits carried by one modulation symbol
    pub fn bits_per_symbol(&self) -> usize {
        match self {
            Self::Ook | Self::BpskNrz | Self::BpskNrzi | Self::Bfsk => 1,
            Self::Msk | Self::GoldQuadrature => 2,
        }
    }

    /// Whether the scheme produces complex (I/Q) samples
    pub fn is_quadrature(&self) -> bool {
        matches!(self, Self::Msk | Self::GoldQuadrature)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ook => "ook",
            Self::BpskNrz => "bpsk_nrz",
            Self::BpskNrzi => "bpsk_nrzi",
            Self::Bfsk => "bfsk",
            Self::Msk => "msk",
            Self::GoldQuadrature => "gold_quadrature",
        }
    }
}

impl fmt::Display for ModulationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModulationScheme {
    type Err = EstimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == wanted)
            .ok_or_else(|| EstimationError::NotImplemented(format!("modulation scheme '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_names() {
        for scheme in ModulationScheme::ALL {
            assert_eq!(scheme.as_str().parse::<ModulationScheme>().unwrap(), scheme);
        }
        assert_eq!("  BPSK_NRZI ".parse::<ModulationScheme>().unwrap(), ModulationScheme::BpskNrzi);
    }

    #[test]
    fn test_unknown_scheme_not_implemented() {
        let err = "qam256".parse::<ModulationScheme>().unwrap_err();
        assert!(matches!(err, EstimationError::NotImplemented(_)));
    }

    #[test]
    fn test_bits_per_symbol() {
        assert_eq!(ModulationScheme::Ook.bits_per_symbol(), 1);
        assert_eq!(ModulationScheme::Msk.bits_per_symbol(), 2);
        assert!(ModulationScheme::GoldQuadrature.is_quadrature());
        assert!(!ModulationScheme::Bfsk.is_quadrature());
    }
}
