// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — Trit Values and Classification Records
// ─────────────────────────────────────────────────────────────────────

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TritError, TritResult};

/// Three-way classification outcome.
///
/// `Psi` is the undecided middle band: the confidence sat within
/// `θ ± δ` and no commitment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trit {
    Zero,
    Psi,
    One,
}

impl Trit {
    /// Wire code: 0 = Zero, 1 = Psi, 2 = One.
    pub const fn code(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::Psi => 1,
            Self::One => 2,
        }
    }

    pub fn from_code(code: u8) -> TritResult<Self> {
        match code {
            0 => Ok(Self::Zero),
            1 => Ok(Self::Psi),
            2 => Ok(Self::One),
            other => Err(TritError::Validation(format!(
                "trit code must be 0, 1 or 2, got {other}"
            ))),
        }
    }

    pub const fn numeric(self) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::Psi => 0.5,
            Self::One => 1.0,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::Psi => "Ψ",
            Self::One => "1",
        }
    }

    /// True for `Zero` and `One`.
    pub const fn is_committed(self) -> bool {
        !matches!(self, Self::Psi)
    }
}

impl fmt::Display for Trit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Map a confidence into [0, 1].
///
/// NaN becomes 0.5 (the undecided midpoint), ±Inf the nearest bound.
#[inline]
pub fn sanitize_confidence(value: f64) -> f64 {
    if value.is_nan() {
        log::warn!("sanitize_confidence: NaN detected, using 0.5");
        return 0.5;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { 1.0 } else { 0.0 };
        log::warn!("sanitize_confidence: Inf detected, clamping to {boundary:.1}");
        return boundary;
    }
    value.clamp(0.0, 1.0)
}

/// Normalize a raw u32 sensor reading into [0, 1].
#[inline]
pub fn normalize_raw(raw: u32) -> f64 {
    (f64::from(raw) / f64::from(u32::MAX)).clamp(0.0, 1.0)
}

/// One pass through the classification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub trit: Trit,
    /// Post-processed confidence that was compared against the band.
    pub confidence: f64,
    /// Value handed to the pipeline before smoothing.
    pub input: f64,
}

/// Running counters for a classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierStats {
    pub total: u64,
    pub zeros: u64,
    pub ones: u64,
    pub psi: u64,
    /// Deferred PSI results that expired into the safe default.
    pub timeouts: u64,
}

impl ClassifierStats {
    pub fn record(&mut self, trit: Trit) {
        self.total += 1;
        match trit {
            Trit::Zero => self.zeros += 1,
            Trit::One => self.ones += 1,
            Trit::Psi => self.psi += 1,
        }
    }

    pub fn committed(&self) -> u64 {
        self.zeros + self.ones
    }

    /// Share of classifications that landed in the PSI band.
    pub fn psi_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.psi as f64 / self.total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mapping() {
        assert_eq!(Trit::Zero.code(), 0);
        assert_eq!(Trit::Psi.code(), 1);
        assert_eq!(Trit::One.code(), 2);
        assert_eq!(Trit::from_code(2).unwrap(), Trit::One);
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert!(matches!(Trit::from_code(7), Err(TritError::Validation(_))));
    }

    #[test]
    fn test_symbol_display() {
        assert_eq!(Trit::Psi.to_string(), "Ψ");
        assert_eq!(format!("{}{}", Trit::Zero, Trit::One), "01");
    }

    #[test]
    fn test_committed() {
        assert!(Trit::Zero.is_committed());
        assert!(Trit::One.is_committed());
        assert!(!Trit::Psi.is_committed());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Trit::Psi).unwrap(), "\"PSI\"");
        let t: Trit = serde_json::from_str("\"ONE\"").unwrap();
        assert_eq!(t, Trit::One);
    }

    #[test]
    fn test_sanitize_nan() {
        assert_eq!(sanitize_confidence(f64::NAN), 0.5);
    }

    #[test]
    fn test_sanitize_inf() {
        assert_eq!(sanitize_confidence(f64::INFINITY), 1.0);
        assert_eq!(sanitize_confidence(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_sanitize_out_of_range() {
        assert_eq!(sanitize_confidence(1.7), 1.0);
        assert_eq!(sanitize_confidence(-0.2), 0.0);
        assert_eq!(sanitize_confidence(0.42), 0.42);
    }

    #[test]
    fn test_normalize_raw_bounds() {
        assert_eq!(normalize_raw(0), 0.0);
        assert_eq!(normalize_raw(u32::MAX), 1.0);
        assert!((normalize_raw(u32::MAX / 2) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_stats_psi_ratio() {
        let mut stats = ClassifierStats::default();
        assert_eq!(stats.psi_ratio(), 0.0);
        for t in [Trit::Zero, Trit::Psi, Trit::One, Trit::Psi] {
            stats.record(t);
        }
        assert_eq!(stats.total, 4);
        assert_eq!(stats.committed(), 2);
        assert!((stats.psi_ratio() - 0.5).abs() < 1e-12);
    }
}
