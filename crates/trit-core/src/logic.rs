// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — Three-Valued Logic and PSI Resolution
// ─────────────────────────────────────────────────────────────────────
//! Strong Kleene operators over `Trit`, a probability-carrying variant
//! (`WeightedTrit`), and biased resolution of PSI into a committed value.
//!
//! Truth tables (Ψ = undecided):
//!
//! ```text
//! AND | 0 Ψ 1      OR | 0 Ψ 1      XOR | 0 Ψ 1
//! ----+------      ---+------      ----+------
//!  0  | 0 0 0       0 | 0 Ψ 1        0 | 0 Ψ 1
//!  Ψ  | 0 Ψ Ψ       Ψ | Ψ Ψ 1        Ψ | Ψ Ψ Ψ
//!  1  | 0 Ψ 1       1 | 1 1 1        1 | 1 Ψ 0
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use trit_types::Trit;

#[inline]
pub fn and3(a: Trit, b: Trit) -> Trit {
    match (a, b) {
        (Trit::Zero, _) | (_, Trit::Zero) => Trit::Zero,
        (Trit::One, Trit::One) => Trit::One,
        _ => Trit::Psi,
    }
}

#[inline]
pub fn or3(a: Trit, b: Trit) -> Trit {
    match (a, b) {
        (Trit::One, _) | (_, Trit::One) => Trit::One,
        (Trit::Zero, Trit::Zero) => Trit::Zero,
        _ => Trit::Psi,
    }
}

#[inline]
pub fn not3(a: Trit) -> Trit {
    match a {
        Trit::Zero => Trit::One,
        Trit::One => Trit::Zero,
        Trit::Psi => Trit::Psi,
    }
}

#[inline]
pub fn xor3(a: Trit, b: Trit) -> Trit {
    match (a, b) {
        (Trit::Psi, _) | (_, Trit::Psi) => Trit::Psi,
        (x, y) if x == y => Trit::Zero,
        _ => Trit::One,
    }
}

/// A trit that remembers how likely PSI is to resolve to ONE.
///
/// Committed values carry `p_one` of exactly 0.0 or 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedTrit {
    pub trit: Trit,
    pub p_one: f64,
}

impl WeightedTrit {
    pub const ZERO: Self = Self {
        trit: Trit::Zero,
        p_one: 0.0,
    };
    pub const ONE: Self = Self {
        trit: Trit::One,
        p_one: 1.0,
    };

    pub fn psi(p_one: f64) -> Self {
        let p_one = if p_one.is_finite() {
            p_one.clamp(0.0, 1.0)
        } else {
            0.5
        };
        Self {
            trit: Trit::Psi,
            p_one,
        }
    }

    pub fn from_trit(trit: Trit) -> Self {
        match trit {
            Trit::Zero => Self::ZERO,
            Trit::One => Self::ONE,
            Trit::Psi => Self::psi(0.5),
        }
    }

    /// Kleene AND; undecided results multiply their probabilities.
    pub fn and(self, other: Self) -> Self {
        match and3(self.trit, other.trit) {
            Trit::Psi => Self::psi(self.p_one * other.p_one),
            committed => Self::from_trit(committed),
        }
    }

    /// Kleene OR; undecided results combine as `1 - (1-a)(1-b)`.
    pub fn or(self, other: Self) -> Self {
        match or3(self.trit, other.trit) {
            Trit::Psi => Self::psi(1.0 - (1.0 - self.p_one) * (1.0 - other.p_one)),
            committed => Self::from_trit(committed),
        }
    }

    pub fn not(self) -> Self {
        match self.trit {
            Trit::Psi => Self::psi(1.0 - self.p_one),
            committed => Self::from_trit(not3(committed)),
        }
    }

    /// XOR forgets the weighting: any PSI operand gives an even PSI.
    pub fn xor(self, other: Self) -> Self {
        Self::from_trit(xor3(self.trit, other.trit))
    }

    /// Collapse to a committed value. Committed inputs are returned as-is.
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> Trit {
        match self.trit {
            Trit::Psi => {
                if rng.gen::<f64>() < self.p_one {
                    Trit::One
                } else {
                    Trit::Zero
                }
            }
            committed => committed,
        }
    }
}

/// Probability that a PSI confidence should resolve to ONE.
///
/// Distance from θ in units of δ, scaled by 0.3 and capped so that
/// neither outcome drops below 10%.
pub fn psi_bias(confidence: f64, threshold: f64, delta: f64) -> f64 {
    let bias = (confidence - threshold) / delta.max(1e-3);
    0.5 + (bias * 0.3).clamp(-0.4, 0.4)
}

/// Commit a PSI confidence by a coin biased toward its side of θ.
pub fn resolve_psi<R: Rng + ?Sized>(confidence: f64, threshold: f64, delta: f64, rng: &mut R) -> Trit {
    WeightedTrit::psi(psi_bias(confidence, threshold, delta)).resolve(rng)
}
