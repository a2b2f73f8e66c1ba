// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — Consensus Voting
// ─────────────────────────────────────────────────────────────────────
//! Combining several classifications into one.
//!
//! - `weighted_consensus` — margin vote: `|w0 - w1| / total` must exceed
//!   `δ_c` to commit. PSI votes count toward `total`, so abstentions
//!   dilute the margin.
//! - `quorum_consensus` — one state must hold at least `quorum` of the
//!   total weight.
//! - `majority` — unweighted, PSI-aware simple majority.

use serde::{Deserialize, Serialize};

use trit_types::{Trit, TritError, TritResult};

/// One participant's classification and voting weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub trit: Trit,
    pub weight: f64,
}

impl Vote {
    pub fn new(trit: Trit, weight: f64) -> Self {
        Self { trit, weight }
    }

    /// Vote with weight 1.0.
    pub fn unit(trit: Trit) -> Self {
        Self { trit, weight: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsensusOutcome {
    pub trit: Trit,
    /// Winning margin (weighted) or winning share (quorum).
    pub margin: f64,
}

impl ConsensusOutcome {
    const UNDECIDED: Self = Self {
        trit: Trit::Psi,
        margin: 0.0,
    };
}

/// Per-state weight totals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Tally {
    zero: f64,
    psi: f64,
    one: f64,
}

impl Tally {
    fn total(&self) -> f64 {
        self.zero + self.psi + self.one
    }
}

fn tally(votes: &[Vote]) -> TritResult<Tally> {
    let mut t = Tally::default();
    for (i, vote) in votes.iter().enumerate() {
        if !vote.weight.is_finite() || vote.weight < 0.0 {
            return Err(TritError::Validation(format!(
                "vote {i} has invalid weight {}",
                vote.weight
            )));
        }
        match vote.trit {
            Trit::Zero => t.zero += vote.weight,
            Trit::Psi => t.psi += vote.weight,
            Trit::One => t.one += vote.weight,
        }
    }
    Ok(t)
}

/// Weighted margin consensus.
///
/// Empty input or zero total weight yields `(Psi, 0.0)`. `consensus_delta`
/// must be finite and non-negative.
pub fn weighted_consensus(votes: &[Vote], consensus_delta: f64) -> TritResult<ConsensusOutcome> {
    if !(consensus_delta.is_finite() && consensus_delta >= 0.0) {
        return Err(TritError::Validation(format!(
            "consensus_delta must be finite and non-negative, got {consensus_delta}"
        )));
    }
    let t = tally(votes)?;
    let total = t.total();
    if votes.is_empty() || total <= 0.0 {
        return Ok(ConsensusOutcome::UNDECIDED);
    }

    let margin = (t.zero - t.one).abs() / total;
    let trit = if margin > consensus_delta {
        if t.zero > t.one {
            Trit::Zero
        } else {
            Trit::One
        }
    } else {
        Trit::Psi
    };
    log::debug!(
        "weighted consensus: w0={:.3} w1={:.3} wψ={:.3} margin={margin:.3} → {trit}",
        t.zero,
        t.one,
        t.psi
    );
    Ok(ConsensusOutcome { trit, margin })
}

/// Quorum consensus: the state whose weight share reaches `quorum` wins.
///
/// A PSI quorum is a legitimate outcome and is reported with its share.
/// `quorum` must lie in (0.5, 1] so that at most one state can reach it.
pub fn quorum_consensus(votes: &[Vote], quorum: f64) -> TritResult<ConsensusOutcome> {
    if !(quorum > 0.5 && quorum <= 1.0) {
        return Err(TritError::Validation(format!(
            "quorum must be in (0.5, 1], got {quorum}"
        )));
    }
    let t = tally(votes)?;
    let total = t.total();
    if votes.is_empty() || total <= 0.0 {
        return Ok(ConsensusOutcome::UNDECIDED);
    }

    for (trit, weight) in [(Trit::Zero, t.zero), (Trit::One, t.one), (Trit::Psi, t.psi)] {
        let share = weight / total;
        if share >= quorum {
            return Ok(ConsensusOutcome {
                trit,
                margin: share,
            });
        }
    }
    Ok(ConsensusOutcome::UNDECIDED)
}

/// Unweighted majority with uncertainty propagation.
///
/// More than a third PSI → PSI. Otherwise the larger committed side wins;
/// ties are PSI.
pub fn majority(trits: &[Trit]) -> Trit {
    if trits.is_empty() {
        return Trit::Psi;
    }
    let (mut zeros, mut ones, mut psi) = (0usize, 0usize, 0usize);
    for t in trits {
        match t {
            Trit::Zero => zeros += 1,
            Trit::One => ones += 1,
            Trit::Psi => psi += 1,
        }
    }
    if psi * 3 > trits.len() {
        return Trit::Psi;
    }
    match ones.cmp(&zeros) {
        std::cmp::Ordering::Greater => Trit::One,
        std::cmp::Ordering::Less => Trit::Zero,
        std::cmp::Ordering::Equal => Trit::Psi,
    }
}
