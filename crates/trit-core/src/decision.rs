// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — Entropy-Gated Decision Engine
// ─────────────────────────────────────────────────────────────────────
//! Accept / reject decisions that may abstain.
//!
//! The engine turns an (accept, reject) probability pair into a trit.
//! High binary entropy or low prior-weighted confidence produces PSI,
//! and every PSI decision is queued for exploration under its context
//! until the caller resolves it.

use std::time::SystemTime;

use serde::Serialize;

use trit_types::{Trit, TritError, TritResult};

/// Confidence at or above which a side is committed.
pub const CONFIDENCE_HIGH: f64 = 0.75;
/// Confidence below which the engine abstains outright.
pub const CONFIDENCE_LOW: f64 = 0.45;
/// Normalized entropy above which the engine abstains.
pub const ENTROPY_HIGH: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub trit: Trit,
    /// `|p_accept - p_reject| * prior`, in [0, 1].
    pub confidence: f64,
    /// Normalized binary Shannon entropy, in [0, 1].
    pub entropy: f64,
    pub reasoning: String,
    /// Suggested next steps when the engine abstained.
    pub alternatives: Vec<&'static str>,
    pub decided_at: SystemTime,
}

impl Decision {
    /// Committed with confidence of at least 0.7.
    pub fn is_certain(&self) -> bool {
        self.trit.is_committed() && self.confidence >= 0.7
    }

    pub fn needs_exploration(&self) -> bool {
        self.trit == Trit::Psi
    }
}

/// A past outcome used to derive probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    /// Positive rewards count as accept evidence, negative as reject.
    pub reward: f64,
    /// Learned value estimate, averaged into the prior.
    pub q_value: f64,
}

#[derive(Debug, Clone)]
pub struct Exploration {
    pub context: String,
    pub decision: Decision,
    pub queued_at: SystemTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DecisionStats {
    pub total: usize,
    pub ones: usize,
    pub zeros: usize,
    pub psi: usize,
    pub psi_ratio: f64,
    pub avg_confidence: f64,
    pub avg_entropy: f64,
    pub pending_exploration: usize,
}

/// Normalized Shannon entropy of a discrete distribution.
pub fn normalized_entropy(probabilities: &[f64]) -> f64 {
    let h: f64 = probabilities
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum();
    let max = if probabilities.len() > 1 {
        (probabilities.len() as f64).log2()
    } else {
        1.0
    };
    if max > 0.0 {
        h / max
    } else {
        0.0
    }
}

#[derive(Debug, Default)]
pub struct DecisionEngine {
    history: Vec<Decision>,
    exploration: Vec<Exploration>,
}

impl DecisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide from accept/reject probabilities and a prior in [0, 1].
    pub fn decide(
        &mut self,
        p_accept: f64,
        p_reject: f64,
        prior: f64,
        context: &str,
    ) -> TritResult<Decision> {
        for (name, value) in [("p_accept", p_accept), ("p_reject", p_reject), ("prior", prior)] {
            if !value.is_finite() || value < 0.0 {
                return Err(TritError::Numerical(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        let total = p_accept + p_reject;
        let (p_a, p_r) = if total > 0.0 {
            (p_accept / total, p_reject / total)
        } else {
            (0.5, 0.5)
        };
        let entropy = normalized_entropy(&[p_a, p_r]);
        let confidence = ((p_a - p_r).abs() * prior.min(1.0)).clamp(0.0, 1.0);

        let (trit, reasoning, alternatives) = if entropy > ENTROPY_HIGH || confidence < CONFIDENCE_LOW {
            (
                Trit::Psi,
                format!(
                    "insufficient confidence ({confidence:.2}) or high entropy ({entropy:.2})"
                ),
                vec![
                    "query additional data sources",
                    "request human input",
                    "run parallel experiments",
                    "defer decision temporarily",
                ],
            )
        } else if p_a > p_r && confidence >= CONFIDENCE_HIGH {
            (
                Trit::One,
                format!("strong accept signal ({p_a:.2}) with confidence {confidence:.2}"),
                Vec::new(),
            )
        } else if p_r > p_a && confidence >= CONFIDENCE_HIGH {
            (
                Trit::Zero,
                format!("strong reject signal ({p_r:.2}) with confidence {confidence:.2}"),
                Vec::new(),
            )
        } else {
            (
                Trit::Psi,
                format!("moderate signals (accept={p_a:.2}, reject={p_r:.2})"),
                vec!["gather more evidence", "consult similar past decisions"],
            )
        };

        let decision = Decision {
            trit,
            confidence,
            entropy,
            reasoning,
            alternatives,
            decided_at: SystemTime::now(),
        };
        log::debug!("decision for {context:?}: {} ({})", decision.trit, decision.reasoning);

        self.history.push(decision.clone());
        if trit == Trit::Psi {
            self.exploration.push(Exploration {
                context: context.to_string(),
                decision: decision.clone(),
                queued_at: SystemTime::now(),
            });
        }
        Ok(decision)
    }

    /// Decide from past outcomes: reward signs give the probabilities,
    /// the mean q-value the prior.
    pub fn decide_from_outcomes(
        &mut self,
        outcomes: &[Outcome],
        context: &str,
    ) -> TritResult<Decision> {
        if outcomes.is_empty() {
            return Ok(Decision {
                trit: Trit::Psi,
                confidence: 0.0,
                entropy: 1.0,
                reasoning: "no comparable outcomes".to_string(),
                alternatives: vec!["record this as a new outcome", "query external sources"],
                decided_at: SystemTime::now(),
            });
        }
        let n = outcomes.len() as f64;
        let positive = outcomes.iter().filter(|o| o.reward > 0.0).count() as f64;
        let negative = outcomes.iter().filter(|o| o.reward < 0.0).count() as f64;
        let prior = outcomes.iter().map(|o| o.q_value).sum::<f64>() / n;
        self.decide(positive / n, negative / n, prior.clamp(0.0, 1.0), context)
    }

    /// PSI decisions still waiting for a resolution.
    pub fn exploration_queue(&self) -> &[Exploration] {
        &self.exploration
    }

    /// Settle the oldest pending exploration for `context`.
    pub fn resolve_exploration(&mut self, context: &str, trit: Trit) -> TritResult<Exploration> {
        if !trit.is_committed() {
            return Err(TritError::Validation(
                "exploration must resolve to ZERO or ONE".to_string(),
            ));
        }
        let pos = self
            .exploration
            .iter()
            .position(|e| e.context == context)
            .ok_or_else(|| {
                TritError::Validation(format!("no pending exploration for {context:?}"))
            })?;
        let item = self.exploration.remove(pos);
        log::info!("exploration {context:?} resolved to {trit}");
        Ok(item)
    }

    pub fn history(&self) -> &[Decision] {
        &self.history
    }

    pub fn stats(&self) -> DecisionStats {
        let total = self.history.len();
        if total == 0 {
            return DecisionStats::default();
        }
        let count = |t: Trit| self.history.iter().filter(|d| d.trit == t).count();
        let psi = count(Trit::Psi);
        DecisionStats {
            total,
            ones: count(Trit::One),
            zeros: count(Trit::Zero),
            psi,
            psi_ratio: psi as f64 / total as f64,
            avg_confidence: self.history.iter().map(|d| d.confidence).sum::<f64>() / total as f64,
            avg_entropy: self.history.iter().map(|d| d.entropy).sum::<f64>() / total as f64,
            pending_exploration: self.exploration.len(),
        }
    }
}
