// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — Band Classifier + Stateful Pipeline
// ─────────────────────────────────────────────────────────────────────
//! Three-way threshold classification.
//!
//! Two layers:
//! - `classify` — the bare band check, stateless.
//! - `TritClassifier` — EWMA smoothing, transition density penalty,
//!   statistics and a deferral queue for PSI results, behind one lock.

use std::time::Instant;

use parking_lot::Mutex;

use trit_types::{
    normalize_raw, sanitize_confidence, Classification, ClassifierStats, Trit, TritConfig,
    TritError, TritResult,
};

use crate::consensus::{self, ConsensusOutcome, Vote};
use crate::deferral::{Deferral, DeferralQueue, Resolution};
use crate::smoothing::{apply_density_penalty, Ewma, TransitionWindow};

/// Classify `confidence` against the band `θ ± δ`.
///
/// Strictly below the band is `Zero`, strictly above is `One`; the edges
/// and NaN are `Psi`.
#[inline]
pub fn classify(confidence: f64, threshold: f64, delta: f64) -> Trit {
    if confidence < threshold - delta {
        Trit::Zero
    } else if confidence > threshold + delta {
        Trit::One
    } else {
        Trit::Psi
    }
}

struct PipelineState {
    ewma: Ewma,
    transitions: TransitionWindow,
    above: Option<bool>,
    stats: ClassifierStats,
    deferrals: DeferralQueue,
}

impl PipelineState {
    fn new(config: &TritConfig) -> Self {
        Self {
            ewma: Ewma::new(config.alpha, config.initial_confidence),
            transitions: TransitionWindow::new(config.density_window),
            above: None,
            stats: ClassifierStats::default(),
            deferrals: DeferralQueue::from_config(config),
        }
    }
}

/// Stateful classification pipeline.
///
/// Thread-safe: all mutable state sits behind a `parking_lot::Mutex`.
pub struct TritClassifier {
    config: TritConfig,
    state: Mutex<PipelineState>,
}

impl TritClassifier {
    /// Build from a configuration, rejecting invalid parameters.
    pub fn new(config: TritConfig) -> TritResult<Self> {
        if let Err(e) = config.validate() {
            log::error!("Rejected classifier config: {e}");
            return Err(e);
        }
        let state = Mutex::new(PipelineState::new(&config));
        Ok(Self { config, state })
    }

    /// Bare band check with the configured θ and δ. Counted in stats,
    /// never smoothed or deferred.
    pub fn classify(&self, confidence: f64) -> Classification {
        let trit = classify(confidence, self.config.threshold, self.config.delta);
        self.state.lock().stats.record(trit);
        Classification {
            trit,
            confidence,
            input: confidence,
        }
    }

    /// Run one sample through the full pipeline:
    /// sanitize → EWMA → crossing record → density penalty → classify.
    pub fn process(&self, confidence: f64) -> Classification {
        let mut state = self.state.lock();
        self.step(&mut state, confidence)
    }

    /// `process` on a raw u32 reading normalized into [0, 1].
    pub fn process_raw(&self, raw: u32) -> Classification {
        self.process(normalize_raw(raw))
    }

    /// `process`, parking a PSI result in the deferral queue.
    ///
    /// While the queue is full every sample is refused, including one that
    /// would have committed and never needed a slot. The refusal happens
    /// before any state changes, so a rejected call leaves the pipeline
    /// untouched.
    pub fn process_and_defer(
        &self,
        confidence: f64,
        context: &str,
    ) -> TritResult<(Classification, Option<u64>)> {
        let mut state = self.state.lock();
        if state.deferrals.len() >= state.deferrals.capacity() {
            return Err(TritError::DeferralFull {
                capacity: state.deferrals.capacity(),
            });
        }
        let result = self.step(&mut state, confidence);
        let ticket = match result.trit {
            Trit::Psi => Some(state.deferrals.defer(result.confidence, context)?),
            _ => None,
        };
        Ok((result, ticket))
    }

    fn step(&self, state: &mut PipelineState, confidence: f64) -> Classification {
        let threshold = self.config.threshold;
        let smoothed = state.ewma.update(sanitize_confidence(confidence));

        let above = smoothed > threshold;
        let crossed = state.above.is_some_and(|prev| prev != above);
        state.above = Some(above);
        state.transitions.record(crossed);

        let adjusted = apply_density_penalty(smoothed, state.transitions.density(), threshold);
        let trit = classify(adjusted, threshold, self.config.delta);
        state.stats.record(trit);

        log::debug!(
            "classify input={confidence:.4} smoothed={smoothed:.4} adjusted={adjusted:.4} → {trit}"
        );
        Classification {
            trit,
            confidence: adjusted,
            input: confidence,
        }
    }

    /// Weighted margin vote using the configured `consensus_delta`.
    pub fn weighted_consensus(&self, votes: &[Vote]) -> TritResult<ConsensusOutcome> {
        consensus::weighted_consensus(votes, self.config.consensus_delta)
    }

    /// Quorum vote using the configured `quorum`.
    pub fn quorum_consensus(&self, votes: &[Vote]) -> TritResult<ConsensusOutcome> {
        consensus::quorum_consensus(votes, self.config.quorum)
    }

    /// Sweep timed-out deferrals into the safe default.
    pub fn expire_deferrals(&self) -> Vec<Resolution> {
        self.expire_deferrals_at(Instant::now())
    }

    pub fn expire_deferrals_at(&self, now: Instant) -> Vec<Resolution> {
        let mut state = self.state.lock();
        let expired = state.deferrals.expire_at(now);
        state.stats.timeouts += expired.len() as u64;
        expired
    }

    /// Commit a pending deferral explicitly.
    pub fn resolve_deferral(&self, id: u64, trit: Trit) -> TritResult<Resolution> {
        self.state.lock().deferrals.resolve(id, trit)
    }

    /// Snapshot of the pending deferrals, oldest first.
    pub fn pending_deferrals(&self) -> Vec<Deferral> {
        self.state.lock().deferrals.pending().cloned().collect()
    }

    pub fn stats(&self) -> ClassifierStats {
        self.state.lock().stats
    }

    pub fn psi_ratio(&self) -> f64 {
        self.state.lock().stats.psi_ratio()
    }

    /// Current EWMA value.
    pub fn smoothed(&self) -> f64 {
        self.state.lock().ewma.value()
    }

    /// Current transition density.
    pub fn density(&self) -> f64 {
        self.state.lock().transitions.density()
    }

    /// Read-only access to config.
    pub fn config(&self) -> &TritConfig {
        &self.config
    }

    /// Drop all smoothing state, counters and pending deferrals.
    pub fn reset(&self) {
        *self.state.lock() = PipelineState::new(&self.config);
        log::info!("Trit classifier reset");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn instant_config() -> TritConfig {
        // α = 1 makes the pipeline follow the input exactly.
        TritConfig {
            alpha: 1.0,
            ..Default::default()
        }
    }

    // ── classify ─────────────────────────────────────────────────

    #[test]
    fn test_classify_reference_points() {
        let cases = [
            (0.1, Trit::Zero),
            (0.9, Trit::One),
            (0.5, Trit::Psi),
            (0.44, Trit::Zero),
            (0.56, Trit::One),
        ];
        for (c, expected) in cases {
            assert_eq!(classify(c, 0.5, 0.05), expected, "confidence {c}");
        }
    }

    #[test]
    fn test_classify_edges_are_psi() {
        // Use a threshold/delta pair whose edges are exact in binary.
        assert_eq!(classify(0.25, 0.5, 0.25), Trit::Psi);
        assert_eq!(classify(0.75, 0.5, 0.25), Trit::Psi);
    }

    #[test]
    fn test_classify_nan_is_psi() {
        assert_eq!(classify(f64::NAN, 0.5, 0.05), Trit::Psi);
    }

    #[test]
    fn test_classify_infinities() {
        assert_eq!(classify(f64::INFINITY, 0.5, 0.05), Trit::One);
        assert_eq!(classify(f64::NEG_INFINITY, 0.5, 0.05), Trit::Zero);
    }

    #[test]
    fn test_classify_zero_width_band() {
        assert_eq!(classify(0.5, 0.5, 0.0), Trit::Psi);
        assert_eq!(classify(0.500001, 0.5, 0.0), Trit::One);
    }

    // ── TritClassifier ───────────────────────────────────────────

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = TritConfig {
            delta: 0.9,
            ..Default::default()
        };
        assert!(matches!(TritClassifier::new(config), Err(TritError::Config(_))));
    }

    #[test]
    fn test_bare_classify_counts() {
        let c = TritClassifier::new(TritConfig::default()).unwrap();
        assert_eq!(c.classify(0.1).trit, Trit::Zero);
        assert_eq!(c.classify(0.5).trit, Trit::Psi);
        assert_eq!(c.smoothed(), 0.5);
        let stats = c.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.psi, 1);
    }

    #[test]
    fn test_ewma_damps_single_spike() {
        let c = TritClassifier::new(TritConfig::default()).unwrap();
        // 0.1 * 0.9 + 0.9 * 0.5 = 0.54, still inside the band.
        let r = c.process(0.9);
        assert_eq!(r.trit, Trit::Psi);
        assert_eq!(r.input, 0.9);
        assert!((c.smoothed() - 0.54).abs() < 1e-12);
    }

    #[test]
    fn test_sustained_signal_commits() {
        let c = TritClassifier::new(TritConfig::default()).unwrap();
        let last = (0..50).map(|_| c.process(0.95)).last().unwrap();
        assert_eq!(last.trit, Trit::One);
        let last = (0..80).map(|_| c.process(0.02)).last().unwrap();
        assert_eq!(last.trit, Trit::Zero);
    }

    #[test]
    fn test_instant_pipeline_matches_classify() {
        let c = TritClassifier::new(instant_config()).unwrap();
        assert_eq!(c.process(0.9).trit, Trit::One);
        assert_eq!(c.process(0.9).trit, Trit::One);
        assert_eq!(c.process(0.5).trit, Trit::Psi);
    }

    #[test]
    fn test_flapping_signal_is_pulled_into_band() {
        let config = TritConfig {
            density_window: 10,
            ..instant_config()
        };
        let c = TritClassifier::new(config).unwrap();
        let mut last = c.process(0.9);
        for i in 0..20 {
            last = c.process(if i % 2 == 0 { 0.1 } else { 0.9 });
        }
        // Every sample crosses θ: density 1.0 → collapses onto θ.
        assert_eq!(c.density(), 1.0);
        assert_eq!(last.trit, Trit::Psi);
        assert!((last.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_process_raw() {
        let c = TritClassifier::new(instant_config()).unwrap();
        assert_eq!(c.process_raw(u32::MAX).trit, Trit::One);
        assert_eq!(c.process_raw(0).trit, Trit::Zero);
    }

    #[test]
    fn test_nan_input_is_undecided() {
        let c = TritClassifier::new(instant_config()).unwrap();
        let r = c.process(f64::NAN);
        assert_eq!(r.trit, Trit::Psi);
        assert!(r.input.is_nan());
    }

    #[test]
    fn test_process_and_defer_parks_psi() {
        let c = TritClassifier::new(instant_config()).unwrap();
        let (r, ticket) = c.process_and_defer(0.5, "job-1").unwrap();
        assert_eq!(r.trit, Trit::Psi);
        assert!(ticket.is_some());
        let (r, ticket) = c.process_and_defer(0.9, "job-2").unwrap();
        assert_eq!(r.trit, Trit::One);
        assert!(ticket.is_none());
        assert_eq!(c.pending_deferrals().len(), 1);
        assert_eq!(c.pending_deferrals()[0].context, "job-1");
    }

    #[test]
    fn test_full_queue_refuses_without_side_effects() {
        let config = TritConfig {
            deferral_capacity: 1,
            ..instant_config()
        };
        let c = TritClassifier::new(config).unwrap();
        c.process_and_defer(0.5, "a").unwrap();
        let before = c.stats();
        let err = c.process_and_defer(0.9, "b").unwrap_err();
        assert_eq!(err, TritError::DeferralFull { capacity: 1 });
        assert_eq!(c.stats(), before);
        assert_eq!(c.smoothed(), 0.5);
    }

    #[test]
    fn test_full_queue_refuses_committed_samples_too() {
        let config = TritConfig {
            deferral_capacity: 1,
            ..instant_config()
        };
        let c = TritClassifier::new(config).unwrap();
        c.process_and_defer(0.5, "a").unwrap();
        for x in [0.02, 0.98] {
            assert!(matches!(
                c.process_and_defer(x, "b"),
                Err(TritError::DeferralFull { .. })
            ));
        }
        assert_eq!(c.stats().total, 1);
        // Plain processing is unaffected by the backlog.
        assert_eq!(c.process(0.98).trit, Trit::One);
    }

    // ── consensus with configured parameters ─────────────────────

    #[test]
    fn test_weighted_consensus_uses_configured_delta() {
        // margin = (3 - 2) / 5 = 0.2
        let votes = [Vote::new(Trit::One, 3.0), Vote::new(Trit::Zero, 2.0)];
        let loose = TritClassifier::new(TritConfig::default()).unwrap();
        assert_eq!(loose.weighted_consensus(&votes).unwrap().trit, Trit::One);
        let strict = TritClassifier::new(TritConfig {
            consensus_delta: 0.3,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(strict.weighted_consensus(&votes).unwrap().trit, Trit::Psi);
    }

    #[test]
    fn test_quorum_consensus_uses_configured_quorum() {
        let votes = [
            Vote::unit(Trit::One),
            Vote::unit(Trit::One),
            Vote::unit(Trit::One),
            Vote::unit(Trit::Zero),
        ];
        let standard = TritClassifier::new(TritConfig::default()).unwrap();
        let out = standard.quorum_consensus(&votes).unwrap();
        assert_eq!(out.trit, Trit::One);
        assert!((out.margin - 0.75).abs() < 1e-12);
        let unanimous = TritClassifier::new(TritConfig {
            quorum: 0.9,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(unanimous.quorum_consensus(&votes).unwrap().trit, Trit::Psi);
    }

    #[test]
    fn test_expired_deferrals_count_timeouts() {
        let c = TritClassifier::new(instant_config()).unwrap();
        c.process_and_defer(0.5, "slow").unwrap();
        let later = Instant::now() + Duration::from_millis(5000);
        let expired = c.expire_deferrals_at(later);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].trit, Trit::Zero);
        assert_eq!(c.stats().timeouts, 1);
        assert!(c.pending_deferrals().is_empty());
    }

    #[test]
    fn test_resolve_deferral() {
        let c = TritClassifier::new(instant_config()).unwrap();
        let (_, ticket) = c.process_and_defer(0.52, "review").unwrap();
        let r = c.resolve_deferral(ticket.unwrap(), Trit::One).unwrap();
        assert_eq!(r.trit, Trit::One);
        assert!(c.expire_deferrals().is_empty());
    }

    #[test]
    fn test_psi_ratio() {
        let c = TritClassifier::new(instant_config()).unwrap();
        for x in [0.1, 0.5, 0.9, 0.5] {
            c.process(x);
        }
        assert!((c.psi_ratio() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reset() {
        let c = TritClassifier::new(TritConfig::default()).unwrap();
        c.process(1.0);
        c.process_and_defer(0.5, "x").unwrap();
        c.reset();
        assert_eq!(c.stats(), ClassifierStats::default());
        assert_eq!(c.smoothed(), 0.5);
        assert!(c.pending_deferrals().is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        let c = Arc::new(TritClassifier::new(TritConfig::default()).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        c.process(0.7);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(c.stats().total, 1000);
    }
}
