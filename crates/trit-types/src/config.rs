// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{TritError, TritResult};
use crate::trit::Trit;

/// Runtime configuration for the classifier pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TritConfig {
    /// Classification threshold θ.
    /// Default: 0.5.
    pub threshold: f64,

    /// Half-width δ of the undecided band around θ.
    /// Default: 0.05.
    pub delta: f64,

    /// Minimum weighted margin for a committed consensus.
    /// Default: 0.10.
    pub consensus_delta: f64,

    /// Weight share a single state needs to win a quorum vote.
    /// Default: 0.66.
    pub quorum: f64,

    /// EWMA smoothing factor α (weight of the newest sample).
    /// Default: 0.1.
    pub alpha: f64,

    /// EWMA seed value.
    /// Default: 0.5.
    pub initial_confidence: f64,

    /// Age after which a deferred PSI result falls back to `safe_default`.
    /// Default: 1000.
    pub deferral_timeout_ms: u64,

    /// Maximum number of pending deferrals.
    /// Default: 100.
    pub deferral_capacity: usize,

    /// Committed value a timed-out deferral resolves to.
    /// Default: Zero.
    pub safe_default: Trit,

    /// Number of samples in the threshold-crossing window.
    /// Default: 100.
    pub density_window: usize,

    /// PSI ratio above which the power policy selects powersave.
    /// Default: 0.80.
    pub powersave_psi_ratio: f64,

    /// PSI ratio below which the power policy selects performance.
    /// Default: 0.20.
    pub performance_psi_ratio: f64,

    /// PSI results within `spike_window_ms` that raise a spike alert.
    /// Default: 5.
    pub spike_threshold: usize,

    /// Look-back window for spike detection.
    /// Default: 60000.
    pub spike_window_ms: u64,
}

impl Default for TritConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            delta: 0.05,
            consensus_delta: 0.10,
            quorum: 0.66,
            alpha: 0.1,
            initial_confidence: 0.5,
            deferral_timeout_ms: 1000,
            deferral_capacity: 100,
            safe_default: Trit::Zero,
            density_window: 100,
            powersave_psi_ratio: 0.80,
            performance_psi_ratio: 0.20,
            spike_threshold: 5,
            spike_window_ms: 60_000,
        }
    }
}

impl TritConfig {
    /// Lower edge of the PSI band (θ - δ).
    pub fn lower_bound(&self) -> f64 {
        self.threshold - self.delta
    }

    /// Upper edge of the PSI band (θ + δ).
    pub fn upper_bound(&self) -> f64 {
        self.threshold + self.delta
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> TritResult<()> {
        if !(0.1..=0.9).contains(&self.threshold) {
            return Err(TritError::Config(format!(
                "threshold must be in [0.1, 0.9], got {}",
                self.threshold
            )));
        }
        if !(0.01..=0.25).contains(&self.delta) {
            return Err(TritError::Config(format!(
                "delta must be in [0.01, 0.25], got {}",
                self.delta
            )));
        }
        if self.delta > self.threshold.min(1.0 - self.threshold) {
            return Err(TritError::Config(format!(
                "delta {} pushes the band outside [0, 1] around threshold {}",
                self.delta, self.threshold
            )));
        }
        if !(0.01..=0.5).contains(&self.consensus_delta) {
            return Err(TritError::Config(format!(
                "consensus_delta must be in [0.01, 0.5], got {}",
                self.consensus_delta
            )));
        }
        if !(self.quorum > 0.5 && self.quorum <= 1.0) {
            return Err(TritError::Config(format!(
                "quorum must be in (0.5, 1], got {}",
                self.quorum
            )));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(TritError::Config(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.initial_confidence) {
            return Err(TritError::Config(format!(
                "initial_confidence must be in [0, 1], got {}",
                self.initial_confidence
            )));
        }
        if self.deferral_timeout_ms == 0 {
            return Err(TritError::Config(
                "deferral_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.deferral_capacity < 1 {
            return Err(TritError::Config(format!(
                "deferral_capacity must be >= 1, got {}",
                self.deferral_capacity
            )));
        }
        if !self.safe_default.is_committed() {
            return Err(TritError::Config(
                "safe_default must be ZERO or ONE".to_string(),
            ));
        }
        if self.density_window < 1 {
            return Err(TritError::Config(format!(
                "density_window must be >= 1, got {}",
                self.density_window
            )));
        }
        if !(0.0..=1.0).contains(&self.powersave_psi_ratio)
            || !(0.0..=1.0).contains(&self.performance_psi_ratio)
        {
            return Err(TritError::Config(format!(
                "power psi ratios must be in [0, 1], got {} / {}",
                self.powersave_psi_ratio, self.performance_psi_ratio
            )));
        }
        if self.performance_psi_ratio >= self.powersave_psi_ratio {
            return Err(TritError::Config(format!(
                "performance_psi_ratio {} must be below powersave_psi_ratio {}",
                self.performance_psi_ratio, self.powersave_psi_ratio
            )));
        }
        if self.spike_threshold < 1 {
            return Err(TritError::Config(format!(
                "spike_threshold must be >= 1, got {}",
                self.spike_threshold
            )));
        }
        if self.spike_window_ms == 0 {
            return Err(TritError::Config(
                "spike_window_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from JSON string and validate.
    pub fn from_json(json: &str) -> TritResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TritError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> TritResult<String> {
        serde_json::to_string(self)
            .map_err(|e| TritError::Config(format!("JSON encode error: {e}")))
    }
}
