// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — Input Smoothing (EWMA + Transition Density)
// ─────────────────────────────────────────────────────────────────────
//! Pre-classification conditioning of the confidence signal.
//!
//! - `Ewma` — exponential weighted moving average, `α·x + (1-α)·prev`.
//! - `TransitionWindow` — sliding record of threshold crossings. A signal
//!   that flips sides of θ too often is pulled toward θ by
//!   `apply_density_penalty` so that it lands in the PSI band.

use std::collections::VecDeque;

use trit_types::sanitize_confidence;

/// Exponential weighted moving average.
#[derive(Debug, Clone)]
pub struct Ewma {
    alpha: f64,
    value: f64,
}

impl Ewma {
    pub fn new(alpha: f64, initial: f64) -> Self {
        Self {
            alpha: alpha.clamp(f64::EPSILON, 1.0),
            value: sanitize_confidence(initial),
        }
    }

    /// Fold one sample into the average and return the new value.
    pub fn update(&mut self, sample: f64) -> f64 {
        let x = sanitize_confidence(sample);
        self.value = self.alpha * x + (1.0 - self.alpha) * self.value;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn reset(&mut self, initial: f64) {
        self.value = sanitize_confidence(initial);
    }
}

/// Fixed-size window of threshold-crossing flags.
#[derive(Debug, Clone)]
pub struct TransitionWindow {
    capacity: usize,
    flags: VecDeque<bool>,
    crossings: usize,
}

impl TransitionWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            flags: VecDeque::with_capacity(capacity),
            crossings: 0,
        }
    }

    pub fn record(&mut self, crossed: bool) {
        if self.flags.len() == self.capacity {
            if let Some(true) = self.flags.pop_front() {
                self.crossings -= 1;
            }
        }
        self.flags.push_back(crossed);
        if crossed {
            self.crossings += 1;
        }
    }

    /// Crossings per window slot, in [0, 1].
    ///
    /// Normalized by capacity, not fill level: a half-empty window
    /// cannot report a high density.
    pub fn density(&self) -> f64 {
        (self.crossings as f64 / self.capacity as f64).clamp(0.0, 1.0)
    }

    pub fn crossings(&self) -> usize {
        self.crossings
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn clear(&mut self) {
        self.flags.clear();
        self.crossings = 0;
    }
}

/// Pull `confidence` toward `threshold` when crossings are dense.
///
/// `penalty = max(0, (density - 0.5) * 2)`; below 50% density the
/// confidence passes through untouched, at 100% it collapses onto θ.
#[inline]
pub fn apply_density_penalty(confidence: f64, density: f64, threshold: f64) -> f64 {
    let penalty = ((density.clamp(0.0, 1.0) - 0.5) * 2.0).max(0.0);
    confidence * (1.0 - penalty) + threshold * penalty
}
