// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — PSI Spike Monitor
// ─────────────────────────────────────────────────────────────────────
//! Sliding-window watch over a stream of classifications.
//!
//! Each PSI result triggers a count of PSI results inside the look-back
//! window; reaching `spike_threshold` raises a `SpikeAlert` graded by how
//! far the count overshoots the threshold. Every observation is also
//! tallied under its category.

use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use serde::Serialize;

use trit_types::{ClassifierStats, Trit, TritConfig};

/// Retained observations; older ones fall off regardless of the window.
pub const HISTORY_CAPACITY: usize = 1000;

/// Retained alerts. `alerts_triggered` keeps the full count.
pub const ALERT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Grade `count` against `threshold`: ×1.5 medium, ×2 high, ×3 critical.
    pub fn grade(count: usize, threshold: usize) -> Self {
        let ratio = count as f64 / threshold.max(1) as f64;
        if ratio >= 3.0 {
            Self::Critical
        } else if ratio >= 2.0 {
            Self::High
        } else if ratio >= 1.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpikeAlert {
    pub severity: Severity,
    pub psi_count: usize,
    pub category: String,
    pub message: String,
}

#[derive(Debug, Clone)]
struct Observation {
    at: Instant,
    trit: Trit,
}

#[derive(Debug)]
pub struct SpikeMonitor {
    threshold: usize,
    window: Duration,
    history: VecDeque<Observation>,
    alerts: VecDeque<SpikeAlert>,
    alerts_triggered: u64,
    categories: BTreeMap<String, ClassifierStats>,
}

impl SpikeMonitor {
    pub fn new(threshold: usize, window: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            window,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            alerts: VecDeque::with_capacity(ALERT_CAPACITY),
            alerts_triggered: 0,
            categories: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &TritConfig) -> Self {
        Self::new(
            config.spike_threshold,
            Duration::from_millis(config.spike_window_ms),
        )
    }

    pub fn record(&mut self, trit: Trit, category: &str) -> Option<SpikeAlert> {
        self.record_at(trit, category, Instant::now())
    }

    pub fn record_at(&mut self, trit: Trit, category: &str, now: Instant) -> Option<SpikeAlert> {
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(Observation { at: now, trit });
        self.categories
            .entry(category.to_string())
            .or_default()
            .record(trit);

        if trit != Trit::Psi {
            return None;
        }

        let psi_count = self.psi_in_window(now);
        if psi_count < self.threshold {
            return None;
        }

        let alert = SpikeAlert {
            severity: Severity::grade(psi_count, self.threshold),
            psi_count,
            category: category.to_string(),
            message: format!(
                "{psi_count} PSI results within {}ms",
                self.window.as_millis()
            ),
        };
        log::warn!("PSI spike [{:?}] {}: {}", alert.severity, category, alert.message);
        if self.alerts.len() == ALERT_CAPACITY {
            self.alerts.pop_front();
        }
        self.alerts.push_back(alert.clone());
        self.alerts_triggered += 1;
        Some(alert)
    }

    /// PSI observations no older than the window, as of `now`.
    pub fn psi_in_window(&self, now: Instant) -> usize {
        self.history
            .iter()
            .filter(|o| o.trit == Trit::Psi && now.saturating_duration_since(o.at) <= self.window)
            .count()
    }

    /// Most recent alerts, oldest first.
    pub fn alerts(&self) -> &VecDeque<SpikeAlert> {
        &self.alerts
    }

    /// Alerts raised since creation or the last `clear`.
    pub fn alerts_triggered(&self) -> u64 {
        self.alerts_triggered
    }

    /// Outcome counts for one category.
    pub fn category_stats(&self, category: &str) -> Option<ClassifierStats> {
        self.categories.get(category).copied()
    }

    /// Per-category outcome counts, ordered by category name.
    pub fn categories(&self) -> &BTreeMap<String, ClassifierStats> {
        &self.categories
    }

    pub fn observations(&self) -> usize {
        self.history.len()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.alerts.clear();
        self.alerts_triggered = 0;
        self.categories.clear();
    }
}
