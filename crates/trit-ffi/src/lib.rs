// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — PyO3 FFI Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// PyO3 macros expand to unsafe blocks, so unsafe_code is not denied here.
//! Python-callable wrappers around the Rust Trit Kernel.
//!
//! Trits cross the boundary as integer codes: 0 = ZERO, 1 = PSI, 2 = ONE.
//! Invalid configs, codes and vote weights raise `ValueError`.
//!
//! Install: `pip install -e crates/trit-ffi` (requires maturin).
//!
//! Usage from Python:
//! ```python
//! from trit_kernel import TritClassifier, classify
//!
//! classify(0.52)                      # 1 (PSI)
//! clf = TritClassifier()
//! result, ticket = clf.process_and_defer(0.5, "job-17")
//! ```

use std::time::Duration;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use rand::rngs::StdRng;
use rand::SeedableRng;

use trit_core::deferral::{Resolution, ResolutionReason};
use trit_core::monitor::SpikeAlert;
use trit_core::{logic, SpikeMonitor, TritClassifier, Vote};
use trit_types::{Classification, ClassifierStats, Trit, TritConfig};

fn trit_from_code(code: u8) -> PyResult<Trit> {
    Trit::from_code(code).map_err(|e| PyValueError::new_err(e.to_string()))
}

fn votes_from_pairs(votes: Vec<(u8, f64)>) -> PyResult<Vec<Vote>> {
    votes
        .into_iter()
        .map(|(code, weight)| Ok(Vote::new(trit_from_code(code)?, weight)))
        .collect()
}

fn resolution_dict<'py>(py: Python<'py>, r: &Resolution) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("id", r.id)?;
    dict.set_item("confidence", r.confidence)?;
    dict.set_item("context", r.context.as_str())?;
    dict.set_item("trit", r.trit.code())?;
    let reason = match r.reason {
        ResolutionReason::Timeout => "timeout",
        ResolutionReason::Resolved => "resolved",
    };
    dict.set_item("reason", reason)?;
    Ok(dict)
}

// ─── PyTritConfig ───────────────────────────────────────────────────

/// Python-visible configuration for the classifier pipeline.
#[pyclass(name = "TritConfig")]
#[derive(Clone)]
struct PyTritConfig {
    inner: TritConfig,
}

#[pymethods]
impl PyTritConfig {
    #[new]
    #[pyo3(signature = (
        threshold = 0.5,
        delta = 0.05,
        consensus_delta = 0.10,
        quorum = 0.66,
        alpha = 0.1,
        initial_confidence = 0.5,
        deferral_timeout_ms = 1000,
        deferral_capacity = 100,
        safe_default = 0,
        density_window = 100,
        powersave_psi_ratio = 0.80,
        performance_psi_ratio = 0.20,
        spike_threshold = 5,
        spike_window_ms = 60_000,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        threshold: f64,
        delta: f64,
        consensus_delta: f64,
        quorum: f64,
        alpha: f64,
        initial_confidence: f64,
        deferral_timeout_ms: u64,
        deferral_capacity: usize,
        safe_default: u8,
        density_window: usize,
        powersave_psi_ratio: f64,
        performance_psi_ratio: f64,
        spike_threshold: usize,
        spike_window_ms: u64,
    ) -> PyResult<Self> {
        let config = TritConfig {
            threshold,
            delta,
            consensus_delta,
            quorum,
            alpha,
            initial_confidence,
            deferral_timeout_ms,
            deferral_capacity,
            safe_default: trit_from_code(safe_default)?,
            density_window,
            powersave_psi_ratio,
            performance_psi_ratio,
            spike_threshold,
            spike_window_ms,
        };
        config
            .validate()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner: config })
    }

    /// Construct from JSON string; missing fields take their defaults.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config =
            TritConfig::from_json(json).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner: config })
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner
            .to_json()
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    #[getter]
    fn threshold(&self) -> f64 {
        self.inner.threshold
    }

    #[getter]
    fn delta(&self) -> f64 {
        self.inner.delta
    }

    #[getter]
    fn consensus_delta(&self) -> f64 {
        self.inner.consensus_delta
    }

    #[getter]
    fn quorum(&self) -> f64 {
        self.inner.quorum
    }

    #[getter]
    fn lower_bound(&self) -> f64 {
        self.inner.lower_bound()
    }

    #[getter]
    fn upper_bound(&self) -> f64 {
        self.inner.upper_bound()
    }

    fn __repr__(&self) -> String {
        format!(
            "TritConfig(threshold={}, delta={}, alpha={}, deferral_timeout_ms={})",
            self.inner.threshold, self.inner.delta, self.inner.alpha, self.inner.deferral_timeout_ms
        )
    }
}

// ─── PyClassification ───────────────────────────────────────────────

#[pyclass(name = "Classification")]
#[derive(Clone)]
struct PyClassification {
    inner: Classification,
}

#[pymethods]
impl PyClassification {
    #[getter]
    fn trit(&self) -> u8 {
        self.inner.trit.code()
    }

    #[getter]
    fn symbol(&self) -> &'static str {
        self.inner.trit.symbol()
    }

    #[getter]
    fn confidence(&self) -> f64 {
        self.inner.confidence
    }

    #[getter]
    fn input(&self) -> f64 {
        self.inner.input
    }

    #[getter]
    fn is_psi(&self) -> bool {
        !self.inner.trit.is_committed()
    }

    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        dict.set_item("trit", self.inner.trit.code())?;
        dict.set_item("confidence", self.inner.confidence)?;
        dict.set_item("input", self.inner.input)?;
        Ok(dict)
    }

    fn __repr__(&self) -> String {
        format!(
            "Classification(trit={}, confidence={:.4}, input={:.4})",
            self.inner.trit, self.inner.confidence, self.inner.input
        )
    }
}

// ─── PyStats ────────────────────────────────────────────────────────

#[pyclass(name = "ClassifierStats")]
#[derive(Clone)]
struct PyStats {
    inner: ClassifierStats,
}

#[pymethods]
impl PyStats {
    #[getter]
    fn total(&self) -> u64 {
        self.inner.total
    }

    #[getter]
    fn zeros(&self) -> u64 {
        self.inner.zeros
    }

    #[getter]
    fn ones(&self) -> u64 {
        self.inner.ones
    }

    #[getter]
    fn psi(&self) -> u64 {
        self.inner.psi
    }

    #[getter]
    fn timeouts(&self) -> u64 {
        self.inner.timeouts
    }

    #[getter]
    fn psi_ratio(&self) -> f64 {
        self.inner.psi_ratio()
    }

    fn __repr__(&self) -> String {
        format!(
            "ClassifierStats(total={}, zeros={}, ones={}, psi={}, timeouts={})",
            self.inner.total, self.inner.zeros, self.inner.ones, self.inner.psi, self.inner.timeouts
        )
    }
}

// ─── TritClassifier ─────────────────────────────────────────────────

/// Stateful pipeline: EWMA, density penalty, band check, deferral.
#[pyclass(name = "TritClassifier")]
struct PyTritClassifier {
    inner: TritClassifier,
}

#[pymethods]
impl PyTritClassifier {
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<PyTritConfig>) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        let inner = TritClassifier::new(cfg).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }

    fn process(&self, confidence: f64) -> PyClassification {
        PyClassification {
            inner: self.inner.process(confidence),
        }
    }

    fn process_raw(&self, raw: u32) -> PyClassification {
        PyClassification {
            inner: self.inner.process_raw(raw),
        }
    }

    /// Returns `(classification, ticket)`; ticket is None unless PSI.
    #[pyo3(signature = (confidence, context = ""))]
    fn process_and_defer(
        &self,
        confidence: f64,
        context: &str,
    ) -> PyResult<(PyClassification, Option<u64>)> {
        let (inner, ticket) = self
            .inner
            .process_and_defer(confidence, context)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok((PyClassification { inner }, ticket))
    }

    fn classify(&self, confidence: f64) -> PyClassification {
        PyClassification {
            inner: self.inner.classify(confidence),
        }
    }

    /// Timed-out deferrals as dicts, resolved to the safe default.
    fn expire_deferrals<'py>(&self, py: Python<'py>) -> PyResult<Vec<Bound<'py, PyDict>>> {
        self.inner
            .expire_deferrals()
            .iter()
            .map(|r| resolution_dict(py, r))
            .collect()
    }

    fn resolve_deferral<'py>(
        &self,
        py: Python<'py>,
        id: u64,
        trit: u8,
    ) -> PyResult<Bound<'py, PyDict>> {
        let resolution = self
            .inner
            .resolve_deferral(id, trit_from_code(trit)?)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        resolution_dict(py, &resolution)
    }

    fn pending_deferrals(&self) -> Vec<u64> {
        self.inner.pending_deferrals().iter().map(|d| d.id).collect()
    }

    /// Weighted vote with the configured `consensus_delta`.
    fn weighted_consensus(&self, votes: Vec<(u8, f64)>) -> PyResult<(u8, f64)> {
        let outcome = self
            .inner
            .weighted_consensus(&votes_from_pairs(votes)?)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok((outcome.trit.code(), outcome.margin))
    }

    /// Quorum vote with the configured `quorum`.
    fn quorum_consensus(&self, votes: Vec<(u8, f64)>) -> PyResult<(u8, f64)> {
        let outcome = self
            .inner
            .quorum_consensus(&votes_from_pairs(votes)?)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok((outcome.trit.code(), outcome.margin))
    }

    fn stats(&self) -> PyStats {
        PyStats {
            inner: self.inner.stats(),
        }
    }

    #[getter]
    fn psi_ratio(&self) -> f64 {
        self.inner.psi_ratio()
    }

    #[getter]
    fn smoothed(&self) -> f64 {
        self.inner.smoothed()
    }

    #[getter]
    fn density(&self) -> f64 {
        self.inner.density()
    }

    fn reset(&self) {
        self.inner.reset();
    }
}

// ─── SpikeMonitor ───────────────────────────────────────────────────

#[pyclass(name = "SpikeMonitor")]
struct PySpikeMonitor {
    inner: SpikeMonitor,
}

#[pymethods]
impl PySpikeMonitor {
    #[new]
    #[pyo3(signature = (threshold = 5, window_ms = 60_000))]
    fn new(threshold: usize, window_ms: u64) -> Self {
        Self {
            inner: SpikeMonitor::new(threshold, Duration::from_millis(window_ms)),
        }
    }

    /// Record one classification; returns an alert dict on a spike.
    #[pyo3(signature = (trit, category = "default"))]
    fn record<'py>(
        &mut self,
        py: Python<'py>,
        trit: u8,
        category: &str,
    ) -> PyResult<Option<Bound<'py, PyDict>>> {
        match self.inner.record(trit_from_code(trit)?, category) {
            Some(alert) => Ok(Some(alert_dict(py, &alert)?)),
            None => Ok(None),
        }
    }

    /// Alerts raised so far; the retained list is capped.
    fn alert_count(&self) -> u64 {
        self.inner.alerts_triggered()
    }

    /// Most recent alerts as dicts, oldest first.
    fn recent_alerts<'py>(&self, py: Python<'py>) -> PyResult<Vec<Bound<'py, PyDict>>> {
        self.inner.alerts().iter().map(|a| alert_dict(py, a)).collect()
    }

    /// `{category: ClassifierStats}` for every category seen.
    fn category_stats<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        for (category, stats) in self.inner.categories() {
            dict.set_item(category.as_str(), PyStats { inner: *stats })?;
        }
        Ok(dict)
    }

    fn clear(&mut self) {
        self.inner.clear();
    }
}

fn alert_dict<'py>(py: Python<'py>, alert: &SpikeAlert) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("severity", format!("{:?}", alert.severity).to_lowercase())?;
    dict.set_item("psi_count", alert.psi_count)?;
    dict.set_item("category", alert.category.as_str())?;
    dict.set_item("message", alert.message.as_str())?;
    Ok(dict)
}

// ─── Free functions ─────────────────────────────────────────────────

/// Band check: 0 below θ-δ, 2 above θ+δ, 1 (PSI) inside.
#[pyfunction]
#[pyo3(signature = (confidence, threshold = 0.5, delta = 0.05))]
fn classify(confidence: f64, threshold: f64, delta: f64) -> u8 {
    trit_core::classify(confidence, threshold, delta).code()
}

/// `votes` is a list of `(trit_code, weight)`; returns `(trit_code, margin)`.
/// `consensus_delta` defaults to the `TritConfig` default.
#[pyfunction]
#[pyo3(signature = (votes, consensus_delta = None))]
fn weighted_consensus(votes: Vec<(u8, f64)>, consensus_delta: Option<f64>) -> PyResult<(u8, f64)> {
    let delta = consensus_delta.unwrap_or(TritConfig::default().consensus_delta);
    let outcome = trit_core::weighted_consensus(&votes_from_pairs(votes)?, delta)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok((outcome.trit.code(), outcome.margin))
}

/// `quorum` defaults to the `TritConfig` default; must lie in (0.5, 1].
#[pyfunction]
#[pyo3(signature = (votes, quorum = None))]
fn quorum_consensus(votes: Vec<(u8, f64)>, quorum: Option<f64>) -> PyResult<(u8, f64)> {
    let quorum = quorum.unwrap_or(TritConfig::default().quorum);
    let outcome = trit_core::quorum_consensus(&votes_from_pairs(votes)?, quorum)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok((outcome.trit.code(), outcome.margin))
}

#[pyfunction]
fn trit_and(a: u8, b: u8) -> PyResult<u8> {
    Ok(logic::and3(trit_from_code(a)?, trit_from_code(b)?).code())
}

#[pyfunction]
fn trit_or(a: u8, b: u8) -> PyResult<u8> {
    Ok(logic::or3(trit_from_code(a)?, trit_from_code(b)?).code())
}

#[pyfunction]
fn trit_not(a: u8) -> PyResult<u8> {
    Ok(logic::not3(trit_from_code(a)?).code())
}

#[pyfunction]
fn trit_xor(a: u8, b: u8) -> PyResult<u8> {
    Ok(logic::xor3(trit_from_code(a)?, trit_from_code(b)?).code())
}

/// Biased coin flip for a PSI confidence. Seeded when `seed` is given.
#[pyfunction]
#[pyo3(signature = (confidence, threshold = 0.5, delta = 0.05, seed = None))]
fn resolve_psi(confidence: f64, threshold: f64, delta: f64, seed: Option<u64>) -> u8 {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    logic::resolve_psi(confidence, threshold, delta, &mut rng).code()
}

// ─── Module Registration ────────────────────────────────────────────

/// Trit Kernel — three-way threshold classification for Python.
///
/// - `TritConfig` — configuration
/// - `TritClassifier` — smoothing + band check + deferral
/// - `Classification`, `ClassifierStats` — results
/// - `SpikeMonitor` — PSI spike alerts
/// - `classify`, `weighted_consensus`, `quorum_consensus`, `trit_and`,
///   `trit_or`, `trit_not`, `trit_xor`, `resolve_psi` — free functions
#[pymodule]
fn trit_kernel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTritConfig>()?;
    m.add_class::<PyClassification>()?;
    m.add_class::<PyStats>()?;
    m.add_class::<PyTritClassifier>()?;
    m.add_class::<PySpikeMonitor>()?;
    // Stateless helpers
    m.add_function(wrap_pyfunction!(classify, m)?)?;
    m.add_function(wrap_pyfunction!(weighted_consensus, m)?)?;
    m.add_function(wrap_pyfunction!(quorum_consensus, m)?)?;
    m.add_function(wrap_pyfunction!(trit_and, m)?)?;
    m.add_function(wrap_pyfunction!(trit_or, m)?)?;
    m.add_function(wrap_pyfunction!(trit_not, m)?)?;
    m.add_function(wrap_pyfunction!(trit_xor, m)?)?;
    m.add_function(wrap_pyfunction!(resolve_psi, m)?)?;
    Ok(())
}
