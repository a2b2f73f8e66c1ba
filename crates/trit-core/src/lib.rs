// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — Core Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Three-way threshold classification with smoothing, consensus, and
//! time-bounded deferral of undecided results.
//!
//! # Invariants
//!
//! 1. **The band is closed**: `θ - δ ≤ c ≤ θ + δ` is PSI, edges included.
//!    Only strictly-outside values commit to ZERO or ONE.
//!
//! 2. **Bad input never commits**: NaN confidence is sanitized to 0.5
//!    before smoothing and infinities are clamped. The bare `classify`
//!    maps NaN to PSI.
//!
//! 3. **PSI is never final**: every deferred PSI result leaves the queue
//!    either through an explicit ZERO/ONE resolution or by timing out
//!    into the configured safe default. A safe default of PSI is rejected
//!    at config validation.
//!
//! 4. **Flapping is damped**: when more than half of the window's slots
//!    record a threshold crossing, the confidence is pulled toward θ,
//!    fully collapsing onto it at 100% density.

pub mod classifier;
pub mod consensus;
pub mod decision;
pub mod deferral;
pub mod logic;
pub mod monitor;
pub mod power;
pub mod smoothing;
pub mod triage;

pub use classifier::{classify, TritClassifier};
pub use consensus::{majority, quorum_consensus, weighted_consensus, ConsensusOutcome, Vote};
pub use decision::{Decision, DecisionEngine, DecisionStats, Outcome};
pub use deferral::{Deferral, DeferralQueue, Resolution, ResolutionReason};
pub use logic::{and3, not3, or3, resolve_psi, xor3, WeightedTrit};
pub use monitor::{Severity, SpikeAlert, SpikeMonitor};
pub use power::{PowerMode, PowerPolicy};
pub use smoothing::{apply_density_penalty, Ewma, TransitionWindow};
pub use triage::TriageQueue;
