// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Trit values, configuration, and error hierarchy for the Trit Kernel,
//! a three-way threshold classifier (ZERO / PSI / ONE).

pub mod config;
pub mod error;
pub mod trit;

pub use config::TritConfig;
pub use error::{TritError, TritResult};
pub use trit::{normalize_raw, sanitize_confidence, Classification, ClassifierStats, Trit};
