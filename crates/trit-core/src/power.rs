// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — PSI-Ratio Power Policy
// ─────────────────────────────────────────────────────────────────────
//! Maps the observed PSI ratio onto a coarse power mode. Pure policy:
//! applying the mode to hardware is left to the caller.

use serde::{Deserialize, Serialize};

use trit_types::TritConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerMode {
    Performance,
    Balanced,
    Powersave,
}

#[derive(Debug, Clone)]
pub struct PowerPolicy {
    powersave_above: f64,
    performance_below: f64,
    mode: PowerMode,
    changes: u64,
}

impl PowerPolicy {
    pub fn new(powersave_above: f64, performance_below: f64) -> Self {
        Self {
            powersave_above,
            performance_below,
            mode: PowerMode::Balanced,
            changes: 0,
        }
    }

    pub fn from_config(config: &TritConfig) -> Self {
        Self::new(config.powersave_psi_ratio, config.performance_psi_ratio)
    }

    /// Feed the latest PSI ratio; returns the selected mode.
    pub fn update(&mut self, psi_ratio: f64) -> PowerMode {
        let next = if psi_ratio > self.powersave_above {
            PowerMode::Powersave
        } else if psi_ratio < self.performance_below {
            PowerMode::Performance
        } else {
            PowerMode::Balanced
        };
        if next != self.mode {
            log::info!("power mode {:?} -> {next:?} (psi_ratio {psi_ratio:.3})", self.mode);
            self.mode = next;
            self.changes += 1;
        }
        next
    }

    pub fn mode(&self) -> PowerMode {
        self.mode
    }

    /// Number of mode transitions so far.
    pub fn changes(&self) -> u64 {
        self.changes
    }
}
