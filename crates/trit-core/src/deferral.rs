// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — Deferral Queue
// ─────────────────────────────────────────────────────────────────────
//! Parking lot for PSI results.
//!
//! A deferred entry either gets an explicit committed resolution via
//! `resolve()`, or ages past the timeout and falls back to the configured
//! safe default on the next `expire()` sweep.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

use trit_types::{Trit, TritConfig, TritError, TritResult};

/// A PSI result awaiting resolution.
#[derive(Debug, Clone)]
pub struct Deferral {
    pub id: u64,
    pub confidence: f64,
    pub context: String,
    pub enqueued_at: Instant,
}

impl Deferral {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.enqueued_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionReason {
    /// Aged out and took the safe default.
    Timeout,
    /// Resolved explicitly by the caller.
    Resolved,
}

/// How a deferral left the queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub id: u64,
    pub confidence: f64,
    pub context: String,
    pub trit: Trit,
    pub reason: ResolutionReason,
}

/// Bounded FIFO of pending PSI results.
#[derive(Debug)]
pub struct DeferralQueue {
    entries: VecDeque<Deferral>,
    timeout: Duration,
    capacity: usize,
    safe_default: Trit,
    next_id: u64,
}

impl DeferralQueue {
    pub fn new(timeout: Duration, capacity: usize, safe_default: Trit) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            timeout,
            capacity: capacity.max(1),
            safe_default,
            next_id: 1,
        }
    }

    pub fn from_config(config: &TritConfig) -> Self {
        Self::new(
            Duration::from_millis(config.deferral_timeout_ms),
            config.deferral_capacity,
            config.safe_default,
        )
    }

    /// Park a PSI result. Returns its id.
    pub fn defer(&mut self, confidence: f64, context: impl Into<String>) -> TritResult<u64> {
        self.defer_at(confidence, context, Instant::now())
    }

    pub fn defer_at(
        &mut self,
        confidence: f64,
        context: impl Into<String>,
        now: Instant,
    ) -> TritResult<u64> {
        if self.entries.len() >= self.capacity {
            log::warn!("Deferral queue full ({} entries)", self.capacity);
            return Err(TritError::DeferralFull {
                capacity: self.capacity,
            });
        }
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_back(Deferral {
            id,
            confidence,
            context: context.into(),
            enqueued_at: now,
        });
        Ok(id)
    }

    /// Sweep entries older than the timeout into the safe default.
    pub fn expire(&mut self) -> Vec<Resolution> {
        self.expire_at(Instant::now())
    }

    pub fn expire_at(&mut self, now: Instant) -> Vec<Resolution> {
        let mut expired = Vec::new();
        let timeout = self.timeout;
        let safe_default = self.safe_default;
        self.entries.retain(|entry| {
            if entry.age(now) > timeout {
                expired.push(Resolution {
                    id: entry.id,
                    confidence: entry.confidence,
                    context: entry.context.clone(),
                    trit: safe_default,
                    reason: ResolutionReason::Timeout,
                });
                false
            } else {
                true
            }
        });
        if !expired.is_empty() {
            log::info!(
                "{} deferral(s) timed out, resolved to {}",
                expired.len(),
                safe_default
            );
        }
        expired
    }

    /// Commit a pending entry to an explicit value.
    pub fn resolve(&mut self, id: u64, trit: Trit) -> TritResult<Resolution> {
        if !trit.is_committed() {
            return Err(TritError::Validation(format!(
                "deferral {id} cannot be resolved to PSI"
            )));
        }
        let pos = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(TritError::UnknownDeferral { id })?;
        let entry = self
            .entries
            .remove(pos)
            .ok_or(TritError::UnknownDeferral { id })?;
        Ok(Resolution {
            id: entry.id,
            confidence: entry.confidence,
            context: entry.context,
            trit,
            reason: ResolutionReason::Resolved,
        })
    }

    /// Pending entries, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Deferral> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
