// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — Three-Tier Triage Queue
// ─────────────────────────────────────────────────────────────────────
//! Work items bucketed by their classification.
//!
//! ONE items run first, ZERO items when nothing urgent is left, and PSI
//! items are held back until they are promoted to a committed tier.

use std::collections::VecDeque;

use trit_types::{Trit, TritError, TritResult};

#[derive(Debug)]
pub struct TriageQueue<T> {
    high: VecDeque<T>,
    low: VecDeque<T>,
    held: Vec<T>,
}

impl<T> Default for TriageQueue<T> {
    fn default() -> Self {
        Self {
            high: VecDeque::new(),
            low: VecDeque::new(),
            held: Vec::new(),
        }
    }
}

impl<T> TriageQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T, trit: Trit) {
        match trit {
            Trit::One => self.high.push_back(item),
            Trit::Zero => self.low.push_back(item),
            Trit::Psi => self.held.push(item),
        }
    }

    /// Next runnable item; held PSI items are never returned.
    pub fn next(&mut self) -> Option<T> {
        self.high.pop_front().or_else(|| self.low.pop_front())
    }

    /// Items awaiting evaluation.
    pub fn held(&self) -> &[T] {
        &self.held
    }

    /// Move the first held item matching `pred` into a committed tier.
    ///
    /// Returns `Ok(false)` when nothing matched.
    pub fn promote<F>(&mut self, pred: F, trit: Trit) -> TritResult<bool>
    where
        F: Fn(&T) -> bool,
    {
        if !trit.is_committed() {
            return Err(TritError::Validation(
                "held items can only be promoted to ZERO or ONE".to_string(),
            ));
        }
        match self.held.iter().position(pred) {
            Some(pos) => {
                let item = self.held.remove(pos);
                self.push(item, trit);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// (high, low, held) lengths.
    pub fn lens(&self) -> (usize, usize, usize) {
        (self.high.len(), self.low.len(), self.held.len())
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.low.is_empty() && self.held.is_empty()
    }
}
