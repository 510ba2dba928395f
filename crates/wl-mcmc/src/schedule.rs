use serde::{Deserialize, Serialize};

use crate::config::CheckpointConfig;

/// Modification factor `lnf`, halved on every flatness event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationSchedule {
    lnf: f64,
    ffinal: f64,
    halvings: u32,
}

impl ModificationSchedule {
    /// Starts at `lnf = 1`.
    pub fn new(ffinal: f64) -> Self {
        Self {
            lnf: 1.0,
            ffinal,
            halvings: 0,
        }
    }

    /// Current modification factor.
    pub fn lnf(&self) -> f64 {
        self.lnf
    }

    /// Number of flatness events seen so far.
    pub fn halvings(&self) -> u32 {
        self.halvings
    }

    /// Feeds the outcome of a flatness check; returns `true` when `lnf` was halved.
    pub fn on_check(&mut self, flat: bool) -> bool {
        if flat {
            self.lnf /= 2.0;
            self.halvings += 1;
        }
        flat
    }

    /// `true` once `lnf <= ffinal`.
    pub fn is_converged(&self) -> bool {
        self.lnf <= self.ffinal
    }
}

/// Geometric report schedule: steps `first * 10^(k / per_decade)` for `k = 0, 1, ...`.
///
/// Rounded steps that repeat an earlier one are skipped, so every reported
/// step is strictly larger than the previous.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointSchedule {
    first: u64,
    per_decade: u32,
    k: u32,
    next: Option<u64>,
}

impl CheckpointSchedule {
    /// Builds the schedule; `first == 0` or `per_decade == 0` disables it.
    pub fn new(config: &CheckpointConfig) -> Self {
        let next = (config.first > 0 && config.per_decade > 0).then_some(config.first);
        Self {
            first: config.first,
            per_decade: config.per_decade,
            k: 0,
            next,
        }
    }

    /// Next scheduled step, if any.
    pub fn next_step(&self) -> Option<u64> {
        self.next
    }

    /// Returns `true` when `step` is a report step and advances the schedule.
    pub fn is_due(&mut self, step: u64) -> bool {
        match self.next {
            Some(next) if step >= next => {
                self.advance(next);
                true
            }
            _ => false,
        }
    }

    fn advance(&mut self, current: u64) {
        loop {
            self.k += 1;
            let exponent = f64::from(self.k) / f64::from(self.per_decade);
            let candidate = (self.first as f64 * 10f64.powf(exponent)).round();
            if !candidate.is_finite() || candidate >= u64::MAX as f64 {
                self.next = None;
                return;
            }
            let candidate = candidate as u64;
            if candidate > current {
                self.next = Some(candidate);
                return;
            }
        }
    }
}
