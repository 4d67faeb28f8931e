//! Acceptance-rate driven adaptation of the proposal scale.
//!
//! Rate          Scale adaptation
//! ----          ----------------
//! < 0.001       x 0.1
//! < 0.05        x 0.5
//! < 0.2         x 0.9
//! > 0.95        x 10
//! > 0.75        x 2
//! > 0.5         x 1.1
//!
//! The bands are checked in this order and at most one applies.

use serde::Serialize;

/// Multiplier for the adaptive scale factor of a coordinate with the given
/// acceptance rate, or `None` if the rate is acceptable.
pub fn scale_adjustment(rate: f64) -> Option<f64> {
    if rate < 0.001 {
        Some(0.1)
    } else if rate < 0.05 {
        Some(0.5)
    } else if rate < 0.2 {
        Some(0.9)
    } else if rate > 0.95 {
        Some(10.)
    } else if rate > 0.75 {
        Some(2.)
    } else if rate > 0.5 {
        Some(1.1)
    } else {
        None
    }
}

/// `accepted / (accepted + rejected)`, or `None` without any proposals.
pub fn acceptance_rate(accepted: u64, rejected: u64) -> Option<f64> {
    let total = accepted + rejected;
    if total == 0 {
        None
    } else {
        Some(accepted as f64 / total as f64)
    }
}

/// Diagnostics emitted after each tuning round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuneReport {
    pub value: Vec<f64>,
    /// Acceptance rate per coordinate over the last window, `None` if the
    /// coordinate was not proposed at all.
    pub acceptance_rate: Vec<Option<f64>>,
    pub adaptive_scale_factor: Vec<f64>,
    pub still_tuning: bool,
}

pub trait TuneReporter {
    fn report(&mut self, report: &TuneReport);
}

impl<F: FnMut(&TuneReport)> TuneReporter for F {
    fn report(&mut self, report: &TuneReport) {
        self(report)
    }
}
