use serde::{Deserialize, Serialize};

use crate::histogram::Histogram;

/// Outcome of a flatness evaluation on a visit histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flatness {
    /// Whether every populated bin reached `flat_fraction * average`.
    pub flat: bool,
    /// Lowest populated bin.
    pub lbin: Option<usize>,
    /// Highest populated bin.
    pub gbin: Option<usize>,
    /// Mean of the non-zero payloads in `lbin..=gbin`.
    pub average: f64,
    /// Smallest non-zero payload in `lbin..=gbin`.
    pub minimum: f64,
}

impl Flatness {
    fn empty() -> Self {
        Self {
            flat: false,
            lbin: None,
            gbin: None,
            average: 0.0,
            minimum: 0.0,
        }
    }
}

impl Histogram {
    /// One-sided Wang-Landau flatness test.
    ///
    /// Only under-visited bins fail the test; empty bins inside the populated
    /// span are ignored, and an empty histogram is never flat.
    pub fn is_flat(&self, flat_fraction: f64) -> bool {
        self.flatness(flat_fraction).flat
    }

    /// Same decision as [`Histogram::is_flat`] together with the statistics it used.
    pub fn flatness(&self, flat_fraction: f64) -> Flatness {
        let Some((lbin, gbin)) = self.populated_span() else {
            return Flatness::empty();
        };
        let populated: Vec<f64> = self.values()[lbin..=gbin]
            .iter()
            .copied()
            .filter(|&value| value != 0.0)
            .collect();
        let average = populated.iter().sum::<f64>() / populated.len() as f64;
        let minimum = populated.iter().copied().fold(f64::INFINITY, f64::min);
        Flatness {
            flat: minimum >= flat_fraction * average,
            lbin: Some(lbin),
            gbin: Some(gbin),
            average,
            minimum,
        }
    }
}
