use serde::{Deserialize, Serialize};

use crate::sequence::PairKind;

/// Energy parameters of the stacking model, in hundredths of kcal/mol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairEnergies {
    /// G-C pair.
    #[serde(default = "default_gc")]
    pub gc: i64,
    /// A-U pair.
    #[serde(default = "default_au")]
    pub au: i64,
    /// G-U wobble pair.
    #[serde(default = "default_gu")]
    pub gu: i64,
    /// Bonus for a pair `(i, j)` stacked on `(i + 1, j - 1)`.
    #[serde(default = "default_stack")]
    pub stack: i64,
}

fn default_gc() -> i64 {
    -300
}

fn default_au() -> i64 {
    -200
}

fn default_gu() -> i64 {
    -100
}

fn default_stack() -> i64 {
    -100
}

impl Default for PairEnergies {
    fn default() -> Self {
        Self {
            gc: default_gc(),
            au: default_au(),
            gu: default_gu(),
            stack: default_stack(),
        }
    }
}

impl PairEnergies {
    /// Energy of a single pair of the given kind.
    pub fn pair(&self, kind: PairKind) -> i64 {
        match kind {
            PairKind::GC => self.gc,
            PairKind::AU => self.au,
            PairKind::GU => self.gu,
        }
    }

    /// Lowest possible contribution of one additional pair (never positive).
    pub(crate) fn best_pair_contribution(&self) -> i64 {
        let best_pair = self.gc.min(self.au).min(self.gu).min(0);
        best_pair + self.stack.min(0)
    }
}
