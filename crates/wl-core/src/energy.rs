//! Energy values in the oracle's native unit.

use std::fmt::{self, Display};
use std::ops::{Add, AddAssign, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Number of native units per kcal/mol.
pub const UNITS_PER_KCAL: f64 = 100.0;

/// Energy in hundredths of kcal/mol.
///
/// Histograms are binned in kcal/mol; [`Energy::kcal`] is the only conversion
/// the driver uses so that the oracle and every histogram agree on units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Energy(i64);

impl Energy {
    /// Zero energy (the open chain in most models).
    pub const ZERO: Energy = Energy(0);

    /// Creates a value from native hundredths.
    pub const fn from_hundredths(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw native value.
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Converts to kcal/mol.
    pub fn kcal(self) -> f64 {
        self.0 as f64 / UNITS_PER_KCAL
    }

    /// Rounds a kcal/mol value to the nearest native unit.
    pub fn from_kcal(kcal: f64) -> Self {
        Self((kcal * UNITS_PER_KCAL).round() as i64)
    }

    /// Largest native energy strictly below the given kcal/mol bound.
    pub fn below_kcal(bound: f64) -> Self {
        Self((bound * UNITS_PER_KCAL).ceil() as i64 - 1)
    }
}

impl Add for Energy {
    type Output = Energy;

    fn add(self, rhs: Energy) -> Energy {
        Energy(self.0 + rhs.0)
    }
}

impl AddAssign for Energy {
    fn add_assign(&mut self, rhs: Energy) {
        self.0 += rhs.0;
    }
}

impl Sub for Energy {
    type Output = Energy;

    fn sub(self, rhs: Energy) -> Energy {
        Energy(self.0 - rhs.0)
    }
}

impl Neg for Energy {
    type Output = Energy;

    fn neg(self) -> Energy {
        Energy(-self.0)
    }
}

impl Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.kcal())
    }
}
