//! Capability traits implemented by energy-model collaborators.

use crate::energy::Energy;
use crate::errors::WlError;
use crate::structure::{Move, PairTable};

/// Pairing predicate consulted by the move model for insertions.
pub trait PairingRule {
    /// Returns `true` when positions `i < j` may form a pair.
    fn can_pair(&self, i: usize, j: usize) -> bool;
}

impl<F> PairingRule for F
where
    F: Fn(usize, usize) -> bool,
{
    fn can_pair(&self, i: usize, j: usize) -> bool {
        self(i, j)
    }
}

/// Energy oracle consumed by the Wang-Landau driver.
///
/// Energies are returned in native units; see [`Energy`].
pub trait EnergyModel: PairingRule {
    /// Returns the starting configuration of the walk and its energy.
    fn initial_energy(&self) -> Result<(Energy, PairTable), WlError>;

    /// Returns the ground-state (minimum) energy of the search space.
    fn ground_energy(&self) -> Result<Energy, WlError>;

    /// Returns the exact energy change caused by applying `mv` to `config`.
    fn move_delta(&self, config: &PairTable, mv: Move) -> Result<Energy, WlError>;

    /// Enumerates every configuration with energy at most `ground + window`.
    fn enumerate_low_energy(&self, window: Energy) -> Result<Vec<(PairTable, Energy)>, WlError>;
}
