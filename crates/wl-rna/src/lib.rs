#![deny(missing_docs)]

//! Reference RNA energy model for the Wang-Landau sampler.
//!
//! [`BasePairModel`] scores a secondary structure by summing per-pair
//! energies and a stacking bonus, and implements [`wl_core::EnergyModel`]
//! with exact ground-state and low-energy scans for short sequences.

mod model;
mod params;
mod sequence;

pub use model::{BasePairModel, MAX_ENUMERATION_LENGTH};
pub use params::PairEnergies;
pub use sequence::{pair_kind, Base, PairKind, Sequence};
