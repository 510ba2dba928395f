#![deny(missing_docs)]
#![doc = "Core traits and data types shared by the Wang-Landau sampler crates."]

pub mod energy;
pub mod errors;
pub mod model;
pub mod rng;
pub mod structure;

pub use energy::Energy;
pub use errors::{ErrorInfo, WlError};
pub use model::{EnergyModel, PairingRule};
pub use rng::{derive_substream_seed, RngHandle};
pub use structure::{Move, PairTable, MIN_HAIRPIN};
