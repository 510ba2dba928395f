#![deny(missing_docs)]

//! Wang-Landau density-of-states sampler over pair-table configurations.
//!
//! The driver is generic over [`wl_core::EnergyModel`]: it proposes uniform
//! random base-pair moves, accepts them with the inverse-DOS Metropolis rule,
//! halves the modification factor whenever the visit histogram is flat and
//! finally anchors the log-DOS to exact low-energy counts.

/// DOS report files and their naming scheme.
pub mod checkpoint;
/// YAML configuration schema and defaults.
pub mod config;
/// Seed resolution and RNG substreams.
pub mod determinism;
/// Sampler state machine and the public `run` entry point.
pub mod kernel;
/// Run manifest serialization helpers.
pub mod manifest;
/// Flatness check records and their CSV export.
pub mod metrics;
/// Move enumeration and uniform move selection.
pub mod moves;
/// Anchoring of the log-DOS and the partition function.
pub mod normalize;
/// Modification-factor and report schedules.
pub mod schedule;

pub use config::{BinningPolicy, CheckpointConfig, OutputConfig, RunConfig, SeedPolicy};
pub use kernel::{run, Diagnostics, RunSummary, Sampler, SamplerState, StepOutcome, Termination};
pub use metrics::FlatnessCheck;
pub use moves::{enumerate_moves, enumerate_moves_shuffled, random_move};
pub use normalize::{
    anchor_and_scale, partition_function, visited_bins, AnchorPolicy, DosRow, ScaledDos,
};
