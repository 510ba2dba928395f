use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wl_core::WlError;

use crate::config::RunConfig;
use crate::kernel::Termination;

/// Structured manifest describing a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Configuration used for the run.
    pub config: RunConfig,
    /// Master seed the substreams were derived from.
    pub master_seed: u64,
    /// How the run stopped.
    pub termination: Termination,
    /// Steps performed.
    pub steps: u64,
    /// Final structure in dot-bracket notation.
    pub final_structure: String,
    /// SHA-256 of the final structure.
    pub structure_hash: String,
    /// Flatness log relative to the run directory.
    pub flatness_file: Option<PathBuf>,
    /// Reports written during the run, relative to the run directory, in order.
    pub reports: Vec<PathBuf>,
}

impl RunManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), WlError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| WlError::io("manifest-mkdir", err, parent))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| WlError::io("manifest-serialize", err, path))?;
        fs::write(path, json).map_err(|err| WlError::io("manifest-write", err, path))
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, WlError> {
        let contents =
            fs::read_to_string(path).map_err(|err| WlError::io("manifest-read", err, path))?;
        serde_json::from_str(&contents).map_err(|err| WlError::io("manifest-parse", err, path))
    }
}
