use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wl_core::errors::ErrorInfo;
use wl_core::WlError;

/// YAML-configurable parameters governing a Wang-Landau run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Histogram binning strategy.
    #[serde(default)]
    pub binning: BinningPolicy,
    /// Lower window bound in kcal/mol (defaults to `floor(mfe)`).
    #[serde(default)]
    pub energy_min: Option<f64>,
    /// Upper window bound in kcal/mol (defaults depend on the binning policy).
    #[serde(default)]
    pub energy_max: Option<f64>,
    /// Flatness threshold in `(0, 1]`.
    #[serde(default = "default_flat_fraction")]
    pub flat_fraction: f64,
    /// Modification factor floor; the run converges once `lnf <= ffinal`.
    #[serde(default = "default_ffinal")]
    pub ffinal: f64,
    /// Steps between flatness checks.
    #[serde(default = "default_check_steps")]
    pub check_steps: u64,
    /// Hard step ceiling.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
    /// Master seed policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Temperature in degrees Celsius used by the partition function.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Number of low-energy bins anchored to exact enumeration counts.
    #[serde(default = "default_anchor_bins")]
    pub anchor_bins: usize,
    /// Freeze the anchored bins of G at `ln S` and skip their updates.
    #[serde(default)]
    pub freeze_anchor_bins: bool,
    /// Report checkpoint schedule.
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
    /// Artefact layout.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_flat_fraction() -> f64 {
    0.8
}

fn default_ffinal() -> f64 {
    1e-6
}

fn default_check_steps() -> u64 {
    10_000
}

fn default_max_steps() -> u64 {
    10_000_000_000
}

fn default_temperature() -> f64 {
    37.0
}

fn default_anchor_bins() -> usize {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            binning: BinningPolicy::default(),
            energy_min: None,
            energy_max: None,
            flat_fraction: default_flat_fraction(),
            ffinal: default_ffinal(),
            check_steps: default_check_steps(),
            max_steps: default_max_steps(),
            seed_policy: SeedPolicy::default(),
            temperature: default_temperature(),
            anchor_bins: default_anchor_bins(),
            freeze_anchor_bins: false,
            checkpoint: CheckpointConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Supported histogram binning strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BinningPolicy {
    /// `bins` bins of equal width spanning the window.
    Uniform {
        /// Number of bins.
        #[serde(default = "default_bins")]
        bins: usize,
    },
    /// Bins of constant width starting at the window floor.
    Resolution {
        /// Bin width in kcal/mol.
        resolution: f64,
        /// Number of bins when no explicit ceiling is configured.
        #[serde(default = "default_bins")]
        bins: usize,
    },
}

fn default_bins() -> usize {
    10
}

impl Default for BinningPolicy {
    fn default() -> Self {
        BinningPolicy::Uniform {
            bins: default_bins(),
        }
    }
}

impl BinningPolicy {
    /// Configured bin count.
    pub fn bins(&self) -> usize {
        match self {
            BinningPolicy::Uniform { bins } | BinningPolicy::Resolution { bins, .. } => *bins,
        }
    }
}

/// Master seed policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Explicit master seed; derived from the clock when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Geometric checkpoint schedule: reports at `first * 10^(k / per_decade)` steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Step of the first report (0 disables reports).
    #[serde(default = "default_first_checkpoint")]
    pub first: u64,
    /// Reports per decade of steps.
    #[serde(default = "default_per_decade")]
    pub per_decade: u32,
}

fn default_first_checkpoint() -> u64 {
    1_000_000
}

fn default_per_decade() -> u32 {
    4
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            first: default_first_checkpoint(),
            per_decade: default_per_decade(),
        }
    }
}

/// Output directory layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for run artefacts. Nothing is written when absent.
    #[serde(default)]
    pub run_directory: Option<PathBuf>,
    /// File name prefix of DOS reports.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Flatness log filename relative to `run_directory`.
    #[serde(default = "default_flatness_filename")]
    pub flatness_file: PathBuf,
    /// Manifest filename relative to `run_directory`.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
}

fn default_prefix() -> String {
    "wl".to_string()
}

fn default_flatness_filename() -> PathBuf {
    PathBuf::from("flatness.csv")
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            run_directory: None,
            prefix: default_prefix(),
            flatness_file: default_flatness_filename(),
            manifest_file: default_manifest_filename(),
        }
    }
}

impl RunConfig {
    /// Parses a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, WlError> {
        let config: RunConfig = serde_yaml::from_str(text).map_err(|err| {
            WlError::Config(ErrorInfo::new("config-parse", err.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, WlError> {
        let text = fs::read_to_string(path).map_err(|err| WlError::io("config-read", err, path))?;
        Self::from_yaml(&text).map_err(|err| match err {
            WlError::Config(info) => {
                WlError::Config(info.with_context("path", path.display()))
            }
            other => other,
        })
    }

    /// Serializes the configuration back to YAML.
    pub fn to_yaml(&self) -> Result<String, WlError> {
        serde_yaml::to_string(self)
            .map_err(|err| WlError::Io(ErrorInfo::new("config-serialize", err.to_string())))
    }

    /// Rejects option combinations the driver cannot run with.
    pub fn validate(&self) -> Result<(), WlError> {
        let bins = self.binning.bins();
        if bins == 0 {
            return Err(invalid("invalid-bins", "at least one bin is required", "bins", bins));
        }
        if let BinningPolicy::Resolution { resolution, .. } = self.binning {
            if !(resolution.is_finite() && resolution > 0.0) {
                return Err(invalid(
                    "invalid-resolution",
                    "bin resolution must be positive",
                    "resolution",
                    resolution,
                ));
            }
        }
        if !(self.flat_fraction > 0.0 && self.flat_fraction <= 1.0) {
            return Err(invalid(
                "invalid-flat-fraction",
                "flat_fraction must lie in (0, 1]",
                "flat_fraction",
                self.flat_fraction,
            ));
        }
        if !(self.ffinal > 0.0 && self.ffinal < 1.0) {
            return Err(invalid(
                "invalid-ffinal",
                "ffinal must lie in (0, 1)",
                "ffinal",
                self.ffinal,
            ));
        }
        if self.check_steps == 0 {
            return Err(invalid(
                "invalid-check-steps",
                "check_steps must be positive",
                "check_steps",
                self.check_steps,
            ));
        }
        if self.anchor_bins == 0 || self.anchor_bins > bins {
            return Err(WlError::Config(
                ErrorInfo::new("invalid-anchor-bins", "anchor_bins must lie in 1..=bins")
                    .with_context("anchor_bins", self.anchor_bins)
                    .with_context("bins", bins),
            ));
        }
        if let (Some(min), Some(max)) = (self.energy_min, self.energy_max) {
            if min >= max {
                return Err(WlError::Config(
                    ErrorInfo::new("invalid-window", "energy_min must be below energy_max")
                        .with_context("energy_min", min)
                        .with_context("energy_max", max),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(code: &str, message: &str, key: &str, value: impl ToString) -> WlError {
    WlError::Config(ErrorInfo::new(code, message).with_context(key, value))
}
