use serde::Serialize;
use wl_core::errors::ErrorInfo;
use wl_core::WlError;

/// Histogram over contiguous half-open bins `[edges[k], edges[k + 1])`.
///
/// The same type backs the visit histogram H, the log-DOS estimate G and the
/// reference counts S; only the payload meaning differs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    edges: Vec<f64>,
    values: Vec<f64>,
}

impl Histogram {
    /// Allocates `bins` bins of equal width over `[min, max)`.
    pub fn uniform(bins: usize, min: f64, max: f64) -> Result<Self, WlError> {
        if bins == 0 {
            return Err(invalid_bins("histogram needs at least one bin", bins));
        }
        if !(min.is_finite() && max.is_finite()) || min >= max {
            return Err(WlError::Config(
                ErrorInfo::new("invalid-window", "histogram range must satisfy min < max")
                    .with_context("min", min)
                    .with_context("max", max),
            ));
        }
        let width = max - min;
        let mut edges: Vec<f64> = (0..bins)
            .map(|k| min + k as f64 * width / bins as f64)
            .collect();
        edges.push(max);
        Self::with_edges(edges)
    }

    /// Allocates bins from an explicit, strictly increasing edge array of length `bins + 1`.
    pub fn with_edges(edges: Vec<f64>) -> Result<Self, WlError> {
        if edges.len() < 2 {
            return Err(invalid_bins(
                "edge array needs at least two entries",
                edges.len().saturating_sub(1),
            ));
        }
        if let Some(pos) = edges.iter().position(|edge| !edge.is_finite()) {
            return Err(WlError::Config(
                ErrorInfo::new("invalid-edges", "histogram edges must be finite")
                    .with_context("index", pos),
            ));
        }
        if let Some(pos) = edges.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(WlError::Config(
                ErrorInfo::new("invalid-edges", "histogram edges must be strictly increasing")
                    .with_context("index", pos + 1)
                    .with_context("lower", edges[pos])
                    .with_context("upper", edges[pos + 1]),
            ));
        }
        let values = vec![0.0; edges.len() - 1];
        Ok(Self { edges, values })
    }

    /// Allocates bins of constant `resolution` starting at `min`.
    ///
    /// Without a ceiling the top edge is `min + bins * resolution`. With a
    /// ceiling the bin count is derived from it and the last bin ends exactly
    /// at the ceiling.
    pub fn with_resolution(
        min: f64,
        resolution: f64,
        bins: usize,
        ceiling: Option<f64>,
    ) -> Result<Self, WlError> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(WlError::Config(
                ErrorInfo::new("invalid-resolution", "bin resolution must be positive")
                    .with_context("resolution", resolution),
            ));
        }
        match ceiling {
            None => {
                if bins == 0 {
                    return Err(invalid_bins("histogram needs at least one bin", 0));
                }
                let edges = (0..=bins).map(|k| min + k as f64 * resolution).collect();
                Self::with_edges(edges)
            }
            Some(max) => {
                if !(min.is_finite() && max.is_finite()) || min >= max {
                    return Err(WlError::Config(
                        ErrorInfo::new("invalid-window", "histogram range must satisfy min < max")
                            .with_context("min", min)
                            .with_context("max", max),
                    ));
                }
                let count = ((max - min) / resolution).ceil().max(1.0) as usize;
                let slack = resolution * 1e-9;
                let mut edges: Vec<f64> = (0..count)
                    .map(|k| min + k as f64 * resolution)
                    .take_while(|&edge| edge < max - slack)
                    .collect();
                edges.push(max);
                Self::with_edges(edges)
            }
        }
    }

    /// Number of bins.
    pub fn bins(&self) -> usize {
        self.values.len()
    }

    /// Lower bound of the first bin.
    pub fn min(&self) -> f64 {
        self.edges[0]
    }

    /// Upper (exclusive) bound of the last bin.
    pub fn max(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Bin edges, `bins() + 1` entries.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Bin payloads.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Locates the bin holding `value`.
    ///
    /// A value on an interior edge belongs to the upper bin. Values outside
    /// `[min, max)` are a domain error: the walk has left the window and the
    /// caller is expected to abort.
    pub fn find(&self, value: f64) -> Result<usize, WlError> {
        if value.is_nan() {
            return Err(WlError::Domain(
                ErrorInfo::new("energy-not-finite", "cannot bin a NaN energy")
                    .with_context("value", value),
            ));
        }
        if value < self.min() {
            return Err(WlError::Domain(
                ErrorInfo::new("energy-below-window", "energy is below the histogram window")
                    .with_context("value", value)
                    .with_context("min", self.min())
                    .with_hint("lower energy_min so the window covers the ground state"),
            ));
        }
        if value >= self.max() {
            return Err(WlError::Domain(
                ErrorInfo::new("energy-above-window", "energy is at or above the histogram window")
                    .with_context("value", value)
                    .with_context("max", self.max())
                    .with_hint("raise energy_max or use a coarser binning to widen the window"),
            ));
        }
        Ok(self.edges.partition_point(|&edge| edge <= value) - 1)
    }

    /// Adds one to the bin holding `value`.
    pub fn increment(&mut self, value: f64) -> Result<usize, WlError> {
        self.accumulate(value, 1.0)
    }

    /// Adds `weight` to the bin holding `value`.
    pub fn accumulate(&mut self, value: f64, weight: f64) -> Result<usize, WlError> {
        let bin = self.find(value)?;
        self.values[bin] += weight;
        Ok(bin)
    }

    /// Adds one to `bin`.
    ///
    /// # Panics
    /// Panics if `bin >= self.bins()`.
    pub fn increment_bin(&mut self, bin: usize) {
        self.values[bin] += 1.0;
    }

    /// Adds `weight` to `bin`.
    ///
    /// # Panics
    /// Panics if `bin >= self.bins()`.
    pub fn accumulate_bin(&mut self, bin: usize, weight: f64) {
        self.values[bin] += weight;
    }

    /// Payload of `bin`.
    pub fn get(&self, bin: usize) -> Option<f64> {
        self.values.get(bin).copied()
    }

    /// Overwrites the payload of `bin`.
    pub fn set(&mut self, bin: usize, value: f64) -> Result<(), WlError> {
        let bins = self.bins();
        let slot = self.values.get_mut(bin).ok_or_else(|| bin_out_of_range(bin, bins))?;
        *slot = value;
        Ok(())
    }

    /// Half-open range `(lo, hi)` covered by `bin`.
    pub fn get_range(&self, bin: usize) -> Option<(f64, f64)> {
        if bin < self.bins() {
            Some((self.edges[bin], self.edges[bin + 1]))
        } else {
            None
        }
    }

    /// Midpoint of `bin`.
    pub fn midpoint(&self, bin: usize) -> Option<f64> {
        self.get_range(bin).map(|(lo, hi)| 0.5 * (lo + hi))
    }

    /// Zeroes every payload.
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|value| *value = 0.0);
    }

    /// Adds `delta` to every payload.
    pub fn shift(&mut self, delta: f64) {
        self.values.iter_mut().for_each(|value| *value += delta);
    }

    /// Sum of all payloads.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Lowest and highest bins with a non-zero payload.
    pub fn populated_span(&self) -> Option<(usize, usize)> {
        let lbin = self.values.iter().position(|&value| value != 0.0)?;
        let gbin = self.values.iter().rposition(|&value| value != 0.0)?;
        Some((lbin, gbin))
    }

    /// Returns `true` when both histograms have identical edges.
    pub fn same_geometry(&self, other: &Histogram) -> bool {
        self.edges == other.edges
    }
}

fn invalid_bins(message: &str, bins: usize) -> WlError {
    WlError::Config(ErrorInfo::new("invalid-bins", message).with_context("bins", bins))
}

fn bin_out_of_range(bin: usize, bins: usize) -> WlError {
    WlError::Config(
        ErrorInfo::new("bin-out-of-range", "bin index exceeds histogram size")
            .with_context("bin", bin)
            .with_context("bins", bins),
    )
}
