use serde::{Deserialize, Serialize};
use wl_core::errors::ErrorInfo;
use wl_core::WlError;
use wl_hist::Histogram;

/// Boltzmann constant scale used by the partition function, per degree Kelvin.
pub const GAS_CONSTANT: f64 = 0.198717;
/// Offset between Celsius and Kelvin.
pub const ZERO_CELSIUS: f64 = 273.15;

/// How the anchored bins enter the normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorPolicy {
    /// Shift every populated bin from `anchor_bins - 1` upwards.
    Shift,
    /// Replace the anchored bins by `ln S` and shift the rest.
    Freeze,
}

impl AnchorPolicy {
    /// Policy matching the `freeze_anchor_bins` option.
    pub fn from_freeze(freeze: bool) -> Self {
        if freeze {
            AnchorPolicy::Freeze
        } else {
            AnchorPolicy::Shift
        }
    }
}

/// One bin of the normalized density of states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DosRow {
    /// Lower bin edge in kcal/mol.
    pub lower: f64,
    /// Upper bin edge in kcal/mol.
    pub upper: f64,
    /// Bin midpoint in kcal/mol.
    pub midpoint: f64,
    /// Normalized log-weight.
    pub log_weight: f64,
    /// Whether the bin carries an estimate. A visited bin may still have a
    /// log-weight of exactly 0 (`ln 1`).
    pub visited: bool,
}

/// Normalized density-of-states estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledDos {
    /// One row per histogram bin.
    pub rows: Vec<DosRow>,
}

impl ScaledDos {
    /// Rows that carry an estimate.
    pub fn populated(&self) -> impl Iterator<Item = &DosRow> + '_ {
        self.rows.iter().filter(|row| row.visited)
    }
}

/// Marks the bins of `g` that carry an estimate.
///
/// A bin is visited when its raw log-weight is non-zero, or when it is one of
/// the first `frozen_bins` bins and holds an exact count in `s`. Frozen bins
/// are pinned to `ln S` and never updated by the walk, so a unique structure
/// leaves them at exactly 0.
pub fn visited_bins(g: &Histogram, s: &Histogram, frozen_bins: usize) -> Vec<bool> {
    g.values()
        .iter()
        .zip(s.values())
        .enumerate()
        .map(|(bin, (&weight, &count))| weight != 0.0 || (bin < frozen_bins && count != 0.0))
        .collect()
}

/// Anchors the log-DOS `g` to the exact low-energy counts `s`.
///
/// With `factor = sum(S[..anchor_bins])` and `g0 = G[0]`, populated bins are
/// shifted by `ln(factor) - g0` as selected by `policy`.
pub fn anchor_and_scale(
    g: &Histogram,
    s: &Histogram,
    anchor_bins: usize,
    policy: AnchorPolicy,
) -> Result<ScaledDos, WlError> {
    if !g.same_geometry(s) {
        return Err(WlError::Config(ErrorInfo::new(
            "geometry-mismatch",
            "G and S must share bin edges",
        )));
    }
    if anchor_bins == 0 || anchor_bins > g.bins() {
        return Err(WlError::Config(
            ErrorInfo::new("invalid-anchor-bins", "anchor_bins must lie in 1..=bins")
                .with_context("anchor_bins", anchor_bins)
                .with_context("bins", g.bins()),
        ));
    }
    let factor: f64 = s.values()[..anchor_bins].iter().sum();
    if factor <= 0.0 {
        return Err(WlError::Config(
            ErrorInfo::new("empty-anchor", "anchored bins hold no enumerated structures")
                .with_context("anchor_bins", anchor_bins)
                .with_hint("use fewer bins or a wider lowest bin"),
        ));
    }
    let offset = factor.ln() - g.values()[0];
    let frozen_bins = match policy {
        AnchorPolicy::Freeze => anchor_bins,
        AnchorPolicy::Shift => 0,
    };
    let visited = visited_bins(g, s, frozen_bins);

    let mut weights = g.values().to_vec();
    for (i, weight) in weights.iter_mut().enumerate() {
        match policy {
            AnchorPolicy::Freeze if i < anchor_bins => {
                let count = s.values()[i];
                if count != 0.0 {
                    *weight = count.ln();
                }
            }
            AnchorPolicy::Freeze => {
                if *weight != 0.0 {
                    *weight += offset;
                }
            }
            AnchorPolicy::Shift => {
                if i + 1 >= anchor_bins && *weight != 0.0 {
                    *weight += offset;
                }
            }
        }
    }

    let rows = weights
        .into_iter()
        .zip(visited)
        .enumerate()
        .filter_map(|(bin, (log_weight, visited))| {
            let (lower, upper) = g.get_range(bin)?;
            Some(DosRow {
                lower,
                upper,
                midpoint: 0.5 * (lower + upper),
                log_weight,
                visited,
            })
        })
        .collect();
    Ok(ScaledDos { rows })
}

/// `kT` in hundredths of kcal/mol at `temperature` degrees Celsius.
pub fn thermal_energy(temperature: f64) -> f64 {
    GAS_CONSTANT * (temperature + ZERO_CELSIUS)
}

/// `sum G * exp(-G / kT)` over the populated rows.
///
/// The log-weight plays both roles and `kT` stays in native units; callers
/// comparing against a Boltzmann sum must account for that.
pub fn partition_function(dos: &ScaledDos, temperature: f64) -> f64 {
    let kt = thermal_energy(temperature);
    dos.populated()
        .map(|row| row.log_weight * (-row.log_weight / kt).exp())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histograms() -> (Histogram, Histogram) {
        let mut g = Histogram::uniform(3, 0.0, 3.0).unwrap();
        let mut s = g.clone();
        for (bin, (gv, sv)) in [(10.0, 100.0), (12.0, 50.0), (15.0, 1.0)].into_iter().enumerate() {
            g.set(bin, gv).unwrap();
            s.set(bin, sv).unwrap();
        }
        (g, s)
    }

    fn weights(dos: &ScaledDos) -> Vec<f64> {
        dos.rows.iter().map(|row| row.log_weight).collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn shift_keeps_lower_bins() {
        let (g, s) = histograms();
        let dos = anchor_and_scale(&g, &s, 2, AnchorPolicy::Shift).unwrap();
        let ln150 = 150f64.ln();
        assert_close(&weights(&dos), &[10.0, 12.0 + ln150 - 10.0, 15.0 + ln150 - 10.0]);
        assert_eq!(dos.rows[1].midpoint, 1.5);
    }

    #[test]
    fn freeze_uses_exact_counts() {
        let (g, s) = histograms();
        let dos = anchor_and_scale(&g, &s, 2, AnchorPolicy::Freeze).unwrap();
        let ln150 = 150f64.ln();
        assert_close(
            &weights(&dos),
            &[100f64.ln(), 50f64.ln(), 15.0 + ln150 - 10.0],
        );
    }

    #[test]
    fn single_anchor_pins_lowest_bin() {
        let (g, s) = histograms();
        let dos = anchor_and_scale(&g, &s, 1, AnchorPolicy::Shift).unwrap();
        assert!((dos.rows[0].log_weight - 100f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn unvisited_bins_stay_zero() {
        let (mut g, s) = histograms();
        g.set(2, 0.0).unwrap();
        let dos = anchor_and_scale(&g, &s, 1, AnchorPolicy::Shift).unwrap();
        assert_eq!(dos.rows[2].log_weight, 0.0);
        assert_eq!(dos.populated().count(), 2);
    }

    #[test]
    fn unique_ground_state_keeps_its_row() {
        let mut g = Histogram::uniform(3, 0.0, 3.0).unwrap();
        let mut s = g.clone();
        g.set(0, 3.0).unwrap();
        g.set(1, 5.0).unwrap();
        s.set(0, 1.0).unwrap();

        let dos = anchor_and_scale(&g, &s, 1, AnchorPolicy::Shift).unwrap();
        assert_close(&weights(&dos), &[0.0, 2.0, 0.0]);
        let populated: Vec<f64> = dos.populated().map(|row| row.midpoint).collect();
        assert_eq!(populated, vec![0.5, 1.5]);
    }

    #[test]
    fn frozen_unique_ground_state_keeps_its_row() {
        let mut g = Histogram::uniform(3, 0.0, 3.0).unwrap();
        let mut s = g.clone();
        // ln S[0] = ln 1 leaves the frozen bin at zero.
        g.set(1, 4.0).unwrap();
        s.set(0, 1.0).unwrap();

        assert_eq!(visited_bins(&g, &s, 1), vec![true, true, false]);
        assert_eq!(visited_bins(&g, &s, 0), vec![false, true, false]);
        let dos = anchor_and_scale(&g, &s, 1, AnchorPolicy::Freeze).unwrap();
        assert!(dos.rows[0].visited);
        assert_eq!(dos.rows[0].log_weight, 0.0);
        assert_eq!(dos.populated().count(), 2);
    }

    #[test]
    fn empty_anchor_is_rejected() {
        let (g, mut s) = histograms();
        s.reset();
        let err = anchor_and_scale(&g, &s, 2, AnchorPolicy::Shift).unwrap_err();
        assert_eq!(err.info().code, "empty-anchor");
    }

    #[test]
    fn partition_function_sums_populated_rows() {
        let dos = ScaledDos {
            rows: vec![
                DosRow {
                    lower: 0.0,
                    upper: 1.0,
                    midpoint: 0.5,
                    log_weight: 2.0,
                    visited: true,
                },
                DosRow {
                    lower: 1.0,
                    upper: 2.0,
                    midpoint: 1.5,
                    log_weight: 0.0,
                    visited: false,
                },
            ],
        };
        let kt = thermal_energy(37.0);
        assert!((kt - 61.6321).abs() < 1e-3);
        let z = partition_function(&dos, 37.0);
        assert!((z - 2.0 * (-2.0 / kt).exp()).abs() < 1e-12);
    }
}
