use std::fmt::{self, Display};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wl_core::WlError;
use wl_hist::Histogram;

use crate::normalize::ScaledDos;

/// Kind of DOS report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    /// Raw log-scale snapshot of G.
    LogScale,
    /// Snapshot normalized against the anchored bins.
    Scaled,
}

impl ReportKind {
    /// File name tag.
    pub fn tag(&self) -> &'static str {
        match self {
            ReportKind::LogScale => "lg",
            ReportKind::Scaled => "sc",
        }
    }
}

/// Step label of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStep {
    /// In-progress snapshot taken at this step.
    Step(u64),
    /// Estimate after the run stopped.
    Final,
}

impl Display for ReportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStep::Step(step) => write!(f, "{step}"),
            ReportStep::Final => f.write_str("final"),
        }
    }
}

/// `{dir}/{prefix}.{step}.{tag}.dos`
pub fn report_path(dir: &Path, prefix: &str, step: ReportStep, kind: ReportKind) -> PathBuf {
    dir.join(format!("{prefix}.{step}.{}.dos", kind.tag()))
}

/// Writes the bins of a raw G snapshot flagged in `visited`
/// (see [`crate::normalize::visited_bins`]).
pub fn write_log_scale(
    path: &Path,
    step: ReportStep,
    lnf: f64,
    g: &Histogram,
    visited: &[bool],
) -> Result<(), WlError> {
    let rows = (0..g.bins()).filter_map(|bin| {
        let weight = g.get(bin)?;
        let midpoint = g.midpoint(bin)?;
        visited.get(bin).copied().unwrap_or(false).then_some((midpoint, weight))
    });
    write_rows(path, step, lnf, rows)
}

/// Writes the populated rows of a normalized estimate.
pub fn write_scaled(path: &Path, step: ReportStep, lnf: f64, dos: &ScaledDos) -> Result<(), WlError> {
    let rows = dos.populated().map(|row| (row.midpoint, row.log_weight));
    write_rows(path, step, lnf, rows)
}

fn write_rows(
    path: &Path,
    step: ReportStep,
    lnf: f64,
    rows: impl Iterator<Item = (f64, f64)>,
) -> Result<(), WlError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| WlError::io("report-mkdir", err, parent))?;
    }
    let file = File::create(path).map_err(|err| WlError::io("report-create", err, path))?;
    let mut out = BufWriter::new(file);
    let write_err = |err: std::io::Error| WlError::io("report-write", err, path);
    writeln!(out, "# step {step} lnf {lnf:e}").map_err(write_err)?;
    for (midpoint, weight) in rows {
        writeln!(out, "{midpoint:.4}\t{weight:.6}").map_err(write_err)?;
    }
    out.flush().map_err(write_err)
}

/// Parses a report back into `(midpoint, log-weight)` pairs.
pub fn read_report(path: &Path) -> Result<Vec<(f64, f64)>, WlError> {
    let text = fs::read_to_string(path).map_err(|err| WlError::io("report-read", err, path))?;
    text.lines()
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
        .map(|line| {
            let mut fields = line.split('\t').map(str::parse::<f64>);
            match (fields.next(), fields.next()) {
                (Some(Ok(midpoint)), Some(Ok(weight))) => Ok((midpoint, weight)),
                _ => Err(WlError::io("report-parse", format!("malformed line `{line}`"), path)),
            }
        })
        .collect()
}
