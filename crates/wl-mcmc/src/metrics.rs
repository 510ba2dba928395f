use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use wl_hist::Flatness;

/// Outcome of one periodic flatness check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatnessCheck {
    /// Step at which the check ran.
    pub step: u64,
    /// Whether H was flat.
    pub flat: bool,
    /// Modification factor after the check.
    pub lnf: f64,
    /// Lowest populated bin of H.
    pub lbin: Option<usize>,
    /// Highest populated bin of H.
    pub gbin: Option<usize>,
    /// Mean of the populated bins.
    pub average: f64,
    /// Smallest populated bin.
    pub minimum: f64,
}

impl FlatnessCheck {
    /// Builds a record from a flatness evaluation.
    pub fn new(step: u64, lnf: f64, flatness: &Flatness) -> Self {
        Self {
            step,
            flat: flatness.flat,
            lnf,
            lbin: flatness.lbin,
            gbin: flatness.gbin,
            average: flatness.average,
            minimum: flatness.minimum,
        }
    }
}

/// Writes the flatness checks to a CSV file.
pub fn write_flatness_csv<P: AsRef<Path>>(path: P, checks: &[FlatnessCheck]) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "step,flat,lnf,lbin,gbin,average,minimum")?;
    for check in checks {
        writeln!(
            file,
            "{},{},{:e},{},{},{:.3},{:.3}",
            check.step,
            check.flat,
            check.lnf,
            optional(check.lbin),
            optional(check.gbin),
            check.average,
            check.minimum
        )?;
    }
    file.flush()
}

fn optional(bin: Option<usize>) -> String {
    bin.map(|bin| bin.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn csv_has_one_row_per_check() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flatness.csv");
        let flat = Flatness {
            flat: true,
            lbin: Some(0),
            gbin: Some(3),
            average: 10.0,
            minimum: 9.0,
        };
        let empty = Flatness {
            flat: false,
            lbin: None,
            gbin: None,
            average: 0.0,
            minimum: 0.0,
        };
        let checks = vec![
            FlatnessCheck::new(100, 0.5, &flat),
            FlatnessCheck::new(200, 0.5, &empty),
        ];
        write_flatness_csv(&path, &checks).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "100,true,5e-1,0,3,10.000,9.000");
        assert_eq!(lines[2], "200,false,5e-1,,,0.000,0.000");
    }
}
