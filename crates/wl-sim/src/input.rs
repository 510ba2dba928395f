use std::fs;
use std::path::Path;

use wl_core::errors::ErrorInfo;
use wl_core::{PairTable, WlError};
use wl_rna::{BasePairModel, Sequence};

/// Sequence and optional start structure read from an input file.
#[derive(Debug, Clone, PartialEq)]
pub struct RunInput {
    pub sequence: String,
    pub structure: Option<String>,
}

impl RunInput {
    /// Parses the input text: comment lines (`*`), header lines (`>`) and
    /// blank lines are skipped; the first remaining line is the sequence and
    /// the next one, if any, the start structure.
    pub fn parse(text: &str) -> Result<Self, WlError> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('*') && !line.starts_with('>'));
        let sequence = lines.next().ok_or_else(|| {
            WlError::Model(ErrorInfo::new("missing-sequence", "input holds no sequence line"))
        })?;
        let structure = lines
            .next()
            .map(|line| line.split_whitespace().next().unwrap_or(line).to_string());
        Ok(Self {
            sequence: sequence.to_string(),
            structure,
        })
    }

    pub fn load(path: &Path) -> Result<Self, WlError> {
        let text = fs::read_to_string(path).map_err(|err| WlError::io("input-read", err, path))?;
        Self::parse(&text).map_err(|err| match err {
            WlError::Model(info) => WlError::Model(info.with_context("path", path.display())),
            other => other,
        })
    }

    /// Builds the reference model, starting from the open chain when no structure was given.
    pub fn model(&self) -> Result<BasePairModel, WlError> {
        let sequence = Sequence::parse(&self.sequence)?;
        match &self.structure {
            Some(structure) => BasePairModel::new(sequence, PairTable::from_dot_bracket(structure)?),
            None => BasePairModel::open_chain(sequence),
        }
    }
}
