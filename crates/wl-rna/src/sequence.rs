use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use wl_core::errors::ErrorInfo;
use wl_core::WlError;

/// Nucleotide. `T` is read as `U`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Base {
    /// Adenine.
    A,
    /// Cytosine.
    C,
    /// Guanine.
    G,
    /// Uracil (or thymine).
    U,
}

impl Base {
    fn parse(symbol: char) -> Option<Base> {
        match symbol.to_ascii_uppercase() {
            'A' => Some(Base::A),
            'C' => Some(Base::C),
            'G' => Some(Base::G),
            'U' | 'T' => Some(Base::U),
            _ => None,
        }
    }
}

/// Kind of a canonical or wobble pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairKind {
    /// G-C or C-G.
    GC,
    /// A-U or U-A.
    AU,
    /// G-U or U-G wobble.
    GU,
}

/// Classifies the pair `(a, b)`; `None` for non-pairing bases.
pub fn pair_kind(a: Base, b: Base) -> Option<PairKind> {
    match (a, b) {
        (Base::G, Base::C) | (Base::C, Base::G) => Some(PairKind::GC),
        (Base::A, Base::U) | (Base::U, Base::A) => Some(PairKind::AU),
        (Base::G, Base::U) | (Base::U, Base::G) => Some(PairKind::GU),
        _ => None,
    }
}

/// Validated RNA (or DNA) sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    text: String,
    bases: Vec<Base>,
}

impl Sequence {
    /// Parses a sequence over `ACGUT`, case insensitive.
    pub fn parse(text: &str) -> Result<Self, WlError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WlError::Model(ErrorInfo::new(
                "empty-sequence",
                "sequence must contain at least one base",
            )));
        }
        let bases = text
            .chars()
            .enumerate()
            .map(|(pos, symbol)| {
                Base::parse(symbol).ok_or_else(|| {
                    WlError::Model(
                        ErrorInfo::new("invalid-base", "sequence contains a non-nucleotide symbol")
                            .with_context("symbol", symbol)
                            .with_context("position", pos + 1),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            text: text.to_ascii_uppercase(),
            bases,
        })
    }

    /// Number of bases.
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Whether the sequence has no bases.
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Parsed bases in order.
    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    /// Pair kind of positions `i` and `j`, if both exist and pair.
    pub fn pair_kind(&self, i: usize, j: usize) -> Option<PairKind> {
        let (a, b) = (*self.bases.get(i)?, *self.bases.get(j)?);
        pair_kind(a, b)
    }
}

impl Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thymine_pairs_like_uracil() {
        let seq = Sequence::parse("gcAT").unwrap();
        assert_eq!(seq.to_string(), "GCAT");
        assert_eq!(seq.pair_kind(2, 3), Some(PairKind::AU));
        assert_eq!(seq.pair_kind(0, 3), Some(PairKind::GU));
        assert_eq!(seq.pair_kind(0, 1), Some(PairKind::GC));
        assert_eq!(seq.pair_kind(1, 2), None);
        assert_eq!(seq.pair_kind(1, 9), None);
    }

    #[test]
    fn rejects_unknown_symbols() {
        let err = Sequence::parse("ACGN").unwrap_err();
        assert_eq!(err.info().code, "invalid-base");
        assert_eq!(err.info().context["position"], "4");
        assert_eq!(Sequence::parse("  ").unwrap_err().info().code, "empty-sequence");
    }
}
