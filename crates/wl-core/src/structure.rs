//! Pair-table configurations and elementary base-pair moves.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{ErrorInfo, WlError};

/// Minimum number of unpaired positions enclosed by a pair: `(i, j)` needs `j - i > MIN_HAIRPIN`.
pub const MIN_HAIRPIN: usize = 3;

/// Elementary edit connecting two configurations.
///
/// Positions are 0-based and always ordered `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Insert the pair `(i, j)`.
    Insert {
        /// Opening position.
        i: usize,
        /// Closing position.
        j: usize,
    },
    /// Delete the existing pair `(i, j)`.
    Delete {
        /// Opening position.
        i: usize,
        /// Closing position.
        j: usize,
    },
}

impl Move {
    /// Returns the positions touched by the move.
    pub fn pair(&self) -> (usize, usize) {
        match *self {
            Move::Insert { i, j } | Move::Delete { i, j } => (i, j),
        }
    }

    /// Returns `true` for deletions.
    pub fn is_deletion(&self) -> bool {
        matches!(self, Move::Delete { .. })
    }

    /// Returns the complementary move restoring the prior configuration.
    pub fn inverse(&self) -> Move {
        match *self {
            Move::Insert { i, j } => Move::Delete { i, j },
            Move::Delete { i, j } => Move::Insert { i, j },
        }
    }

    /// Signed 1-based encoding: negative positions encode a deletion.
    pub fn to_signed(&self) -> (i64, i64) {
        let (i, j) = self.pair();
        let (left, right) = (i as i64 + 1, j as i64 + 1);
        if self.is_deletion() {
            (-left, -right)
        } else {
            (left, right)
        }
    }

    /// Decodes the signed 1-based encoding produced by [`Move::to_signed`].
    pub fn from_signed(left: i64, right: i64) -> Result<Move, WlError> {
        let invalid = || {
            WlError::MoveSet(
                ErrorInfo::new("invalid-pair", "signed move does not describe an ordered pair")
                    .with_context("left", left)
                    .with_context("right", right),
            )
        };
        if left == 0 || right == 0 || left.signum() != right.signum() {
            return Err(invalid());
        }
        let (i, j) = (left.unsigned_abs() as usize - 1, right.unsigned_abs() as usize - 1);
        if i >= j {
            return Err(invalid());
        }
        Ok(if left < 0 {
            Move::Delete { i, j }
        } else {
            Move::Insert { i, j }
        })
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (left, right) = self.to_signed();
        write!(f, "{left}:{right}")
    }
}

/// Pair table of a secondary structure.
///
/// Each position holds its partner or `None`. Pairing is symmetric; crossing
/// is not checked here, the move model only emits non-crossing insertions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairTable {
    partners: Vec<Option<usize>>,
}

impl PairTable {
    /// Creates the open chain of length `len`.
    pub fn open_chain(len: usize) -> Self {
        Self {
            partners: vec![None; len],
        }
    }

    /// Parses a dot-bracket string.
    pub fn from_dot_bracket(structure: &str) -> Result<Self, WlError> {
        let mut partners = vec![None; structure.chars().count()];
        let mut stack = Vec::new();
        for (pos, symbol) in structure.chars().enumerate() {
            match symbol {
                '.' => {}
                '(' => stack.push(pos),
                ')' => {
                    let open = stack.pop().ok_or_else(|| {
                        WlError::Model(
                            ErrorInfo::new("unbalanced-structure", "unmatched closing bracket")
                                .with_context("position", pos + 1),
                        )
                    })?;
                    partners[open] = Some(pos);
                    partners[pos] = Some(open);
                }
                other => {
                    return Err(WlError::Model(
                        ErrorInfo::new("invalid-symbol", "unexpected dot-bracket symbol")
                            .with_context("symbol", other)
                            .with_context("position", pos + 1),
                    ))
                }
            }
        }
        if let Some(open) = stack.pop() {
            return Err(WlError::Model(
                ErrorInfo::new("unbalanced-structure", "unmatched opening bracket")
                    .with_context("position", open + 1),
            ));
        }
        Ok(Self { partners })
    }

    /// Formats the table as dot-bracket.
    pub fn to_dot_bracket(&self) -> String {
        self.partners
            .iter()
            .enumerate()
            .map(|(pos, partner)| match partner {
                None => '.',
                Some(p) if *p > pos => '(',
                Some(_) => ')',
            })
            .collect()
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    /// Returns `true` for a zero-length table.
    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Partner of `pos`, if paired.
    pub fn partner(&self, pos: usize) -> Option<usize> {
        self.partners.get(pos).copied().flatten()
    }

    /// Returns `true` when `(i, j)` is a pair of the table.
    pub fn is_paired(&self, i: usize, j: usize) -> bool {
        self.partner(i) == Some(j)
    }

    /// Iterates over pairs `(i, j)` with `i < j` in ascending order of `i`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.partners
            .iter()
            .enumerate()
            .filter_map(|(i, partner)| partner.filter(|&j| j > i).map(|j| (i, j)))
    }

    /// Number of base pairs.
    pub fn pair_count(&self) -> usize {
        self.pairs().count()
    }

    /// Applies a move in O(1).
    ///
    /// Insertion requires both positions to be unpaired, deletion requires the
    /// pair to exist; otherwise the table is left untouched.
    pub fn apply(&mut self, mv: Move) -> Result<(), WlError> {
        let (i, j) = mv.pair();
        if i >= j || j >= self.partners.len() {
            return Err(WlError::MoveSet(
                ErrorInfo::new("invalid-pair", "move positions are out of range or unordered")
                    .with_context("move", mv)
                    .with_context("length", self.partners.len()),
            ));
        }
        match mv {
            Move::Insert { .. } => {
                if self.partners[i].is_some() || self.partners[j].is_some() {
                    return Err(WlError::MoveSet(
                        ErrorInfo::new("pair-occupied", "cannot insert onto paired positions")
                            .with_context("move", mv),
                    ));
                }
                self.partners[i] = Some(j);
                self.partners[j] = Some(i);
            }
            Move::Delete { .. } => {
                if !self.is_paired(i, j) {
                    return Err(WlError::MoveSet(
                        ErrorInfo::new("pair-missing", "cannot delete a pair that is not present")
                            .with_context("move", mv),
                    ));
                }
                self.partners[i] = None;
                self.partners[j] = None;
            }
        }
        Ok(())
    }

    /// SHA-256 of the dot-bracket representation.
    pub fn canonical_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_dot_bracket().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl Display for PairTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dot_bracket())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_bracket_roundtrip() {
        let pt = PairTable::from_dot_bracket("((..((...))..))").unwrap();
        assert_eq!(pt.pair_count(), 4);
        assert_eq!(pt.partner(0), Some(14));
        assert_eq!(pt.partner(10), Some(5));
        assert_eq!(pt.to_dot_bracket(), "((..((...))..))");
    }

    #[test]
    fn unbalanced_structures_are_rejected() {
        let err = PairTable::from_dot_bracket("(()").unwrap_err();
        assert_eq!(err.info().code, "unbalanced-structure");
        let err = PairTable::from_dot_bracket("())").unwrap_err();
        assert_eq!(err.info().code, "unbalanced-structure");
        let err = PairTable::from_dot_bracket("(x)").unwrap_err();
        assert_eq!(err.info().code, "invalid-symbol");
    }

    #[test]
    fn apply_rejects_inconsistent_moves() {
        let mut pt = PairTable::from_dot_bracket("(....)..").unwrap();
        let before = pt.clone();
        let err = pt.apply(Move::Insert { i: 0, j: 7 }).unwrap_err();
        assert_eq!(err.info().code, "pair-occupied");
        let err = pt.apply(Move::Delete { i: 1, j: 6 }).unwrap_err();
        assert_eq!(err.info().code, "pair-missing");
        let err = pt.apply(Move::Insert { i: 3, j: 9 }).unwrap_err();
        assert_eq!(err.info().code, "invalid-pair");
        assert_eq!(pt, before);
    }

    #[test]
    fn signed_encoding_marks_deletions() {
        let mv = Move::Delete { i: 2, j: 9 };
        assert_eq!(mv.to_signed(), (-3, -10));
        assert_eq!(Move::from_signed(-3, -10).unwrap(), mv);
        assert_eq!(
            Move::from_signed(1, 5).unwrap(),
            Move::Insert { i: 0, j: 4 }
        );
        assert!(Move::from_signed(-1, 5).is_err());
        assert!(Move::from_signed(5, 1).is_err());
    }
}
