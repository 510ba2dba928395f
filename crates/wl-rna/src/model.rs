use std::cell::OnceCell;

use tracing::debug;
use wl_core::errors::ErrorInfo;
use wl_core::{Energy, EnergyModel, Move, PairTable, PairingRule, WlError, MIN_HAIRPIN};

use crate::params::PairEnergies;
use crate::sequence::Sequence;

/// Longest sequence accepted by the exhaustive scans.
pub const MAX_ENUMERATION_LENGTH: usize = 64;

/// Base-pair stacking energy model.
///
/// Every pair contributes its pair energy; a pair `(i, j)` whose inner
/// neighbour `(i + 1, j - 1)` is also paired contributes the stacking bonus
/// once more. Ground state and low-energy structures are found by exhaustive
/// branch-and-bound scans, so the model is meant for short sequences.
#[derive(Debug, Clone)]
pub struct BasePairModel {
    sequence: Sequence,
    start: PairTable,
    params: PairEnergies,
    ground: OnceCell<Energy>,
}

impl BasePairModel {
    /// Builds a model starting the walk from `start`.
    pub fn new(sequence: Sequence, start: PairTable) -> Result<Self, WlError> {
        Self::with_params(sequence, start, PairEnergies::default())
    }

    /// Builds a model starting from the open chain.
    pub fn open_chain(sequence: Sequence) -> Result<Self, WlError> {
        let start = PairTable::open_chain(sequence.len());
        Self::new(sequence, start)
    }

    /// Builds a model with custom pair energies.
    ///
    /// Every pair of `start` must be compatible with the sequence.
    pub fn with_params(
        sequence: Sequence,
        start: PairTable,
        params: PairEnergies,
    ) -> Result<Self, WlError> {
        if start.len() != sequence.len() {
            return Err(WlError::Model(
                ErrorInfo::new("length-mismatch", "structure and sequence lengths differ")
                    .with_context("sequence", sequence.len())
                    .with_context("structure", start.len()),
            ));
        }
        let model = Self {
            sequence,
            start,
            params,
            ground: OnceCell::new(),
        };
        for (i, j) in model.start.pairs() {
            model.check_pair(i, j)?;
        }
        Ok(model)
    }

    /// Sequence being folded.
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Energy parameters.
    pub fn params(&self) -> &PairEnergies {
        &self.params
    }

    /// Exact energy of `config`.
    pub fn evaluate(&self, config: &PairTable) -> Result<Energy, WlError> {
        self.check_length(config)?;
        let mut total = 0;
        for (i, j) in config.pairs() {
            total += self.check_pair(i, j)?;
            if i + 1 < j - 1 && config.is_paired(i + 1, j - 1) {
                total += self.params.stack;
            }
        }
        Ok(Energy::from_hundredths(total))
    }

    /// Energy of the pair `(i, j)` together with the stacks it takes part in.
    fn contribution(&self, config: &PairTable, i: usize, j: usize) -> Result<i64, WlError> {
        let mut energy = self.check_pair(i, j)?;
        if i + 1 < j - 1 && config.is_paired(i + 1, j - 1) {
            energy += self.params.stack;
        }
        if i > 0 && config.is_paired(i - 1, j + 1) {
            energy += self.params.stack;
        }
        Ok(energy)
    }

    fn check_pair(&self, i: usize, j: usize) -> Result<i64, WlError> {
        match self.sequence.pair_kind(i, j) {
            Some(kind) if i < j => Ok(self.params.pair(kind)),
            _ => Err(WlError::Model(
                ErrorInfo::new("incompatible-pair", "positions cannot form a base pair")
                    .with_context("i", i + 1)
                    .with_context("j", j + 1),
            )),
        }
    }

    fn check_length(&self, config: &PairTable) -> Result<(), WlError> {
        if config.len() == self.sequence.len() {
            Ok(())
        } else {
            Err(WlError::Model(
                ErrorInfo::new("length-mismatch", "structure and sequence lengths differ")
                    .with_context("sequence", self.sequence.len())
                    .with_context("structure", config.len()),
            ))
        }
    }

    fn check_scan_length(&self) -> Result<(), WlError> {
        if self.sequence.len() > MAX_ENUMERATION_LENGTH {
            return Err(WlError::Resource(
                ErrorInfo::new("enumeration-too-long", "sequence is too long for exhaustive enumeration")
                    .with_context("length", self.sequence.len())
                    .with_context("limit", MAX_ENUMERATION_LENGTH)
                    .with_hint("supply a shorter sequence or an external energy model"),
            ));
        }
        Ok(())
    }
}

impl PairingRule for BasePairModel {
    fn can_pair(&self, i: usize, j: usize) -> bool {
        self.sequence.pair_kind(i, j).is_some()
    }
}

impl EnergyModel for BasePairModel {
    fn initial_energy(&self) -> Result<(Energy, PairTable), WlError> {
        Ok((self.evaluate(&self.start)?, self.start.clone()))
    }

    /// Runs the branch-and-bound scan once and caches the result.
    fn ground_energy(&self) -> Result<Energy, WlError> {
        if let Some(&mfe) = self.ground.get() {
            return Ok(mfe);
        }
        self.check_scan_length()?;
        let mut scan = Scan::new(self, 0, false);
        scan.visit(0, 0)?;
        debug!(mfe = scan.ceiling, leaves = scan.leaves, "ground-state scan finished");
        let mfe = Energy::from_hundredths(scan.ceiling);
        Ok(*self.ground.get_or_init(|| mfe))
    }

    fn move_delta(&self, config: &PairTable, mv: Move) -> Result<Energy, WlError> {
        self.check_length(config)?;
        let (i, j) = mv.pair();
        let applicable = match mv {
            Move::Insert { .. } => {
                j < config.len() && config.partner(i).is_none() && config.partner(j).is_none()
            }
            Move::Delete { .. } => config.is_paired(i, j),
        };
        if !applicable {
            return Err(WlError::MoveSet(
                ErrorInfo::new("move-not-applicable", "move does not fit the configuration")
                    .with_context("move", mv)
                    .with_context("structure", config),
            ));
        }
        let contribution = self.contribution(config, i, j)?;
        Ok(Energy::from_hundredths(if mv.is_deletion() {
            -contribution
        } else {
            contribution
        }))
    }

    fn enumerate_low_energy(&self, window: Energy) -> Result<Vec<(PairTable, Energy)>, WlError> {
        let ceiling = self.ground_energy()? + window;
        let mut scan = Scan::new(self, ceiling.hundredths(), true);
        scan.visit(0, 0)?;
        debug!(
            ceiling = %ceiling,
            structures = scan.found.len(),
            "low-energy enumeration finished"
        );
        Ok(scan.found)
    }
}

/// Left-to-right structure scan with an energy lower bound.
///
/// Position `k` is either left unpaired or opened against some `l` inside the
/// innermost open pair. The stacking bonus of a pair is booked when its inner
/// neighbour is opened, so `energy` is always exact for the decided prefix.
struct Scan<'a> {
    model: &'a BasePairModel,
    table: PairTable,
    closing: Vec<usize>,
    ceiling: i64,
    collect: bool,
    best_pair: i64,
    found: Vec<(PairTable, Energy)>,
    leaves: usize,
}

impl<'a> Scan<'a> {
    fn new(model: &'a BasePairModel, ceiling: i64, collect: bool) -> Self {
        Self {
            model,
            table: PairTable::open_chain(model.sequence.len()),
            closing: Vec::new(),
            ceiling,
            collect,
            best_pair: model.params.best_pair_contribution(),
            found: Vec::new(),
            leaves: 0,
        }
    }

    fn lower_bound(&self, k: usize, energy: i64) -> i64 {
        let n = self.table.len();
        let free = (n - k).saturating_sub(self.closing.len());
        energy + (free / 2) as i64 * self.best_pair
    }

    fn visit(&mut self, k: usize, energy: i64) -> Result<(), WlError> {
        if self.lower_bound(k, energy) > self.ceiling {
            return Ok(());
        }
        let n = self.table.len();
        if k == n {
            self.leaves += 1;
            if self.collect {
                self.found
                    .push((self.table.clone(), Energy::from_hundredths(energy)));
            } else {
                self.ceiling = self.ceiling.min(energy);
            }
            return Ok(());
        }
        if self.closing.last() == Some(&k) {
            self.closing.pop();
            self.visit(k + 1, energy)?;
            self.closing.push(k);
            return Ok(());
        }

        self.visit(k + 1, energy)?;

        let end = self.closing.last().copied().unwrap_or(n);
        for l in (k + MIN_HAIRPIN + 1)..end {
            let Some(kind) = self.model.sequence.pair_kind(k, l) else {
                continue;
            };
            let mut delta = self.model.params.pair(kind);
            if k > 0 && self.table.is_paired(k - 1, l + 1) {
                delta += self.model.params.stack;
            }
            let mv = Move::Insert { i: k, j: l };
            self.table.apply(mv)?;
            self.closing.push(l);
            self.visit(k + 1, energy + delta)?;
            self.closing.pop();
            self.table.apply(mv.inverse())?;
        }
        Ok(())
    }
}
