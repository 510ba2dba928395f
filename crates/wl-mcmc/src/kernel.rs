use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wl_core::errors::ErrorInfo;
use wl_core::{Energy, EnergyModel, Move, PairTable, RngHandle, WlError};
use wl_hist::Histogram;

use crate::checkpoint::{self, ReportKind, ReportStep};
use crate::config::{BinningPolicy, RunConfig};
use crate::determinism;
use crate::manifest::RunManifest;
use crate::metrics::{self, FlatnessCheck};
use crate::moves;
use crate::normalize::{self, AnchorPolicy, ScaledDos};
use crate::schedule::{CheckpointSchedule, ModificationSchedule};

/// How a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Termination {
    /// `lnf` dropped to `ffinal`.
    Converged,
    /// The step ceiling was reached first.
    StepLimit,
}

/// Lifecycle of a [`Sampler`] after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplerState {
    /// Steps may be performed.
    Sampling,
    /// Stopped; further steps are refused.
    Finished(Termination),
}

/// Outcome of a single proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Move that was proposed.
    pub proposed: Move,
    /// Whether it was accepted.
    pub accepted: bool,
    /// Acceptance probability `min(exp(G[cur] - G[new]), 1)`.
    pub acceptance_prob: f64,
    /// Energy after the step.
    pub energy: Energy,
    /// Bin of the energy after the step.
    pub bin: usize,
}

/// Snapshot of the live histograms, used for diagnostics after a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Steps performed so far.
    pub steps: u64,
    /// Current modification factor.
    pub lnf: f64,
    /// Visit histogram.
    pub h: Histogram,
    /// Accumulated log-DOS.
    pub g: Histogram,
}

/// Summary returned to callers after a run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Master seed of the run.
    pub seed: u64,
    /// Steps performed.
    pub steps: u64,
    /// How the run stopped.
    pub termination: Termination,
    /// Final modification factor.
    pub final_lnf: f64,
    /// Number of flatness events.
    pub halvings: u32,
    /// Accepted proposals.
    pub accepted: u64,
    /// Proposals evaluated.
    pub proposed: u64,
    /// Energy of the final configuration.
    pub final_energy: Energy,
    /// Final configuration in dot-bracket notation.
    pub final_structure: String,
    /// SHA-256 of the final configuration.
    pub structure_hash: String,
    /// Normalized density of states.
    pub dos: ScaledDos,
    /// Partition function at the configured temperature.
    pub partition_function: f64,
    /// Every flatness check performed.
    pub checks: Vec<FlatnessCheck>,
    /// Reports written, in order.
    pub reports: Vec<PathBuf>,
    /// Flatness log, if written.
    pub flatness_path: Option<PathBuf>,
    /// Manifest path, if written.
    pub manifest_path: Option<PathBuf>,
}

/// Wang-Landau random walk over the configurations of an [`EnergyModel`].
///
/// The sampler owns the three histograms (visits H, log-DOS G, exact
/// low-energy counts S), the live configuration and both RNG substreams.
/// Construction performs the whole initialization; [`Sampler::step`] performs
/// one proposal and [`Sampler::run`] loops until convergence or the step
/// ceiling.
pub struct Sampler<'m, M: EnergyModel + ?Sized> {
    config: RunConfig,
    model: &'m M,
    seed: u64,
    move_rng: RngHandle,
    accept_rng: RngHandle,
    h: Histogram,
    g: Histogram,
    s: Histogram,
    config_state: PairTable,
    energy: Energy,
    bin: usize,
    lnf: ModificationSchedule,
    reports_due: CheckpointSchedule,
    steps: u64,
    accepted: u64,
    proposed: u64,
    checks: Vec<FlatnessCheck>,
    reports: Vec<PathBuf>,
    state: SamplerState,
}

impl<'m, M: EnergyModel + ?Sized> Sampler<'m, M> {
    /// Validates `config`, builds the histograms, anchors S and locates the start state.
    pub fn new(config: &RunConfig, model: &'m M) -> Result<Self, WlError> {
        config.validate()?;
        let (energy, start) = model.initial_energy()?;
        let mfe = model.ground_energy()?;
        let g = window_histogram(config, mfe)?;
        info!(
            mfe = %mfe,
            start = %energy,
            min = g.min(),
            max = g.max(),
            bins = g.bins(),
            "histogram window"
        );

        let h = empty_like(&g);
        let s = anchor_counts(config, model, mfe, &g)?;
        let mut g = g;
        if config.freeze_anchor_bins {
            for bin in 0..config.anchor_bins {
                let count = s.values()[bin];
                if count > 0.0 {
                    g.set(bin, count.ln())?;
                }
            }
        }

        let seed = determinism::resolve_seed(&config.seed_policy);
        let bin = g.find(energy.kcal())?;
        info!(seed, structure = %start, bin, "initialized");

        Ok(Self {
            config: config.clone(),
            model,
            seed,
            move_rng: determinism::move_rng(seed),
            accept_rng: determinism::accept_rng(seed),
            h,
            g,
            s,
            config_state: start,
            energy,
            bin,
            lnf: ModificationSchedule::new(config.ffinal),
            reports_due: CheckpointSchedule::new(&config.checkpoint),
            steps: 0,
            accepted: 0,
            proposed: 0,
            checks: Vec::new(),
            reports: Vec::new(),
            state: SamplerState::Sampling,
        })
    }

    /// Master seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Steps performed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Current modification factor.
    pub fn lnf(&self) -> f64 {
        self.lnf.lnf()
    }

    /// Energy of the live configuration.
    pub fn energy(&self) -> Energy {
        self.energy
    }

    /// Live configuration.
    pub fn structure(&self) -> &PairTable {
        &self.config_state
    }

    /// Visit histogram H.
    pub fn visits(&self) -> &Histogram {
        &self.h
    }

    /// Log-DOS estimate G.
    pub fn log_dos(&self) -> &Histogram {
        &self.g
    }

    /// Exact low-energy counts S.
    pub fn reference(&self) -> &Histogram {
        &self.s
    }

    /// Flatness checks recorded so far.
    pub fn checks(&self) -> &[FlatnessCheck] {
        &self.checks
    }

    /// Copies of H and G for post-mortem output.
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            steps: self.steps,
            lnf: self.lnf.lnf(),
            h: self.h.clone(),
            g: self.g.clone(),
        }
    }

    /// Performs one proposal, the histogram update and any due check or report.
    pub fn step(&mut self) -> Result<StepOutcome, WlError> {
        if let SamplerState::Finished(termination) = self.state {
            return Err(WlError::Config(
                ErrorInfo::new("sampler-finished", "the walk has already stopped")
                    .with_context("termination", format!("{termination:?}")),
            ));
        }

        let mv = moves::random_move(&self.config_state, self.model, &mut self.move_rng)?;
        let delta = self.model.move_delta(&self.config_state, mv)?;
        let energy = self.energy + delta;
        let step = self.steps + 1;
        let bin = self.g.find(energy.kcal()).map_err(|err| match err {
            WlError::Domain(info) => WlError::Domain(
                info.with_context("move", mv)
                    .with_context("step", step)
                    .with_context("structure", &self.config_state),
            ),
            other => other,
        })?;
        self.proposed += 1;

        let current = self.g.values()[self.bin];
        let candidate = self.g.values()[bin];
        let acceptance_prob = (current - candidate).exp().min(1.0);
        let accepted = acceptance_prob >= 1.0 || self.accept_rng.uniform() <= acceptance_prob;
        if accepted {
            self.config_state.apply(mv)?;
            self.energy = energy;
            self.bin = bin;
            self.accepted += 1;
        }

        if !self.is_frozen(self.bin) {
            self.h.increment_bin(self.bin);
            self.g.accumulate_bin(self.bin, self.lnf.lnf());
        }
        self.steps = step;

        if self.steps % self.config.check_steps == 0 {
            self.check_flatness();
        }
        if self.reports_due.is_due(self.steps) {
            self.write_checkpoint_reports()?;
        }

        if self.lnf.is_converged() {
            info!(
                steps = self.steps,
                lnf = self.lnf.lnf(),
                halvings = self.lnf.halvings(),
                "converged"
            );
            self.state = SamplerState::Finished(Termination::Converged);
        } else if self.steps >= self.config.max_steps {
            warn!(
                steps = self.steps,
                lnf = self.lnf.lnf(),
                ffinal = self.config.ffinal,
                "step limit reached before convergence"
            );
            self.state = SamplerState::Finished(Termination::StepLimit);
        }

        Ok(StepOutcome {
            proposed: mv,
            accepted,
            acceptance_prob,
            energy: self.energy,
            bin: self.bin,
        })
    }

    /// Steps until the walk stops.
    pub fn run(&mut self) -> Result<Termination, WlError> {
        loop {
            if let SamplerState::Finished(termination) = self.state {
                return Ok(termination);
            }
            self.step()?;
        }
    }

    /// Normalizes the current G against S.
    pub fn scaled_dos(&self) -> Result<ScaledDos, WlError> {
        normalize::anchor_and_scale(
            &self.g,
            &self.s,
            self.config.anchor_bins,
            AnchorPolicy::from_freeze(self.config.freeze_anchor_bins),
        )
    }

    /// Normalizes the final estimate, writes the artefacts and summarizes the run.
    pub fn finish(self) -> Result<RunSummary, WlError> {
        let termination = match self.state {
            SamplerState::Finished(termination) => termination,
            SamplerState::Sampling => {
                return Err(WlError::Config(ErrorInfo::new(
                    "sampler-running",
                    "finish called before the walk stopped",
                )))
            }
        };
        let dos = self.scaled_dos()?;
        let partition_function = normalize::partition_function(&dos, self.config.temperature);
        let mut reports = self.reports.clone();
        let mut flatness_path = None;
        let mut manifest_path = None;

        if let Some(dir) = self.config.output.run_directory.clone() {
            let path = checkpoint::report_path(
                &dir,
                &self.config.output.prefix,
                ReportStep::Final,
                ReportKind::Scaled,
            );
            checkpoint::write_scaled(&path, ReportStep::Final, self.lnf.lnf(), &dos)?;
            reports.push(path);

            let path = dir.join(&self.config.output.flatness_file);
            metrics::write_flatness_csv(&path, &self.checks)
                .map_err(|err| WlError::io("flatness-write", err, &path))?;
            flatness_path = Some(path);

            let path = dir.join(&self.config.output.manifest_file);
            let manifest = RunManifest {
                config: self.config.clone(),
                master_seed: self.seed,
                termination,
                steps: self.steps,
                final_structure: self.config_state.to_dot_bracket(),
                structure_hash: self.config_state.canonical_hash(),
                flatness_file: flatness_path
                    .as_ref()
                    .and_then(|path| path.strip_prefix(&dir).ok())
                    .map(|rel| rel.to_path_buf()),
                reports: reports
                    .iter()
                    .filter_map(|path| path.strip_prefix(&dir).ok().map(|rel| rel.to_path_buf()))
                    .collect(),
            };
            manifest.write(&path)?;
            manifest_path = Some(path);
        }

        info!(
            ?termination,
            steps = self.steps,
            accepted = self.accepted,
            proposed = self.proposed,
            z = partition_function,
            "run finished"
        );

        Ok(RunSummary {
            seed: self.seed,
            steps: self.steps,
            termination,
            final_lnf: self.lnf.lnf(),
            halvings: self.lnf.halvings(),
            accepted: self.accepted,
            proposed: self.proposed,
            final_energy: self.energy,
            final_structure: self.config_state.to_dot_bracket(),
            structure_hash: self.config_state.canonical_hash(),
            dos,
            partition_function,
            checks: self.checks,
            reports,
            flatness_path,
            manifest_path,
        })
    }

    fn is_frozen(&self, bin: usize) -> bool {
        bin < self.frozen_bins()
    }

    fn frozen_bins(&self) -> usize {
        if self.config.freeze_anchor_bins {
            self.config.anchor_bins
        } else {
            0
        }
    }

    fn check_flatness(&mut self) {
        let flatness = self.h.flatness(self.config.flat_fraction);
        if self.lnf.on_check(flatness.flat) {
            self.h.reset();
            info!(
                step = self.steps,
                lnf = self.lnf.lnf(),
                halvings = self.lnf.halvings(),
                lbin = ?flatness.lbin,
                gbin = ?flatness.gbin,
                "histogram flat, lnf halved"
            );
        } else {
            debug!(
                step = self.steps,
                lnf = self.lnf.lnf(),
                average = flatness.average,
                minimum = flatness.minimum,
                "histogram not flat"
            );
        }
        self.checks
            .push(FlatnessCheck::new(self.steps, self.lnf.lnf(), &flatness));
    }

    fn write_checkpoint_reports(&mut self) -> Result<(), WlError> {
        let Some(dir) = self.config.output.run_directory.clone() else {
            return Ok(());
        };
        let step = ReportStep::Step(self.steps);
        let prefix = &self.config.output.prefix;
        let snapshot = self.g.clone();

        let path = checkpoint::report_path(&dir, prefix, step, ReportKind::LogScale);
        let visited = normalize::visited_bins(&snapshot, &self.s, self.frozen_bins());
        checkpoint::write_log_scale(&path, step, self.lnf.lnf(), &snapshot, &visited)?;
        self.reports.push(path);

        let scaled = normalize::anchor_and_scale(
            &snapshot,
            &self.s,
            self.config.anchor_bins,
            AnchorPolicy::from_freeze(self.config.freeze_anchor_bins),
        )?;
        let path = checkpoint::report_path(&dir, prefix, step, ReportKind::Scaled);
        checkpoint::write_scaled(&path, step, self.lnf.lnf(), &scaled)?;
        self.reports.push(path);
        info!(step = self.steps, lnf = self.lnf.lnf(), "checkpoint reports written");
        Ok(())
    }
}

/// Runs a sampler from scratch and summarizes it.
pub fn run<M>(config: &RunConfig, model: &M) -> Result<RunSummary, WlError>
where
    M: EnergyModel + ?Sized,
{
    let mut sampler = Sampler::new(config, model)?;
    sampler.run()?;
    sampler.finish()
}

fn window_histogram(config: &RunConfig, mfe: Energy) -> Result<Histogram, WlError> {
    let min = config.energy_min.unwrap_or_else(|| mfe.kcal().floor());
    match config.binning {
        BinningPolicy::Uniform { bins } => {
            let max = config.energy_max.unwrap_or_else(|| 5.0 * mfe.kcal().abs());
            Histogram::uniform(bins, min, max).map_err(|err| window_hint(err, mfe))
        }
        BinningPolicy::Resolution { resolution, bins } => {
            Histogram::with_resolution(min, resolution, bins, config.energy_max)
                .map_err(|err| window_hint(err, mfe))
        }
    }
}

fn window_hint(err: WlError, mfe: Energy) -> WlError {
    match err {
        WlError::Config(info) if info.code == "invalid-window" => WlError::Config(
            info.with_context("mfe", mfe)
                .with_hint("set energy_min and energy_max explicitly"),
        ),
        other => other,
    }
}

fn empty_like(template: &Histogram) -> Histogram {
    let mut empty = template.clone();
    empty.reset();
    empty
}

/// Counts the exact low-energy structures falling into the anchored bins.
fn anchor_counts<M>(
    config: &RunConfig,
    model: &M,
    mfe: Energy,
    g: &Histogram,
) -> Result<Histogram, WlError>
where
    M: EnergyModel + ?Sized,
{
    let mut s = empty_like(g);
    let last_anchor = config.anchor_bins - 1;
    let (_, upper) = g.get_range(last_anchor).ok_or_else(|| {
        WlError::Config(
            ErrorInfo::new("invalid-anchor-bins", "anchor_bins exceeds the bin count")
                .with_context("anchor_bins", config.anchor_bins)
                .with_context("bins", g.bins()),
        )
    })?;
    let ceiling = Energy::below_kcal(upper);
    if ceiling >= mfe {
        let structures = model.enumerate_low_energy(ceiling - mfe)?;
        debug!(count = structures.len(), ceiling = %ceiling, "enumerated anchor structures");
        for (_, energy) in structures {
            if let Ok(bin) = s.find(energy.kcal()) {
                if bin <= last_anchor {
                    s.increment_bin(bin);
                }
            }
        }
    }
    if s.values()[0] == 0.0 {
        let (lo, hi) = g.get_range(0).unwrap_or((g.min(), g.max()));
        return Err(WlError::Config(
            ErrorInfo::new("lowest-bin-empty", "no enumerated structure falls into the lowest bin")
                .with_context("lower", lo)
                .with_context("upper", hi)
                .with_context("mfe", mfe)
                .with_hint("use fewer bins so the lowest bin reaches the ground state"),
        ));
    }
    Ok(s)
}
