use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{error, info};
use wl_core::WlError;
use wl_mcmc::{Diagnostics, RunConfig, RunSummary, Sampler};

use crate::input::RunInput;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML configuration describing the run.
    #[arg(long)]
    pub config: PathBuf,
    /// Input file: sequence line, optional start structure line.
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Output directory for run artefacts.
    #[arg(long)]
    pub out: PathBuf,
    /// Master seed overriding the configuration.
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    let config = load_config(args)?;
    let input = RunInput::load(&args.input)?;
    let model = input.model()?;
    info!(sequence = %model.sequence(), out = %args.out.display(), "starting run");

    let mut sampler = Sampler::new(&config, &model).map_err(|err| {
        error!(code = %err.info().code, "initialization failed: {err}");
        err
    })?;
    if let Err(err) = sampler.run() {
        abort(&err, &sampler.diagnostics());
        return Err(err.into());
    }
    let diagnostics = sampler.diagnostics();
    let summary = match sampler.finish() {
        Ok(summary) => summary,
        Err(err) => {
            abort(&err, &diagnostics);
            return Err(err.into());
        }
    };

    write_json(&args.out.join("summary.json"), &summary)?;
    fs::copy(&args.config, args.out.join("config.yaml"))?;
    print_summary(&summary);
    Ok(())
}

fn load_config(args: &RunArgs) -> Result<RunConfig, WlError> {
    let mut config = RunConfig::load(&args.config)?;
    config.output.run_directory = Some(args.out.clone());
    if let Some(stem) = args.input.file_stem().and_then(|stem| stem.to_str()) {
        config.output.prefix = stem.to_string();
    }
    if args.seed.is_some() {
        config.seed_policy.seed = args.seed;
    }
    Ok(config)
}

/// Logs the fatal error and dumps the live histograms to stderr.
fn abort(err: &WlError, diagnostics: &Diagnostics) {
    error!(
        code = %err.info().code,
        steps = diagnostics.steps,
        lnf = diagnostics.lnf,
        "run aborted: {err}"
    );
    eprintln!("# bin\tlower\tupper\tH\tG");
    for bin in 0..diagnostics.g.bins() {
        let (lower, upper) = diagnostics.g.get_range(bin).unwrap_or_default();
        eprintln!(
            "{bin}\t{lower:.4}\t{upper:.4}\t{}\t{:.6}",
            diagnostics.h.get(bin).unwrap_or_default(),
            diagnostics.g.get(bin).unwrap_or_default()
        );
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{:?} after {} steps: lnf {:e}, {} halvings, acceptance {:.3}",
        summary.termination,
        summary.steps,
        summary.final_lnf,
        summary.halvings,
        summary.accepted as f64 / summary.proposed.max(1) as f64
    );
    println!("{} {}", summary.final_structure, summary.final_energy);
    for row in summary.dos.populated() {
        println!("{:8.3}\t{:.6}", row.midpoint, row.log_weight);
    }
    println!("partition function {:e}", summary.partition_function);
}
