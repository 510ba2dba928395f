use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use wl_core::{Energy, EnergyModel};

use crate::input::RunInput;

#[derive(Args, Debug)]
pub struct EnumerateArgs {
    /// Input file holding the sequence.
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Energy window above the ground state in kcal/mol.
    #[arg(long, default_value_t = 1.0)]
    pub window: f64,
}

pub fn run(args: &EnumerateArgs) -> Result<(), Box<dyn Error>> {
    let input = RunInput::load(&args.input)?;
    let model = input.model()?;
    let mut structures = model.enumerate_low_energy(Energy::from_kcal(args.window))?;
    structures.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.to_dot_bracket().cmp(&b.0.to_dot_bracket())));
    println!("{}", model.sequence());
    for (structure, energy) in structures {
        println!("{structure} {:6.2}", energy.kcal());
    }
    Ok(())
}
