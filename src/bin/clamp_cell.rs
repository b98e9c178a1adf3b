//! Computes the holding current that clamps the pyramidal cell model at a
//! target membrane potential, from the steady state of the adaptive
//! exponential integrate-and-fire equations.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;

use patchsim::neuron::holding_current_for;
use patchsim::params::CellParams;

#[derive(Parser)]
#[command(name = "clamp_cell", about = "Holding current for a target holding potential")]
struct Cli {
    /// Target holding potential (mV)
    #[arg(default_value_t = -70.0, allow_negative_numbers = true)]
    v_hold: f64,

    /// YAML file overriding the built-in cell parameters
    #[arg(long)]
    params: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let cell: CellParams = match &cli.params {
        Some(path) => serde_yaml::from_str(&fs::read_to_string(path)?)?,
        None => CellParams::default(),
    };

    let i_hold_pa = holding_current_for(&cell, cli.v_hold);
    println!("I_hold = {:.3} pA to hold at {:.1} mV", i_hold_pa, cli.v_hold);

    Ok(())
}
