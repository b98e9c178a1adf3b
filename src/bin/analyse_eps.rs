//! Analyses EPSC & EPSP responses of the pyramidal cell model for synaptic
//! weights sampled from a learned connectivity matrix: one paired-recording
//! trial per sampled weight, peak statistics across trials, and distribution
//! figures as PNG images.

use std::error::Error;
use std::fs;
use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use simple_error::SimpleError;

use patchsim::params::{validate_analysis_params, AnalysisParams, HoldingParams};
use patchsim::plot::{plot_avg_eps, plot_eps_dist};
use patchsim::sweep::run_sweep;
use patchsim::wmx::{mean_weight, sample_weights, WeightMatrix};

#[derive(Parser)]
#[command(name = "analyse_eps", about = "Analyse EPSC & EPSP responses for sampled synaptic weights")]
struct Cli {
    /// Number of weights to sample; malformed values fall back to the default
    samples: Option<String>,

    /// Learned weight matrix (JSON, row-major)
    #[arg(short, long, default_value = "files/wmx_sym_0.5_linear.json")]
    wmx: PathBuf,

    /// Output directory for generated figures
    #[arg(short, long, default_value = "figures")]
    output_dir: PathBuf,

    /// YAML file overriding the built-in analysis parameters
    #[arg(long)]
    params: Option<PathBuf>,

    /// Scale applied to matrix entries on load (Siemens to nS)
    #[arg(long, default_value_t = 1e9)]
    weight_scale: f64,

    /// Seed for weight sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Holding voltage (mV); requires --i-hold
    #[arg(long, allow_negative_numbers = true)]
    v_hold: Option<f64>,

    /// Holding current (pA); requires --v-hold
    #[arg(long, allow_negative_numbers = true)]
    i_hold: Option<f64>,

    /// Disable the voltage clamp entirely
    #[arg(long)]
    no_hold: bool,

    /// Write summary statistics to this JSON file
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn resolve_params(cli: &Cli) -> Result<AnalysisParams, Box<dyn Error>> {
    let mut params = match &cli.params {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            serde_yaml::from_str(&contents)?
        }
        None => AnalysisParams::default(),
    };

    if let Some(raw) = &cli.samples {
        match raw.parse::<usize>() {
            Ok(n) => params.num_samples = n,
            Err(_) => log::warn!(
                "invalid sample count '{}', falling back to {}",
                raw,
                params.num_samples
            ),
        }
    }

    if let Some(seed) = cli.seed {
        params.seed = seed;
    }

    match (cli.v_hold, cli.i_hold) {
        (Some(v_hold_mv), Some(i_hold_pa)) => {
            params.protocol.holding = Some(HoldingParams {
                v_hold_mv,
                i_hold_pa,
            });
        }
        (None, None) => {}
        _ => {
            return Err(
                SimpleError::new("i_hold and v_hold must be supplied together").into(),
            );
        }
    }

    if cli.no_hold {
        params.protocol.holding = None;
    }

    validate_analysis_params(&params)?;

    Ok(params)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let params = resolve_params(&cli)?;

    let wmx = WeightMatrix::from_file(&cli.wmx, cli.weight_scale)?;
    let nonzero = wmx.nonzero_weights();
    if nonzero.is_empty() {
        return Err(SimpleError::new("weight matrix has no nonzero entries").into());
    }

    let mean_weight_ns = mean_weight(&nonzero);
    println!("mean(nonzero weights): {} (nS)", mean_weight_ns);

    let sampled = sample_weights(&nonzero, params.num_samples, params.seed)?;
    let result = run_sweep(&params, &sampled, mean_weight_ns)?;

    fs::create_dir_all(&cli.output_dir)?;

    let avg_path = cli.output_dir.join("EPS_sym.png");
    plot_avg_eps(&avg_path, &result)?;
    println!("Average traces → {}", avg_path.display());

    let dist_path = cli.output_dir.join("distEPS_sym.png");
    plot_eps_dist(&dist_path, &result.peak_epsps_mv, &result.peak_epscs_pa)?;
    println!("Distributions  → {}", dist_path.display());

    let summary = result.summary();
    println!(
        "peak EPSP: {:.4} ± {:.4} mV (n = {})",
        summary.mean_peak_epsp_mv, summary.std_peak_epsp_mv, summary.num_samples
    );
    println!(
        "peak EPSC: {:.4} ± {:.4} pA (n = {})",
        summary.mean_peak_epsc_pa, summary.std_peak_epsc_pa, summary.num_samples
    );

    if let Some(path) = &cli.summary {
        serde_json::to_writer_pretty(File::create(path)?, &summary)?;
        println!("Summary        → {}", path.display());
    }

    Ok(())
}
