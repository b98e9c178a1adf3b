use log::{debug, info};
use serde::Serialize;
use simple_error::SimpleError;
use statrs::statistics::Statistics;

use crate::params::AnalysisParams;
use crate::recording::{self, PairedRecording, Trace};

/// Per-trial traces and peak values for a batch of sampled weights, plus a
/// reference trial at the mean nonzero weight.
pub struct SweepResult {
    pub t_ms: Vec<f64>,
    pub epsps_mv: Vec<Vec<f64>>,
    pub epscs_pa: Vec<Vec<f64>>,
    pub peak_epsps_mv: Vec<f64>,
    pub peak_epscs_pa: Vec<f64>,
    pub weights_ns: Vec<f64>,
    pub reference: Trace,
    pub mean_weight_ns: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub num_samples: usize,
    pub mean_weight_ns: f64,
    pub mean_peak_epsp_mv: f64,
    pub std_peak_epsp_mv: f64,
    pub mean_peak_epsc_pa: f64,
    pub std_peak_epsc_pa: f64,
}

impl SweepResult {
    pub fn summary(&self) -> SweepSummary {
        SweepSummary {
            num_samples: self.weights_ns.len(),
            mean_weight_ns: self.mean_weight_ns,
            mean_peak_epsp_mv: self.peak_epsps_mv.iter().mean(),
            std_peak_epsp_mv: self.peak_epsps_mv.iter().std_dev(),
            mean_peak_epsc_pa: self.peak_epscs_pa.iter().mean(),
            std_peak_epsc_pa: self.peak_epscs_pa.iter().std_dev(),
        }
    }
}

/// Runs one paired-recording trial per sampled weight, then the reference
/// trial at the mean weight. Trials run to completion in order; there is no
/// shared state between them.
pub fn run_sweep(
    params: &AnalysisParams,
    sampled_weights: &[f64],
    mean_weight_ns: f64,
) -> Result<SweepResult, SimpleError> {
    let paired_recording = PairedRecording::new(params)?;
    let num_trials = sampled_weights.len();

    let mut result = SweepResult {
        t_ms: Vec::new(),
        epsps_mv: Vec::with_capacity(num_trials),
        epscs_pa: Vec::with_capacity(num_trials),
        peak_epsps_mv: Vec::with_capacity(num_trials),
        peak_epscs_pa: Vec::with_capacity(num_trials),
        weights_ns: sampled_weights.to_vec(),
        reference: Trace {
            t_ms: Vec::new(),
            vm_mv: Vec::new(),
            epsc_pa: Vec::new(),
        },
        mean_weight_ns,
    };

    for (trial, weight) in sampled_weights.iter().enumerate() {
        let trace = paired_recording.run(*weight);

        result
            .peak_epsps_mv
            .push(recording::peak_epsp(&trace, &params.protocol, &params.cell));
        result.peak_epscs_pa.push(recording::peak_epsc(&trace));

        if result.t_ms.is_empty() {
            result.t_ms = trace.t_ms.clone();
        }
        result.epsps_mv.push(trace.vm_mv);
        result.epscs_pa.push(trace.epsc_pa);

        debug!("trial {}/{}: weight {} nS", trial + 1, num_trials, weight);
        if (trial + 1) % 100 == 0 || trial + 1 == num_trials {
            info!("completed {}/{} trials", trial + 1, num_trials);
        }
    }

    result.reference = paired_recording.run(mean_weight_ns);

    Ok(result)
}
