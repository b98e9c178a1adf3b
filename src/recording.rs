use simple_error::{try_with, SimpleError};

use crate::neuron::PyramidalCell;
use crate::params::{self, AnalysisParams, CellParams, ProtocolParams};
use crate::synapse::AmpaSynapse;

/// Fixed-dt time series of one paired-recording trial. Samples are taken at
/// the start of every step, so a trial of `duration / dt` steps yields
/// exactly that many samples.
#[derive(Debug, Clone)]
pub struct Trace {
    pub t_ms: Vec<f64>,
    pub vm_mv: Vec<f64>,
    pub epsc_pa: Vec<f64>,
}

impl Trace {
    pub fn len(&self) -> usize {
        self.t_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t_ms.is_empty()
    }
}

/// Mimics a paired recording of two connected pyramidal cells: the
/// postsynaptic cell is held at rest (optionally current-clamped after a
/// settle period), a single presynaptic spike is delivered through the AMPA
/// synapse, and the membrane potential and EPSC are recorded.
pub struct PairedRecording {
    params: AnalysisParams,
    num_steps: usize,
    settle_step: usize,
    delivery_step: usize,
}

impl PairedRecording {
    pub fn new(params: &AnalysisParams) -> Result<Self, SimpleError> {
        try_with!(
            params::validate_analysis_params(params),
            "invalid analysis parameters"
        );

        let dt = params.protocol.dt_ms;
        let num_steps = (params.protocol.duration_ms / dt).round() as usize;
        let settle_step = (params.protocol.settle_ms / dt).round() as usize;
        let delivery_step =
            ((params.protocol.pre_spike_ms + params.synapse.delay_ms) / dt).round() as usize;

        Ok(Self {
            params: params.clone(),
            num_steps,
            settle_step,
            delivery_step,
        })
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Runs one trial with the given synaptic weight. Deterministic: a trial
    /// contains no randomness.
    pub fn run(&self, weight_ns: f64) -> Trace {
        let protocol = &self.params.protocol;
        let dt = protocol.dt_ms;

        let mut cell = PyramidalCell::new(self.params.cell.clone());
        let mut synapse = AmpaSynapse::new(self.params.synapse.clone());

        let mut trace = Trace {
            t_ms: Vec::with_capacity(self.num_steps),
            vm_mv: Vec::with_capacity(self.num_steps),
            epsc_pa: Vec::with_capacity(self.num_steps),
        };

        for step in 0..self.num_steps {
            let epsc = synapse.epsc_pa(cell.voltage_mv());

            trace.t_ms.push(step as f64 * dt);
            trace.vm_mv.push(cell.voltage_mv());
            trace.epsc_pa.push(epsc);

            if step == self.delivery_step {
                synapse.deliver(weight_ns);
            }

            let injected = match &protocol.holding {
                Some(holding) if step >= self.settle_step => holding.i_hold_pa,
                _ => 0.0,
            };

            cell.step(dt, epsc, injected);
            synapse.step(dt);
        }

        trace
    }
}

/// Extracts the peak EPSP from a simulated trace. Under a voltage clamp the
/// peak is searched within the open peak window and the holding voltage is
/// the baseline; otherwise the whole trace is searched against the resting
/// potential.
pub fn peak_epsp(trace: &Trace, protocol: &ProtocolParams, cell: &CellParams) -> f64 {
    match &protocol.holding {
        Some(holding) => {
            let (start, end) = protocol.peak_window_ms;
            trace
                .t_ms
                .iter()
                .zip(&trace.vm_mv)
                .filter(|(t, _)| **t > start && **t < end)
                .map(|(_, vm)| *vm)
                .fold(f64::NEG_INFINITY, f64::max)
                - holding.v_hold_mv
        }
        None => {
            trace
                .vm_mv
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max)
                - cell.v_rest_mv
        }
    }
}

pub fn peak_epsc(trace: &Trace) -> f64 {
    trace
        .epsc_pa
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max)
}
