use crate::{params::SynapseParams, util::decay_factor};

/// Time from a presynaptic kick to the conductance maximum.
pub fn time_to_peak_ms(params: &SynapseParams) -> f64 {
    (params.tau_decay_ms * params.tau_rise_ms) / (params.tau_decay_ms - params.tau_rise_ms)
        * (params.tau_decay_ms / params.tau_rise_ms).ln()
}

/// Scale factor on the decay driver so that a unit weight produces a unit
/// peak conductance.
pub fn peak_norm(params: &SynapseParams) -> f64 {
    let tp = time_to_peak_ms(params);
    1.0 / ((-tp / params.tau_decay_ms).exp() - (-tp / params.tau_rise_ms).exp())
}

/// Bi-exponential AMPA conductance:
/// dg/dt = (x - g) / tau_rise, dx/dt = -x / tau_decay.
pub struct AmpaSynapse {
    g: f64,
    x: f64,
    norm: f64,
    params: SynapseParams,
}

impl AmpaSynapse {
    pub fn new(params: SynapseParams) -> Self {
        Self {
            g: 0.0,
            x: 0.0,
            norm: peak_norm(&params),
            params,
        }
    }

    /// Presynaptic spike arrival with the given synaptic weight.
    pub fn deliver(&mut self, weight_ns: f64) {
        self.x += self.norm * weight_ns;
    }

    /// Advances both states by the closed-form solution of the linear pair,
    /// valid for any step size without presynaptic events in between.
    pub fn step(&mut self, dt_ms: f64) {
        let f_decay = decay_factor(dt_ms, self.params.tau_decay_ms);
        let f_rise = decay_factor(dt_ms, self.params.tau_rise_ms);
        let coupling = self.params.tau_decay_ms / (self.params.tau_decay_ms - self.params.tau_rise_ms);

        self.g = self.g * f_rise + self.x * coupling * (f_decay - f_rise);
        self.x *= f_decay;
    }

    pub fn conductance_ns(&self) -> f64 {
        self.params.unit_conductance_ns * self.g
    }

    pub fn epsc_pa(&self, vm_mv: f64) -> f64 {
        self.conductance_ns() * (self.params.e_rev_mv - vm_mv)
    }
}
