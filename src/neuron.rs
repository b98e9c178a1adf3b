use crate::{params::CellParams, util::decay_factor};

/// Adaptive exponential integrate-and-fire membrane state. Voltage relaxes
/// toward the instantaneous equilibrium of the linearized equation each step;
/// the exponential spike term is held constant over a step.
#[derive(Debug, Clone)]
pub struct PyramidalCell {
    vm_mv: f64,
    w_pa: f64,
    refractory_left_ms: f64,
    params: CellParams,
}

impl PyramidalCell {
    pub fn new(params: CellParams) -> Self {
        Self {
            vm_mv: params.v_rest_mv,
            w_pa: 0.0,
            refractory_left_ms: 0.0,
            params,
        }
    }

    pub fn voltage_mv(&self) -> f64 {
        self.vm_mv
    }

    pub fn adaptation_pa(&self) -> f64 {
        self.w_pa
    }

    pub fn is_refractory(&self) -> bool {
        self.refractory_left_ms > 0.0
    }

    /// Advances one time step under the given synaptic and injected currents
    /// (both in pA). Returns true if the cell spiked during this step.
    pub fn step(&mut self, dt_ms: f64, syn_current_pa: f64, injected_pa: f64) -> bool {
        let p = &self.params;
        let vm_0 = self.vm_mv;
        let w_0 = self.w_pa;

        // adaptation relaxes toward a*(vm - v_rest) also while refractory
        let w_inf = p.a_ns * (vm_0 - p.v_rest_mv);
        self.w_pa = w_inf + (w_0 - w_inf) * decay_factor(dt_ms, p.tau_w_ms);

        if self.refractory_left_ms > 0.0 {
            self.refractory_left_ms = (self.refractory_left_ms - dt_ms).max(0.0);
            return false;
        }

        let exp_current_pa =
            p.g_leak_ns * p.delta_t_mv * ((vm_0 - p.theta_mv) / p.delta_t_mv).exp();
        let vm_inf = p.v_rest_mv
            + (exp_current_pa - w_0 + syn_current_pa + injected_pa) / p.g_leak_ns;

        self.vm_mv = vm_inf + (vm_0 - vm_inf) * decay_factor(dt_ms, p.tau_mem_ms);

        if self.vm_mv >= p.spike_threshold_mv() {
            self.vm_mv = p.v_reset_mv;
            self.w_pa += p.b_pa;
            self.refractory_left_ms = p.t_ref_ms;
            return true;
        }

        false
    }
}

/// Steady-state current that clamps the cell at `v_hold_mv`, from the AdEx
/// equilibrium with the adaptation current settled at a*(v_hold - v_rest).
pub fn holding_current_for(params: &CellParams, v_hold_mv: f64) -> f64 {
    let exp_current_pa = params.g_leak_ns
        * params.delta_t_mv
        * ((v_hold_mv - params.theta_mv) / params.delta_t_mv).exp();
    let w_eq_pa = params.a_ns * (v_hold_mv - params.v_rest_mv);

    params.g_leak_ns * (v_hold_mv - params.v_rest_mv) - exp_current_pa + w_eq_pa
}

#[cfg(test)]
mod tests {

    use super::*;
    use float_cmp::assert_approx_eq;

    fn params() -> CellParams {
        CellParams::default()
    }

    #[test]
    fn rests_at_v_rest() {
        let params = params();
        let mut sut = PyramidalCell::new(params.clone());

        for _ in 0..5000 {
            sut.step(0.1, 0.0, 0.0);
        }

        assert_approx_eq!(f64, sut.voltage_mv(), params.v_rest_mv, epsilon = 0.01);
        assert_approx_eq!(f64, sut.adaptation_pa(), 0.0, epsilon = 0.01);
    }

    #[test]
    fn holding_current_matches_precalculated_value() {
        // 20.967 pA at -70 mV in the reference cell
        let i_hold = holding_current_for(&params(), -70.0);
        assert_approx_eq!(f64, i_hold, 20.967, epsilon = 0.01);
    }

    #[test]
    fn holding_current_clamps_voltage() {
        let params = params();
        let v_hold = -70.0;
        let i_hold = holding_current_for(&params, v_hold);
        let mut sut = PyramidalCell::new(params);

        for _ in 0..10000 {
            sut.step(0.1, 0.0, i_hold);
        }

        assert_approx_eq!(f64, sut.voltage_mv(), v_hold, epsilon = 0.05);
    }

    #[test]
    fn depolarizing_current_raises_voltage() {
        let params = params();
        let mut sut = PyramidalCell::new(params.clone());

        for _ in 0..100 {
            sut.step(0.1, 5.0, 0.0);
        }

        assert!(sut.voltage_mv() > params.v_rest_mv);
        assert!(sut.voltage_mv() < params.spike_threshold_mv());
    }

    #[test]
    fn strong_current_triggers_spike_and_reset() {
        let params = params();
        let mut sut = PyramidalCell::new(params.clone());

        let mut spiked_at = None;
        for step in 0..5000 {
            if sut.step(0.1, 0.0, 500.0) {
                spiked_at = Some(step);
                break;
            }
        }

        assert!(spiked_at.is_some());
        assert_approx_eq!(f64, sut.voltage_mv(), params.v_reset_mv);
        assert!(sut.adaptation_pa() > 150.0);
        assert!(sut.is_refractory());
    }

    #[test]
    fn voltage_clamped_during_refractory_period() {
        let params = params();
        let mut sut = PyramidalCell::new(params.clone());

        while !sut.step(0.1, 0.0, 500.0) {}

        // t_ref is just under 6 ms; vm must stay at v_reset for 5.9 ms
        for _ in 0..59 {
            sut.step(0.1, 0.0, 500.0);
            assert_approx_eq!(f64, sut.voltage_mv(), params.v_reset_mv);
        }

        let mut left_reset = false;
        for _ in 0..20 {
            sut.step(0.1, 0.0, 500.0);
            if (sut.voltage_mv() - params.v_reset_mv).abs() > 1e-9 {
                left_reset = true;
                break;
            }
        }

        assert!(left_reset);
    }

    #[test]
    fn adaptation_keeps_relaxing_while_refractory() {
        let params = params();
        let mut sut = PyramidalCell::new(params.clone());

        while !sut.step(0.1, 0.0, 500.0) {}
        let w_after_spike = sut.adaptation_pa();

        sut.step(0.1, 0.0, 0.0);
        assert!(sut.is_refractory());
        assert!(sut.adaptation_pa() < w_after_spike);
    }

    #[test]
    fn spike_increments_adaptation_by_b() {
        let params = params();
        let mut sut = PyramidalCell::new(params.clone());

        let w_before;
        loop {
            let w_pre_step = sut.adaptation_pa();
            if sut.step(0.1, 0.0, 500.0) {
                w_before = w_pre_step;
                break;
            }
        }

        // reset adds b on top of the integrated adaptation state
        assert!(sut.adaptation_pa() > w_before);
        assert!(sut.adaptation_pa() - w_before <= params.b_pa + 1.0);
        assert!(sut.adaptation_pa() - w_before >= params.b_pa - 5.0);
    }
}
