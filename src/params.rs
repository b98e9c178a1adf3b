use serde::{Deserialize, Serialize};
use simple_error::SimpleError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub cell: CellParams,
    pub synapse: SynapseParams,
    pub protocol: ProtocolParams,
    pub num_samples: usize,
    pub seed: u64,
}

/// Adaptive exponential integrate-and-fire pyramidal cell constants.
/// Units: mV, ms, nS, pA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellParams {
    pub g_leak_ns: f64,
    pub tau_mem_ms: f64,
    pub v_rest_mv: f64,
    pub v_reset_mv: f64,
    pub theta_mv: f64,
    pub delta_t_mv: f64,
    pub t_ref_ms: f64,
    pub a_ns: f64,
    pub b_pa: f64,
    pub tau_w_ms: f64,
}

impl CellParams {
    pub fn c_m_pf(&self) -> f64 {
        self.tau_mem_ms * self.g_leak_ns
    }

    /// Numerical spike detection threshold, safely above the exponential
    /// divergence point.
    pub fn spike_threshold_mv(&self) -> f64 {
        self.theta_mv + 5.0 * self.delta_t_mv
    }
}

/// Bi-exponential AMPA conductance kinetics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynapseParams {
    pub tau_rise_ms: f64,
    pub tau_decay_ms: f64,
    pub delay_ms: f64,
    pub e_rev_mv: f64,
    pub unit_conductance_ns: f64,
}

/// Voltage clamp of the postsynaptic cell. The holding current has to match
/// the holding voltage (see `neuron::holding_current_for`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingParams {
    pub v_hold_mv: f64,
    pub i_hold_pa: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolParams {
    pub dt_ms: f64,
    pub duration_ms: f64,
    pub settle_ms: f64,
    pub pre_spike_ms: f64,
    pub peak_window_ms: (f64, f64),
    pub holding: Option<HoldingParams>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            cell: CellParams::default(),
            synapse: SynapseParams::default(),
            protocol: ProtocolParams::default(),
            num_samples: 500,
            seed: 12345,
        }
    }
}

impl Default for CellParams {
    fn default() -> Self {
        Self {
            g_leak_ns: 4.31475791937223,
            tau_mem_ms: 41.7488927175169,
            v_rest_mv: -75.1884554193901,
            v_reset_mv: -29.738747396665072,
            theta_mv: -24.4255910105977,
            delta_t_mv: 4.2340696257631,
            t_ref_ms: 5.96326930945599,
            a_ns: -0.274347065652738,
            b_pa: 206.841448096415,
            tau_w_ms: 84.9358017225512,
        }
    }
}

impl Default for SynapseParams {
    fn default() -> Self {
        Self {
            tau_rise_ms: 1.3,
            tau_decay_ms: 9.5,
            delay_ms: 2.2,
            e_rev_mv: 0.0,
            unit_conductance_ns: 1.0,
        }
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            dt_ms: 0.1,
            duration_ms: 400.0,
            settle_ms: 10.0,
            pre_spike_ms: 250.0,
            peak_window_ms: (250.0, 350.0),
            holding: Some(HoldingParams {
                v_hold_mv: -70.0,
                i_hold_pa: 20.967,
            }),
        }
    }
}

pub fn validate_analysis_params(analysis_params: &AnalysisParams) -> Result<(), SimpleError> {
    validate_cell_params(&analysis_params.cell)?;
    validate_synapse_params(&analysis_params.synapse)?;
    validate_protocol_params(&analysis_params.protocol)?;

    if analysis_params.num_samples == 0 {
        return Err(SimpleError::new("num_samples must be strictly positive"));
    }

    let arrival_ms = analysis_params.protocol.pre_spike_ms + analysis_params.synapse.delay_ms;
    if arrival_ms >= analysis_params.protocol.duration_ms {
        return Err(SimpleError::new(
            "presynaptic spike plus conduction delay must lie within the simulated duration",
        ));
    }

    Ok(())
}

fn validate_cell_params(cell_params: &CellParams) -> Result<(), SimpleError> {
    if cell_params.g_leak_ns <= 0.0 {
        return Err(SimpleError::new("g_leak must be strictly positive"));
    }

    if cell_params.tau_mem_ms <= 0.0 {
        return Err(SimpleError::new("tau_mem must be strictly positive"));
    }

    if cell_params.delta_t_mv <= 0.0 {
        return Err(SimpleError::new("delta_t must be strictly positive"));
    }

    if cell_params.tau_w_ms <= 0.0 {
        return Err(SimpleError::new("tau_w must be strictly positive"));
    }

    if cell_params.t_ref_ms < 0.0 {
        return Err(SimpleError::new("t_ref must not be negative"));
    }

    if cell_params.v_reset_mv >= cell_params.spike_threshold_mv() {
        return Err(SimpleError::new(
            "v_reset must be less than the spike detection threshold",
        ));
    }

    if cell_params.v_rest_mv >= cell_params.spike_threshold_mv() {
        return Err(SimpleError::new(
            "v_rest must be less than the spike detection threshold",
        ));
    }

    Ok(())
}

fn validate_synapse_params(synapse_params: &SynapseParams) -> Result<(), SimpleError> {
    if synapse_params.tau_rise_ms <= 0.0 {
        return Err(SimpleError::new("tau_rise must be strictly positive"));
    }

    if synapse_params.tau_decay_ms <= synapse_params.tau_rise_ms {
        return Err(SimpleError::new("tau_decay must be greater than tau_rise"));
    }

    if synapse_params.delay_ms < 0.0 {
        return Err(SimpleError::new("delay must not be negative"));
    }

    if synapse_params.unit_conductance_ns <= 0.0 {
        return Err(SimpleError::new(
            "unit_conductance must be strictly positive",
        ));
    }

    Ok(())
}

fn validate_protocol_params(protocol_params: &ProtocolParams) -> Result<(), SimpleError> {
    if protocol_params.dt_ms <= 0.0 {
        return Err(SimpleError::new("dt must be strictly positive"));
    }

    if protocol_params.duration_ms <= 0.0 {
        return Err(SimpleError::new("duration must be strictly positive"));
    }

    if protocol_params.settle_ms < 0.0 {
        return Err(SimpleError::new("settle must not be negative"));
    }

    if protocol_params.settle_ms >= protocol_params.duration_ms {
        return Err(SimpleError::new("settle must be less than duration"));
    }

    if protocol_params.pre_spike_ms < 0.0 {
        return Err(SimpleError::new("pre_spike must not be negative"));
    }

    let (window_start, window_end) = protocol_params.peak_window_ms;

    if window_start >= window_end {
        return Err(SimpleError::new("peak window must be non-empty"));
    }

    if window_start < 0.0 || window_end > protocol_params.duration_ms {
        return Err(SimpleError::new(
            "peak window must lie within the simulated duration",
        ));
    }

    if window_start < protocol_params.pre_spike_ms {
        return Err(SimpleError::new(
            "peak window must not start before the presynaptic stimulus",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn valid_params() {
        let params = AnalysisParams::default();
        assert!(validate_analysis_params(&params).is_ok());
    }

    #[test]
    fn zero_g_leak() {
        let mut params = AnalysisParams::default();
        params.cell.g_leak_ns = 0.0;
        let result = validate_analysis_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "g_leak must be strictly positive"
        );
    }

    #[test]
    fn zero_tau_mem() {
        let mut params = AnalysisParams::default();
        params.cell.tau_mem_ms = 0.0;
        let result = validate_analysis_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "tau_mem must be strictly positive"
        );
    }

    #[test]
    fn negative_t_ref() {
        let mut params = AnalysisParams::default();
        params.cell.t_ref_ms = -1.0;
        let result = validate_analysis_params(&params);

        assert!(result.is_err());

        assert_eq!(result.unwrap_err().as_str(), "t_ref must not be negative");
    }

    #[test]
    fn too_high_v_reset() {
        let mut params = AnalysisParams::default();
        params.cell.v_reset_mv = params.cell.spike_threshold_mv();
        let result = validate_analysis_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "v_reset must be less than the spike detection threshold"
        );
    }

    #[test]
    fn tau_decay_not_greater_than_tau_rise() {
        let mut params = AnalysisParams::default();
        params.synapse.tau_decay_ms = params.synapse.tau_rise_ms;
        let result = validate_analysis_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "tau_decay must be greater than tau_rise"
        );
    }

    #[test]
    fn negative_delay() {
        let mut params = AnalysisParams::default();
        params.synapse.delay_ms = -0.1;
        let result = validate_analysis_params(&params);

        assert!(result.is_err());

        assert_eq!(result.unwrap_err().as_str(), "delay must not be negative");
    }

    #[test]
    fn zero_dt() {
        let mut params = AnalysisParams::default();
        params.protocol.dt_ms = 0.0;
        let result = validate_analysis_params(&params);

        assert!(result.is_err());

        assert_eq!(result.unwrap_err().as_str(), "dt must be strictly positive");
    }

    #[test]
    fn settle_beyond_duration() {
        let mut params = AnalysisParams::default();
        params.protocol.settle_ms = params.protocol.duration_ms;
        let result = validate_analysis_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "settle must be less than duration"
        );
    }

    #[test]
    fn empty_peak_window() {
        let mut params = AnalysisParams::default();
        params.protocol.peak_window_ms = (350.0, 350.0);
        let result = validate_analysis_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "peak window must be non-empty"
        );
    }

    #[test]
    fn peak_window_beyond_duration() {
        let mut params = AnalysisParams::default();
        params.protocol.peak_window_ms = (250.0, 450.0);
        let result = validate_analysis_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "peak window must lie within the simulated duration"
        );
    }

    #[test]
    fn peak_window_before_stimulus() {
        let mut params = AnalysisParams::default();
        params.protocol.peak_window_ms = (200.0, 350.0);
        let result = validate_analysis_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "peak window must not start before the presynaptic stimulus"
        );
    }

    #[test]
    fn zero_num_samples() {
        let mut params = AnalysisParams::default();
        params.num_samples = 0;
        let result = validate_analysis_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "num_samples must be strictly positive"
        );
    }

    #[test]
    fn stimulus_arrival_beyond_duration() {
        let mut params = AnalysisParams::default();
        params.protocol.pre_spike_ms = 399.0;
        params.protocol.peak_window_ms = (399.0, 400.0);
        let result = validate_analysis_params(&params);

        assert!(result.is_err());

        assert_eq!(
            result.unwrap_err().as_str(),
            "presynaptic spike plus conduction delay must lie within the simulated duration"
        );
    }

    #[test]
    fn derived_capacitance() {
        let cell = CellParams::default();
        let c_m = cell.c_m_pf();
        assert!(c_m > 180.0 && c_m < 180.3);
    }

    #[test]
    fn yaml_round_trip() {
        let params = AnalysisParams::default();
        let yaml = serde_yaml::to_string(&params).unwrap();
        let restored: AnalysisParams = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored.num_samples, params.num_samples);
        assert_eq!(restored.seed, params.seed);
        assert!(restored.protocol.holding.is_some());
    }
}
