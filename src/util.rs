pub fn decay_factor(dt_ms: f64, tau_ms: f64) -> f64 {
    (-dt_ms / tau_ms).exp()
}
