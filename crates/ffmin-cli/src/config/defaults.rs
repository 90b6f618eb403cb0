use ffmin::core::forcefield::trace::Verbosity;
use ffmin::engine::config::Algorithm;
use ffmin::engine::minimize::line_search::LineSearchType;

pub struct DefaultsConfig {
    pub forcefield: String,
    pub electrostatics: bool,
    pub verbosity: Verbosity,
    pub algorithm: Algorithm,
    pub line_search: LineSearchType,
    pub max_steps: usize,
    pub energy_tolerance: f64,
    pub update_pairs_frequency: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            forcefield: "UFF".to_string(),
            electrostatics: false,
            verbosity: Verbosity::None,
            algorithm: Algorithm::ConjugateGradients,
            line_search: LineSearchType::Simple,
            max_steps: 2500,
            energy_tolerance: 1e-6,
            update_pairs_frequency: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn electrostatics_is_opt_in() {
        assert!(!DefaultsConfig::default().electrostatics);
    }
}
