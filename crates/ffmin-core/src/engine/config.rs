use super::minimize::line_search::LineSearchType;
use crate::core::forcefield::terms::EnabledTerms;
use crate::core::forcefield::trace::Verbosity;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    SteepestDescent,
    #[default]
    ConjugateGradients,
}

#[derive(Debug, Error)]
#[error("Unknown minimization algorithm '{0}' (expected 'sd' or 'cg')")]
pub struct ParseAlgorithmError(String);

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sd" | "steepest-descent" => Ok(Self::SteepestDescent),
            "cg" | "conjugate-gradients" => Ok(Self::ConjugateGradients),
            _ => Err(ParseAlgorithmError(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SteepestDescent => write!(f, "steepest-descent"),
            Self::ConjugateGradients => write!(f, "conjugate-gradients"),
        }
    }
}

/// How the energy function is built and evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    /// Registry name of the force field, matched case-insensitively.
    pub forcefield: String,
    /// CSV parameter table; `None` selects the built-in UFF table.
    pub parameters_path: Option<PathBuf>,
    pub enabled_terms: EnabledTerms,
    pub electrostatics: bool,
    /// Non-bonded cutoff radius in Angstrom; `None` includes every pair.
    pub cutoff: Option<f64>,
    pub verbosity: Verbosity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationConfig {
    pub algorithm: Algorithm,
    pub line_search: LineSearchType,
    pub max_steps: usize,
    /// Convergence threshold on the energy change between steps, in kJ/mol.
    pub energy_tolerance: f64,
    /// Rebuild the cutoff masks every this many steps; 0 never rebuilds them.
    pub update_pairs_frequency: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinimizationConfig {
    pub evaluation: EvaluationConfig,
    pub optimization: OptimizationConfig,
}

fn validate_cutoff(cutoff: Option<f64>) -> Result<Option<f64>, ConfigError> {
    match cutoff {
        Some(radius) if !(radius.is_finite() && radius > 0.0) => Err(ConfigError::InvalidValue {
            parameter: "cutoff",
            reason: format!("must be a positive distance, got {radius}"),
        }),
        other => Ok(other),
    }
}

#[derive(Default)]
pub struct EvaluationConfigBuilder {
    forcefield: Option<String>,
    parameters_path: Option<PathBuf>,
    enabled_terms: Option<EnabledTerms>,
    electrostatics: Option<bool>,
    cutoff: Option<f64>,
    verbosity: Option<Verbosity>,
}

impl EvaluationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forcefield(mut self, name: &str) -> Self {
        self.forcefield = Some(name.to_string());
        self
    }
    pub fn parameters_path(mut self, path: Option<PathBuf>) -> Self {
        self.parameters_path = path;
        self
    }
    pub fn enabled_terms(mut self, terms: EnabledTerms) -> Self {
        self.enabled_terms = Some(terms);
        self
    }
    pub fn electrostatics(mut self, enabled: bool) -> Self {
        self.electrostatics = Some(enabled);
        self
    }
    pub fn cutoff(mut self, cutoff: Option<f64>) -> Self {
        self.cutoff = cutoff;
        self
    }
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = Some(verbosity);
        self
    }

    pub fn build(self) -> Result<EvaluationConfig, ConfigError> {
        Ok(EvaluationConfig {
            forcefield: self
                .forcefield
                .ok_or(ConfigError::MissingParameter("forcefield"))?,
            parameters_path: self.parameters_path,
            enabled_terms: self.enabled_terms.unwrap_or_default(),
            electrostatics: self.electrostatics.unwrap_or(false),
            cutoff: validate_cutoff(self.cutoff)?,
            verbosity: self.verbosity.unwrap_or_default(),
        })
    }
}

#[derive(Default)]
pub struct MinimizationConfigBuilder {
    evaluation: EvaluationConfigBuilder,
    algorithm: Option<Algorithm>,
    line_search: Option<LineSearchType>,
    max_steps: Option<usize>,
    energy_tolerance: Option<f64>,
    update_pairs_frequency: Option<usize>,
}

impl MinimizationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forcefield(mut self, name: &str) -> Self {
        self.evaluation = self.evaluation.forcefield(name);
        self
    }
    pub fn parameters_path(mut self, path: Option<PathBuf>) -> Self {
        self.evaluation = self.evaluation.parameters_path(path);
        self
    }
    pub fn enabled_terms(mut self, terms: EnabledTerms) -> Self {
        self.evaluation = self.evaluation.enabled_terms(terms);
        self
    }
    pub fn electrostatics(mut self, enabled: bool) -> Self {
        self.evaluation = self.evaluation.electrostatics(enabled);
        self
    }
    pub fn cutoff(mut self, cutoff: Option<f64>) -> Self {
        self.evaluation = self.evaluation.cutoff(cutoff);
        self
    }
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.evaluation = self.evaluation.verbosity(verbosity);
        self
    }
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }
    pub fn line_search(mut self, line_search: LineSearchType) -> Self {
        self.line_search = Some(line_search);
        self
    }
    pub fn max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }
    pub fn energy_tolerance(mut self, tolerance: f64) -> Self {
        self.energy_tolerance = Some(tolerance);
        self
    }
    pub fn update_pairs_frequency(mut self, frequency: usize) -> Self {
        self.update_pairs_frequency = Some(frequency);
        self
    }

    pub fn build(self) -> Result<MinimizationConfig, ConfigError> {
        let evaluation = self.evaluation.build()?;

        let max_steps = self
            .max_steps
            .ok_or(ConfigError::MissingParameter("max_steps"))?;
        if max_steps == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "max_steps",
                reason: "must be at least 1".to_string(),
            });
        }
        let energy_tolerance = self
            .energy_tolerance
            .ok_or(ConfigError::MissingParameter("energy_tolerance"))?;
        if !(energy_tolerance.is_finite() && energy_tolerance > 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "energy_tolerance",
                reason: format!("must be positive, got {energy_tolerance}"),
            });
        }

        Ok(MinimizationConfig {
            evaluation,
            optimization: OptimizationConfig {
                algorithm: self
                    .algorithm
                    .ok_or(ConfigError::MissingParameter("algorithm"))?,
                line_search: self.line_search.unwrap_or_default(),
                max_steps,
                energy_tolerance,
                update_pairs_frequency: self.update_pairs_frequency.unwrap_or(10),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::terms::TermKind;

    fn complete_builder() -> MinimizationConfigBuilder {
        MinimizationConfigBuilder::new()
            .forcefield("UFF")
            .algorithm(Algorithm::SteepestDescent)
            .max_steps(500)
            .energy_tolerance(1e-6)
    }

    #[test]
    fn build_applies_defaults_for_optional_fields() {
        let config = complete_builder().build().unwrap();
        assert_eq!(config.evaluation.forcefield, "UFF");
        assert_eq!(config.evaluation.parameters_path, None);
        assert_eq!(config.evaluation.enabled_terms, EnabledTerms::all());
        assert!(!config.evaluation.electrostatics);
        assert_eq!(config.evaluation.cutoff, None);
        assert_eq!(config.evaluation.verbosity, Verbosity::None);
        assert_eq!(config.optimization.line_search, LineSearchType::Simple);
        assert_eq!(config.optimization.update_pairs_frequency, 10);
    }

    #[test]
    fn missing_mandatory_fields_are_reported_by_name() {
        let err = MinimizationConfigBuilder::new()
            .algorithm(Algorithm::ConjugateGradients)
            .max_steps(10)
            .energy_tolerance(1e-6)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("forcefield"));

        let err = MinimizationConfigBuilder::new()
            .forcefield("UFF")
            .algorithm(Algorithm::ConjugateGradients)
            .energy_tolerance(1e-6)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("max_steps"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            complete_builder().max_steps(0).build(),
            Err(ConfigError::InvalidValue {
                parameter: "max_steps",
                ..
            })
        ));
        assert!(matches!(
            complete_builder().energy_tolerance(-1.0).build(),
            Err(ConfigError::InvalidValue {
                parameter: "energy_tolerance",
                ..
            })
        ));
        assert!(matches!(
            complete_builder().cutoff(Some(0.0)).build(),
            Err(ConfigError::InvalidValue {
                parameter: "cutoff",
                ..
            })
        ));
    }

    #[test]
    fn evaluation_builder_keeps_selected_terms() {
        let config = EvaluationConfigBuilder::new()
            .forcefield("uff")
            .enabled_terms(EnabledTerms::only(TermKind::Bond))
            .electrostatics(true)
            .cutoff(Some(8.0))
            .build()
            .unwrap();
        assert!(config.enabled_terms.is_enabled(TermKind::Bond));
        assert!(!config.enabled_terms.is_enabled(TermKind::Angle));
        assert!(config.electrostatics);
        assert_eq!(config.cutoff, Some(8.0));
    }

    #[test]
    fn algorithm_parses_short_and_long_names() {
        assert_eq!("sd".parse::<Algorithm>().unwrap(), Algorithm::SteepestDescent);
        assert_eq!(
            "Conjugate-Gradients".parse::<Algorithm>().unwrap(),
            Algorithm::ConjugateGradients
        );
        assert!("bfgs".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::SteepestDescent.to_string(), "steepest-descent");
    }
}
