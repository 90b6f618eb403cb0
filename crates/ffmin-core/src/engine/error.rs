use thiserror::Error;

use super::config::ConfigError;
use crate::core::forcefield::params::{ParamLoadError, ParameterError};
use crate::core::forcefield::registry::RegistryError;
use crate::core::forcefield::setup::SetupError;
use crate::core::models::molecule::MoleculeError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("The energy function has not been set up; call setup() first")]
    NotSetUp,

    #[error("Setup failed: {source}")]
    Setup {
        #[from]
        source: SetupError,
    },

    #[error("Parameter lookup failed: {source}")]
    Parameter {
        #[from]
        source: ParameterError,
    },

    #[error("Failed to load parameters: {source}")]
    ParameterLoad {
        #[from]
        source: ParamLoadError,
    },

    #[error("Force field selection failed: {source}")]
    Registry {
        #[from]
        source: RegistryError,
    },

    #[error("Invalid molecule: {source}")]
    Molecule {
        #[from]
        source: MoleculeError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Atom index {index} is out of range for {count} atoms")]
    AtomIndexOutOfRange { index: usize, count: usize },
}
