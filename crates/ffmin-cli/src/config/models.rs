use ffmin::engine::config as core_config;
use std::path::PathBuf;

/// Resolved settings for `energy` and `validate`.
pub struct EvaluationAppConfig {
    pub input_path: PathBuf,
    pub groups_path: Option<PathBuf>,
    pub core_config: core_config::EvaluationConfig,
}

/// Resolved settings for `minimize`.
pub struct MinimizationAppConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub groups_path: Option<PathBuf>,
    pub core_config: core_config::MinimizationConfig,
}
