use crate::core::forcefield::params::ParameterStore;
use crate::core::forcefield::registry::ForceFieldRegistry;
use crate::core::models::groups::AtomGroups;
use crate::core::models::molecule::Molecule;
use crate::engine::config::EvaluationConfig;
use crate::engine::error::EngineError;
use crate::engine::function::ForceFieldFunction;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::info;

/// Resolves the force field and parameter table named by `config` and sets up an
/// energy function for `molecule` with every evaluation setting applied.
pub(crate) fn build_function(
    molecule: &Molecule,
    groups: &AtomGroups,
    config: &EvaluationConfig,
    reporter: &ProgressReporter,
) -> Result<ForceFieldFunction, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });

    let registry = ForceFieldRegistry::with_defaults();
    let forcefield = registry.create(&config.forcefield)?;
    let params = match &config.parameters_path {
        Some(path) => {
            info!(path = %path.display(), "Loading parameter table");
            ParameterStore::load(path)?
        }
        None => ParameterStore::builtin(),
    };

    let mut function = ForceFieldFunction::new(forcefield, params);
    function.set_verbosity(config.verbosity);
    function.set_enabled_terms(config.enabled_terms);
    function.setup_with_groups(molecule, groups.clone())?;
    if config.electrostatics {
        function.setup_electrostatics()?;
    }
    function.set_cutoff(config.cutoff);

    reporter.report(Progress::PhaseFinish);
    Ok(function)
}
