use super::prepare::build_function;
use crate::core::models::groups::AtomGroups;
use crate::core::models::molecule::Molecule;
use crate::engine::config::EvaluationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::validation::{GradientReport, validate_gradients};
use tracing::instrument;

/// Sets up `molecule` and checks its analytic forces against finite differences.
#[instrument(skip_all, name = "validation_workflow")]
pub fn run(
    molecule: &Molecule,
    groups: &AtomGroups,
    config: &EvaluationConfig,
    reporter: &ProgressReporter,
) -> Result<GradientReport, EngineError> {
    let mut function = build_function(molecule, groups, config, reporter)?;

    reporter.report(Progress::PhaseStart {
        name: "Gradient Validation",
    });
    let report = validate_gradients(&mut function)?;
    reporter.report(Progress::PhaseFinish);
    Ok(report)
}
