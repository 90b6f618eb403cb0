use super::prepare::build_function;
use crate::core::models::groups::AtomGroups;
use crate::core::models::molecule::Molecule;
use crate::engine::config::EvaluationConfig;
use crate::engine::error::EngineError;
use crate::engine::function::{Computation, EnergyBreakdown};
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::Vector3;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct EnergyResult {
    pub energy: f64,
    pub breakdown: EnergyBreakdown,
    /// Forces (`-dE/dr`) on every atom, in kJ/mol/Angstrom.
    pub forces: Vec<Vector3<f64>>,
}

/// Evaluates the energy, per-term breakdown and forces of `molecule` once.
#[instrument(skip_all, name = "energy_workflow")]
pub fn run(
    molecule: &Molecule,
    groups: &AtomGroups,
    config: &EvaluationConfig,
    reporter: &ProgressReporter,
) -> Result<EnergyResult, EngineError> {
    let mut function = build_function(molecule, groups, config, reporter)?;

    reporter.report(Progress::PhaseStart { name: "Evaluation" });
    let energy = function.compute(Computation::Gradients)?;
    let forces = function.gradients().to_vec();
    let breakdown = function.energy_breakdown()?;
    reporter.report(Progress::PhaseFinish);

    info!(energy, "Energy evaluated");
    Ok(EnergyResult {
        energy,
        breakdown,
        forces,
    })
}
