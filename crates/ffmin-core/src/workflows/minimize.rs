use super::prepare::build_function;
use crate::core::models::groups::AtomGroups;
use crate::core::models::molecule::Molecule;
use crate::engine::config::{Algorithm, MinimizationConfig};
use crate::engine::error::EngineError;
use crate::engine::function::{Computation, EnergyBreakdown};
use crate::engine::minimize::minimizer::{MinimizationOutcome, Minimizer};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct MinimizationResult {
    /// The input molecule with the minimized coordinates.
    pub molecule: Molecule,
    pub initial_energy: f64,
    pub outcome: MinimizationOutcome,
    /// Per-term energies at the final coordinates.
    pub breakdown: EnergyBreakdown,
}

/// Minimizes `molecule` with the algorithm and line search in `config`.
///
/// The run stops on convergence or after `max_steps` steps; exhausting the budget
/// is reported through [`MinimizationOutcome::converged`], not as an error.
#[instrument(skip_all, name = "minimization_workflow")]
pub fn run(
    molecule: &Molecule,
    groups: &AtomGroups,
    config: &MinimizationConfig,
    reporter: &ProgressReporter,
) -> Result<MinimizationResult, EngineError> {
    let mut function = build_function(molecule, groups, &config.evaluation, reporter)?;
    let initial_energy = function.compute(Computation::Value)?;
    info!(
        initial_energy,
        algorithm = %config.optimization.algorithm,
        line_search = %config.optimization.line_search,
        "Starting minimization"
    );

    let optimization = &config.optimization;
    reporter.report(Progress::PhaseStart {
        name: "Minimization",
    });
    reporter.report(Progress::TaskStart {
        total_steps: optimization.max_steps as u64,
    });

    let outcome = {
        let mut minimizer =
            Minimizer::new(&mut function).with_line_search(optimization.line_search);
        minimizer.set_update_pairs_frequency(optimization.update_pairs_frequency);

        match optimization.algorithm {
            Algorithm::SteepestDescent => minimizer
                .steepest_descent_initialize(optimization.max_steps, optimization.energy_tolerance)?,
            Algorithm::ConjugateGradients => minimizer.conjugate_gradients_initialize(
                optimization.max_steps,
                optimization.energy_tolerance,
            )?,
        }

        let mut reported = 0;
        loop {
            let more = match optimization.algorithm {
                Algorithm::SteepestDescent => minimizer.steepest_descent_take_n_steps(1)?,
                Algorithm::ConjugateGradients => minimizer.conjugate_gradients_take_n_steps(1)?,
            };
            let state = minimizer.state();
            if state.step > reported {
                reported = state.step;
                reporter.report(Progress::StepCompleted {
                    step: state.step as u64,
                    energy: state.previous_energy,
                });
            }
            if !more {
                break;
            }
        }
        minimizer.outcome()
    };

    reporter.report(Progress::TaskFinish {
        converged: outcome.converged,
    });
    reporter.report(Progress::PhaseFinish);

    if outcome.converged {
        info!(
            steps = outcome.steps,
            energy = outcome.energy,
            "Minimization converged"
        );
    } else {
        warn!(
            steps = outcome.steps,
            energy = outcome.energy,
            "Step budget exhausted before convergence"
        );
    }

    let breakdown = function.energy_breakdown()?;
    let mut minimized = molecule.clone();
    minimized.set_positions(function.positions())?;

    Ok(MinimizationResult {
        molecule: minimized,
        initial_energy,
        outcome,
        breakdown,
    })
}
