use super::line_search::{self, LineSearchType};
use crate::core::forcefield::trace::Verbosity;
use crate::engine::error::EngineError;
use crate::engine::function::{Computation, ForceFieldFunction};
use nalgebra::Vector3;
use tracing::debug;

/// Mutable bookkeeping of one minimization run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinimizerState {
    /// Steps taken since the last initialization.
    pub step: usize,
    pub max_steps: usize,
    /// Convergence threshold on the energy change between steps, in kJ/mol.
    pub energy_tolerance: f64,
    /// Energy at the end of the previous step.
    pub previous_energy: f64,
    /// Forces at the start of the previous conjugate-gradient step.
    pub previous_gradient: Vec<Vector3<f64>>,
    /// Search direction of the previous conjugate-gradient step.
    pub direction: Vec<Vector3<f64>>,
    pub converged: bool,
}

/// Result of a complete minimization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizationOutcome {
    pub converged: bool,
    pub steps: usize,
    /// Final energy in kJ/mol.
    pub energy: f64,
}

/// Local geometry optimizer driving a [`ForceFieldFunction`].
///
/// Both algorithms are exposed in three flavors: `*_initialize` evaluates the start
/// point, `*_take_n_steps` advances by up to `n` steps and reports whether more steps
/// are possible, and the plain method runs to convergence or the step budget.
/// Running out of steps is a normal end, distinguished from convergence by
/// [`MinimizerState::converged`].
pub struct Minimizer<'f> {
    function: &'f mut ForceFieldFunction,
    line_search: LineSearchType,
    update_pairs_frequency: usize,
    state: MinimizerState,
}

impl<'f> Minimizer<'f> {
    pub fn new(function: &'f mut ForceFieldFunction) -> Self {
        Self {
            function,
            line_search: LineSearchType::default(),
            update_pairs_frequency: 0,
            state: MinimizerState::default(),
        }
    }

    pub fn with_line_search(mut self, line_search: LineSearchType) -> Self {
        self.line_search = line_search;
        self
    }

    pub fn set_line_search_type(&mut self, line_search: LineSearchType) {
        self.line_search = line_search;
    }

    pub fn line_search_type(&self) -> LineSearchType {
        self.line_search
    }

    /// Rebuilds the cutoff masks every `frequency` steps when a cutoff is set.
    /// Zero disables the rebuild.
    pub fn set_update_pairs_frequency(&mut self, frequency: usize) {
        self.update_pairs_frequency = frequency;
    }

    pub fn state(&self) -> &MinimizerState {
        &self.state
    }

    pub fn function(&self) -> &ForceFieldFunction {
        &*self.function
    }

    pub fn outcome(&self) -> MinimizationOutcome {
        MinimizationOutcome {
            converged: self.state.converged,
            steps: self.state.step,
            energy: self.state.previous_energy,
        }
    }

    pub fn steepest_descent_initialize(
        &mut self,
        steps: usize,
        energy_tolerance: f64,
    ) -> Result<(), EngineError> {
        self.reset(steps, energy_tolerance)?;

        self.function.trace_with(Verbosity::Low, || {
            format!(
                "\nS T E E P E S T   D E S C E N T\n\nSTEPS = {steps}\n\n\
                 STEP n       E(n)         E(n-1)    \n\
                 ------------------------------------"
            )
        });
        let energy = self.state.previous_energy;
        self.function.trace_with(Verbosity::Low, || {
            format!(" {:4}    {:8.3}      ----", 0, energy)
        });
        Ok(())
    }

    /// Takes up to `n` steepest-descent steps. Returns `false` once the run has
    /// converged or used its step budget.
    pub fn steepest_descent_take_n_steps(&mut self, n: usize) -> Result<bool, EngineError> {
        for _ in 0..n {
            if self.is_stopped() {
                return Ok(false);
            }
            self.state.step += 1;
            self.refresh_pairs()?;

            let mut direction = self.function.gradients().to_vec();
            self.line_search(&mut direction)?;
            let energy = self.function.compute(Computation::Gradients)?;

            let (step, previous) = (self.state.step, self.state.previous_energy);
            if step % 10 == 0 {
                self.function.trace_with(Verbosity::Low, || {
                    format!(" {:4}    {:8.5}    {:8.5}", step, energy, previous)
                });
            }

            if self.finish_step(energy, "STEEPEST DESCENT") {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn steepest_descent(
        &mut self,
        steps: usize,
        energy_tolerance: f64,
    ) -> Result<MinimizationOutcome, EngineError> {
        self.steepest_descent_initialize(steps, energy_tolerance)?;
        self.steepest_descent_take_n_steps(steps)?;
        Ok(self.outcome())
    }

    /// Evaluates the start point and takes the first conjugate-gradient step, which
    /// is a steepest-descent step. The step counter stays at zero.
    pub fn conjugate_gradients_initialize(
        &mut self,
        steps: usize,
        energy_tolerance: f64,
    ) -> Result<(), EngineError> {
        self.reset(steps, energy_tolerance)?;

        self.function.trace_with(Verbosity::Low, || {
            format!(
                "\nC O N J U G A T E   G R A D I E N T S\n\nSTEPS = {steps}\n\n\
                 STEP n     E(n)       E(n-1)    \n\
                 --------------------------------"
            )
        });

        let mut direction = self.function.gradients().to_vec();
        self.line_search(&mut direction)?;
        let energy = self.function.compute(Computation::Gradients)?;

        let previous = self.state.previous_energy;
        self.function.trace_with(Verbosity::Low, || {
            format!(" {:4}    {:8.3}    {:8.3}", 1, energy, previous)
        });

        self.state.previous_gradient = self.function.gradients().to_vec();
        self.state.direction = self.state.previous_gradient.clone();
        self.state.previous_energy = energy;
        Ok(())
    }

    /// Takes up to `n` Fletcher-Reeves steps. The direction falls back to the plain
    /// forces every N steps, N being the atom count. Returns `false` once the run
    /// has converged or used its step budget.
    pub fn conjugate_gradients_take_n_steps(&mut self, n: usize) -> Result<bool, EngineError> {
        for _ in 0..n {
            if self.is_stopped() {
                return Ok(false);
            }
            self.state.step += 1;
            self.refresh_pairs()?;

            let forces = self.function.gradients().to_vec();
            let reset_period = self.function.atom_count().max(1);
            let mut direction = if self.state.step % reset_period == 0 {
                forces.clone()
            } else {
                let beta = fletcher_reeves_beta(&forces, &self.state.previous_gradient);
                forces
                    .iter()
                    .zip(&self.state.direction)
                    .map(|(g, d)| g + d * beta)
                    .collect()
            };

            self.line_search(&mut direction)?;
            self.state.previous_gradient = forces;
            self.state.direction = direction;

            let energy = self.function.compute(Computation::Gradients)?;

            let (step, previous) = (self.state.step, self.state.previous_energy);
            let converged = (energy - previous).abs() < self.state.energy_tolerance;
            if converged || step % 10 == 0 {
                self.function.trace_with(Verbosity::Low, || {
                    format!(" {:4}    {:8.3}    {:8.3}", step, energy, previous)
                });
            }

            if self.finish_step(energy, "CONJUGATE GRADIENTS") {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn conjugate_gradients(
        &mut self,
        steps: usize,
        energy_tolerance: f64,
    ) -> Result<MinimizationOutcome, EngineError> {
        self.conjugate_gradients_initialize(steps, energy_tolerance)?;
        self.conjugate_gradients_take_n_steps(steps)?;
        Ok(self.outcome())
    }

    fn reset(&mut self, steps: usize, energy_tolerance: f64) -> Result<(), EngineError> {
        let energy = self.function.compute(Computation::Gradients)?;
        self.state = MinimizerState {
            step: 0,
            max_steps: steps,
            energy_tolerance,
            previous_energy: energy,
            previous_gradient: vec![Vector3::zeros(); self.function.atom_count()],
            direction: vec![Vector3::zeros(); self.function.atom_count()],
            converged: false,
        };
        debug!(steps, energy_tolerance, energy, "Minimizer initialized");
        Ok(())
    }

    fn is_stopped(&self) -> bool {
        self.state.converged || self.state.step >= self.state.max_steps
    }

    fn line_search(&mut self, direction: &mut [Vector3<f64>]) -> Result<f64, EngineError> {
        line_search::search(self.line_search, self.function, direction)
    }

    /// Rebuilds the cutoff masks on schedule. The start energy and forces are
    /// refreshed so the step compares energies under the same masks.
    fn refresh_pairs(&mut self) -> Result<(), EngineError> {
        if self.function.cutoff().is_none()
            || self.update_pairs_frequency == 0
            || self.state.step % self.update_pairs_frequency != 0
        {
            return Ok(());
        }
        self.function.update_pair_masks();
        self.state.previous_energy = self.function.compute(Computation::Gradients)?;
        Ok(())
    }

    /// Records the energy of a finished step; returns `true` when the run stops.
    fn finish_step(&mut self, energy: f64, algorithm: &str) -> bool {
        let previous = self.state.previous_energy;
        self.state.previous_energy = energy;
        if (energy - previous).abs() < self.state.energy_tolerance {
            self.state.converged = true;
            self.function.trace_with(Verbosity::Low, || {
                format!("    {algorithm} HAS CONVERGED")
            });
            debug!(step = self.state.step, energy, "Minimization converged");
            return true;
        }
        self.state.step >= self.state.max_steps
    }
}

/// Global Fletcher-Reeves coefficient `g_new . g_new / g_old . g_old`, zero when
/// the previous forces vanish.
fn fletcher_reeves_beta(current: &[Vector3<f64>], previous: &[Vector3<f64>]) -> f64 {
    let g_new: f64 = current.iter().map(|g| g.norm_squared()).sum();
    let g_old: f64 = previous.iter().map(|g| g.norm_squared()).sum();
    if g_old > 0.0 { g_new / g_old } else { 0.0 }
}
