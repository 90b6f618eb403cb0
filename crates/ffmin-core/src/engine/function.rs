use super::error::EngineError;
use crate::core::forcefield::interactions::InteractionLists;
use crate::core::forcefield::params::ParameterStore;
use crate::core::forcefield::registry::ForceField;
use crate::core::forcefield::terms::{EnabledTerms, PairMasks, TermContext, TermKind};
use crate::core::forcefield::trace::{TraceSink, Tracer, Verbosity};
use crate::core::models::groups::AtomGroups;
use crate::core::models::molecule::{Molecule, MoleculeError};
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::{Point3, Vector3};
use std::collections::HashSet;
use tracing::{debug, info};

/// What a call to [`ForceFieldFunction::compute`] refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Computation {
    /// The total energy only.
    Value,
    /// The total energy and the full force array.
    Gradients,
}

/// Finite-difference scheme for [`ForceFieldFunction::numerical_derivative`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifferenceScheme {
    #[default]
    Central,
    Forward,
}

impl DifferenceScheme {
    pub fn step(&self) -> f64 {
        match self {
            Self::Central => 1e-6,
            Self::Forward => 1e-4,
        }
    }
}

/// Energy of every term at one geometry, in kJ/mol. Disabled terms read zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnergyBreakdown {
    terms: [f64; 6],
    pub total: f64,
}

impl EnergyBreakdown {
    pub fn get(&self, kind: TermKind) -> f64 {
        self.terms[Self::slot(kind)]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermKind, f64)> + '_ {
        TermKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    fn set(&mut self, kind: TermKind, energy: f64) {
        self.terms[Self::slot(kind)] = energy;
    }

    fn slot(kind: TermKind) -> usize {
        TermKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default()
    }
}

/// The differentiable energy function a minimizer drives.
///
/// A `ForceFieldFunction` owns the working coordinates and the force array. It is
/// inert until [`setup`](Self::setup) succeeds; afterwards the interaction lists
/// stay fixed and only the coordinates change between computations. Any change of
/// topology, atom types or groups requires a new setup.
///
/// The force array follows the force convention: after
/// `compute(Computation::Gradients)` it holds `-dE/dr` for every atom.
#[derive(Debug)]
pub struct ForceFieldFunction {
    forcefield: Box<dyn ForceField>,
    params: ParameterStore,
    molecule: Option<Molecule>,
    groups: AtomGroups,
    lists: InteractionLists,
    labels: Vec<String>,
    positions: Vec<Point3<f64>>,
    gradients: Vec<Vector3<f64>>,
    value: f64,
    enabled: EnabledTerms,
    masks: PairMasks,
    cutoff: Option<f64>,
    tracer: Tracer,
}

impl ForceFieldFunction {
    pub fn new(forcefield: Box<dyn ForceField>, params: ParameterStore) -> Self {
        Self {
            forcefield,
            params,
            molecule: None,
            groups: AtomGroups::new(),
            lists: InteractionLists::default(),
            labels: Vec::new(),
            positions: Vec::new(),
            gradients: Vec::new(),
            value: 0.0,
            enabled: EnabledTerms::all(),
            masks: PairMasks::default(),
            cutoff: None,
            tracer: Tracer::default(),
        }
    }

    pub fn forcefield_name(&self) -> &str {
        self.forcefield.name()
    }

    /// Builds the interaction lists for `molecule` without group restrictions.
    pub fn setup(&mut self, molecule: &Molecule) -> Result<(), EngineError> {
        self.setup_with_groups(molecule, AtomGroups::new())
    }

    /// Builds the interaction lists for `molecule` under `groups`.
    ///
    /// Every list is rebuilt from scratch and the working coordinates are reset to
    /// the molecule's positions. On failure the function is left not set up.
    pub fn setup_with_groups(
        &mut self,
        molecule: &Molecule,
        groups: AtomGroups,
    ) -> Result<(), EngineError> {
        self.molecule = None;
        self.lists.clear();

        if let Some(index) = groups.max_index() {
            if index >= molecule.atom_count() {
                return Err(EngineError::AtomIndexOutOfRange {
                    index,
                    count: molecule.atom_count(),
                });
            }
        }

        self.lists = self
            .forcefield
            .setup(molecule, &self.params, &groups, &mut self.tracer)?;
        self.labels = molecule
            .atoms()
            .iter()
            .map(|atom| atom.force_field_type.clone())
            .collect();
        self.positions = molecule.positions().to_vec();
        self.gradients = vec![Vector3::zeros(); molecule.atom_count()];
        self.value = 0.0;
        self.groups = groups;
        self.molecule = Some(molecule.clone());
        self.update_pair_masks();

        info!(
            forcefield = self.forcefield.name(),
            atoms = molecule.atom_count(),
            interactions = self.lists.total_len(),
            "Energy function set up"
        );
        Ok(())
    }

    /// Builds the optional electrostatic pair list for the current setup.
    pub fn setup_electrostatics(&mut self) -> Result<(), EngineError> {
        let molecule = self.molecule.as_ref().ok_or(EngineError::NotSetUp)?;
        self.lists.electrostatics = self.forcefield.setup_electrostatics(
            molecule,
            &self.params,
            &self.groups,
            &mut self.tracer,
        );
        self.update_pair_masks();
        Ok(())
    }

    pub fn is_set_up(&self) -> bool {
        self.molecule.is_some()
    }

    pub fn molecule(&self) -> Option<&Molecule> {
        self.molecule.as_ref()
    }

    pub fn interactions(&self) -> &InteractionLists {
        &self.lists
    }

    pub fn atom_count(&self) -> usize {
        self.positions.len()
    }

    /// Sums every enabled term at the current coordinates and returns the total.
    pub fn compute(&mut self, computation: Computation) -> Result<f64, EngineError> {
        self.ensure_set_up()?;
        let enabled = self.enabled;
        let value = self.sum_terms(enabled, computation == Computation::Gradients);
        self.value = value;
        self.tracer.line_with(Verbosity::Medium, || {
            format!("\nTOTAL ENERGY = {:8.5} kJ/mol", value)
        });
        Ok(value)
    }

    /// Total energy of the last computation.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [Point3<f64>] {
        &mut self.positions
    }

    pub fn set_positions(&mut self, positions: &[Point3<f64>]) -> Result<(), EngineError> {
        if positions.len() != self.positions.len() {
            return Err(MoleculeError::PositionCountMismatch {
                expected: self.positions.len(),
                found: positions.len(),
            }
            .into());
        }
        self.positions.copy_from_slice(positions);
        Ok(())
    }

    /// Forces (`-dE/dr`) of the last gradient computation.
    pub fn gradients(&self) -> &[Vector3<f64>] {
        &self.gradients
    }

    /// Evaluates a single term regardless of whether it is enabled.
    ///
    /// With `gradients` set the force array is zeroed and then holds the forces of
    /// this term alone.
    pub fn term_energy(&mut self, kind: TermKind, gradients: bool) -> Result<f64, EngineError> {
        self.ensure_set_up()?;
        Ok(self.sum_terms(EnabledTerms::only(kind), gradients))
    }

    pub fn energy_breakdown(&mut self) -> Result<EnergyBreakdown, EngineError> {
        self.ensure_set_up()?;
        let enabled = self.enabled;
        let mut breakdown = EnergyBreakdown::default();
        for kind in enabled.iter() {
            let energy = self.sum_terms(EnabledTerms::only(kind), false);
            breakdown.set(kind, energy);
            breakdown.total += energy;
        }
        Ok(breakdown)
    }

    pub fn set_term_enabled(&mut self, kind: TermKind, enabled: bool) {
        self.enabled.set(kind, enabled);
    }

    pub fn set_all_terms_enabled(&mut self, enabled: bool) {
        self.enabled = if enabled {
            EnabledTerms::all()
        } else {
            EnabledTerms::none()
        };
    }

    pub fn set_enabled_terms(&mut self, enabled: EnabledTerms) {
        self.enabled = enabled;
    }

    pub fn enabled_terms(&self) -> EnabledTerms {
        self.enabled
    }

    pub fn is_term_enabled(&self, kind: TermKind) -> bool {
        self.enabled.is_enabled(kind)
    }

    /// Finite-difference force on one atom from the enabled terms, in the same
    /// convention as [`gradients`](Self::gradients). Coordinates and the stored
    /// total are restored afterwards and trace output is suppressed.
    pub fn numerical_derivative(
        &mut self,
        atom: usize,
        scheme: DifferenceScheme,
    ) -> Result<Vector3<f64>, EngineError> {
        self.ensure_set_up()?;
        if atom >= self.positions.len() {
            return Err(EngineError::AtomIndexOutOfRange {
                index: atom,
                count: self.positions.len(),
            });
        }

        let verbosity = self.tracer.verbosity();
        self.tracer.set_verbosity(Verbosity::None);
        let enabled = self.enabled;
        let origin = self.positions[atom];
        let h = scheme.step();
        let e0 = match scheme {
            DifferenceScheme::Forward => self.sum_terms(enabled, false),
            DifferenceScheme::Central => 0.0,
        };

        let mut force = Vector3::zeros();
        for axis in 0..3 {
            self.positions[atom][axis] = origin[axis] + h;
            let e_plus = self.sum_terms(enabled, false);
            force[axis] = match scheme {
                DifferenceScheme::Central => {
                    self.positions[atom][axis] = origin[axis] - h;
                    let e_minus = self.sum_terms(enabled, false);
                    -(e_plus - e_minus) / (2.0 * h)
                }
                DifferenceScheme::Forward => -(e_plus - e0) / h,
            };
            self.positions[atom] = origin;
        }

        self.tracer.set_verbosity(verbosity);
        Ok(force)
    }

    pub fn cutoff(&self) -> Option<f64> {
        self.cutoff
    }

    /// Sets the non-bonded cutoff radius and refreshes the pair masks.
    pub fn set_cutoff(&mut self, cutoff: Option<f64>) {
        self.cutoff = cutoff;
        self.update_pair_masks();
    }

    /// Recomputes which van der Waals and electrostatic records lie within the
    /// cutoff at the current coordinates. Without a cutoff every record is included.
    pub fn update_pair_masks(&mut self) {
        let Some(cutoff) = self.cutoff else {
            self.masks = PairMasks::default();
            return;
        };
        if self.positions.is_empty() {
            self.masks = PairMasks::default();
            return;
        }

        let points: Vec<[f64; 3]> = self.positions.iter().map(|p| [p.x, p.y, p.z]).collect();
        let kdtree: KdTree<f64, 3> = (&points).into();
        let radius_sq = cutoff * cutoff;
        let neighbors: Vec<HashSet<usize>> = points
            .iter()
            .map(|point| {
                kdtree
                    .within_unsorted::<SquaredEuclidean>(point, radius_sq)
                    .into_iter()
                    .map(|neighbour| neighbour.item as usize)
                    .collect()
            })
            .collect();
        let within = |[a, b]: [usize; 2]| neighbors[a].contains(&b);

        let vdw: Vec<bool> = self.lists.vdw.iter().map(|r| within(r.atoms)).collect();
        let electrostatics: Vec<bool> = self
            .lists
            .electrostatics
            .iter()
            .map(|r| within(r.atoms))
            .collect();
        debug!(
            cutoff,
            vdw_included = vdw.iter().filter(|bit| **bit).count(),
            electrostatics_included = electrostatics.iter().filter(|bit| **bit).count(),
            "Pair masks updated"
        );
        self.masks = PairMasks {
            vdw: Some(vdw),
            electrostatics: Some(electrostatics),
        };
    }

    pub fn pair_masks(&self) -> &PairMasks {
        &self.masks
    }

    pub fn verbosity(&self) -> Verbosity {
        self.tracer.verbosity()
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.tracer.set_verbosity(verbosity);
    }

    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer.set_sink(sink);
    }

    /// Writes a line to the trace sink when `level` is enabled.
    pub fn trace_with<F: FnOnce() -> String>(&mut self, level: Verbosity, build: F) {
        self.tracer.line_with(level, build);
    }

    fn ensure_set_up(&self) -> Result<(), EngineError> {
        if self.is_set_up() {
            Ok(())
        } else {
            Err(EngineError::NotSetUp)
        }
    }

    fn sum_terms(&mut self, enabled: EnabledTerms, with_gradients: bool) -> f64 {
        if with_gradients {
            self.gradients.fill(Vector3::zeros());
        }
        let mut total = 0.0;
        for kind in enabled.iter() {
            let mut ctx = TermContext {
                positions: &self.positions,
                gradients: if with_gradients {
                    Some(self.gradients.as_mut_slice())
                } else {
                    None
                },
                labels: &self.labels,
                masks: &self.masks,
                tracer: &mut self.tracer,
            };
            total += self.forcefield.evaluate(kind, &self.lists, &mut ctx);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::registry::UffForceField;
    use crate::core::forcefield::trace::BufferSink;
    use crate::core::models::molecule::MoleculeBuilder;
    use crate::core::models::topology::BondOrder;
    use crate::engine::fixtures::{carbon_pair, distorted_ethane, function_for, relaxed_water};
    use nalgebra::{Rotation3, Translation3};

    fn new_function() -> ForceFieldFunction {
        ForceFieldFunction::new(Box::new(UffForceField), ParameterStore::builtin())
    }

    #[test]
    fn compute_before_setup_is_refused() {
        let mut function = new_function();
        assert!(matches!(
            function.compute(Computation::Value),
            Err(EngineError::NotSetUp)
        ));
        assert!(matches!(
            function.setup_electrostatics(),
            Err(EngineError::NotSetUp)
        ));
        assert!(!function.is_set_up());
    }

    #[test]
    fn failed_setup_leaves_function_unusable() {
        let molecule = MoleculeBuilder::new()
            .atom(6, "C_3", [0.0, 0.0, 0.0])
            .atom(0, "Xx_9", [1.5, 0.0, 0.0])
            .bond(0, 1, BondOrder::Single)
            .build()
            .unwrap();
        let mut function = function_for(&distorted_ethane());
        assert!(matches!(
            function.setup(&molecule),
            Err(EngineError::Setup { .. })
        ));
        assert!(!function.is_set_up());
        assert!(function.compute(Computation::Value).is_err());
    }

    #[test]
    fn setup_twice_produces_identical_lists() {
        let molecule = distorted_ethane();
        let mut function = function_for(&molecule);
        function.setup_electrostatics().unwrap();
        let first = function.interactions().clone();

        function.setup(&molecule).unwrap();
        function.setup_electrostatics().unwrap();
        assert_eq!(function.interactions(), &first);
    }

    #[test]
    fn group_index_beyond_molecule_is_rejected() {
        let mut function = new_function();
        let mut groups = AtomGroups::new();
        groups.add_intra_group([0, 42]);
        assert!(matches!(
            function.setup_with_groups(&distorted_ethane(), groups),
            Err(EngineError::AtomIndexOutOfRange { index: 42, count: 8 })
        ));
    }

    #[test]
    fn value_and_gradient_modes_agree_on_energy() {
        let mut function = function_for(&distorted_ethane());
        let value = function.compute(Computation::Value).unwrap();
        let with_gradients = function.compute(Computation::Gradients).unwrap();
        assert!((value - with_gradients).abs() < 1e-12);
        assert!(function.gradients().iter().any(|g| g.norm() > 1e-6));
    }

    #[test]
    fn gradients_are_zeroed_before_each_refill() {
        let mut function = function_for(&distorted_ethane());
        function.compute(Computation::Gradients).unwrap();
        let first: Vec<_> = function.gradients().to_vec();
        function.compute(Computation::Gradients).unwrap();
        for (a, b) in first.iter().zip(function.gradients()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn bond_gradient_matches_central_difference_within_one_percent() {
        let mut function = function_for(&carbon_pair(1.75));
        function.compute(Computation::Gradients).unwrap();
        for atom in 0..2 {
            let analytic = function.gradients()[atom];
            let numeric = function
                .numerical_derivative(atom, DifferenceScheme::Central)
                .unwrap();
            assert!((analytic.x - numeric.x).abs() <= 0.01 * numeric.x.abs());
            assert!(numeric.x.abs() > 1.0);
        }
    }

    #[test]
    fn total_gradient_matches_numerical_derivative() {
        let mut function = function_for(&distorted_ethane());
        function.setup_electrostatics().unwrap();
        function.compute(Computation::Gradients).unwrap();
        let analytic: Vec<_> = function.gradients().to_vec();
        for (atom, expected) in analytic.iter().enumerate() {
            let numeric = function
                .numerical_derivative(atom, DifferenceScheme::Central)
                .unwrap();
            assert!((expected - numeric).norm() < 1e-3 * expected.norm().max(1.0));
        }
    }

    #[test]
    fn forward_difference_is_close_to_central() {
        let mut function = function_for(&distorted_ethane());
        let central = function
            .numerical_derivative(2, DifferenceScheme::Central)
            .unwrap();
        let forward = function
            .numerical_derivative(2, DifferenceScheme::Forward)
            .unwrap();
        assert!((central - forward).norm() < 0.05 * central.norm().max(1.0));
    }

    #[test]
    fn numerical_derivative_restores_coordinates() {
        let molecule = distorted_ethane();
        let mut function = function_for(&molecule);
        let before = function.compute(Computation::Value).unwrap();
        function
            .numerical_derivative(0, DifferenceScheme::Central)
            .unwrap();
        assert_eq!(function.positions(), molecule.positions());
        assert_eq!(function.value(), before);
        assert!(matches!(
            function.numerical_derivative(8, DifferenceScheme::Central),
            Err(EngineError::AtomIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn disabled_terms_contribute_nothing() {
        let mut function = function_for(&distorted_ethane());
        let total = function.compute(Computation::Value).unwrap();
        let breakdown = function.energy_breakdown().unwrap();
        assert!((breakdown.total - total).abs() < 1e-9);

        function.set_term_enabled(TermKind::Bond, false);
        assert!(!function.is_term_enabled(TermKind::Bond));
        let without_bonds = function.compute(Computation::Value).unwrap();
        assert!((total - without_bonds - breakdown.get(TermKind::Bond)).abs() < 1e-9);
        assert_eq!(function.energy_breakdown().unwrap().get(TermKind::Bond), 0.0);

        function.set_all_terms_enabled(false);
        assert_eq!(function.compute(Computation::Gradients).unwrap(), 0.0);
        assert!(function.gradients().iter().all(|g| g.norm() == 0.0));
    }

    #[test]
    fn term_energy_ignores_enablement() {
        let mut function = function_for(&distorted_ethane());
        let breakdown = function.energy_breakdown().unwrap();
        function.set_all_terms_enabled(false);
        let angle = function.term_energy(TermKind::Angle, true).unwrap();
        assert!((angle - breakdown.get(TermKind::Angle)).abs() < 1e-12);
        assert!(function.gradients().iter().any(|g| g.norm() > 0.0));
    }

    #[test]
    fn total_energy_is_invariant_under_rigid_motion() {
        let molecule = distorted_ethane();
        let mut function = function_for(&molecule);
        function.setup_electrostatics().unwrap();
        let reference = function.compute(Computation::Value).unwrap();

        let rotation = Rotation3::from_euler_angles(0.4, -1.1, 2.3);
        let translation = Translation3::new(3.0, -7.5, 0.25);
        let moved: Vec<_> = molecule
            .positions()
            .iter()
            .map(|p| translation * (rotation * *p))
            .collect();
        function.set_positions(&moved).unwrap();
        let energy = function.compute(Computation::Value).unwrap();
        assert!((energy - reference).abs() < 1e-8 * reference.abs().max(1.0));
    }

    #[test]
    fn set_positions_rejects_wrong_length() {
        let mut function = function_for(&distorted_ethane());
        assert!(matches!(
            function.set_positions(&[Point3::origin()]),
            Err(EngineError::Molecule { .. })
        ));
    }

    #[test]
    fn cutoff_masks_exclude_distant_pairs() {
        let molecule = distorted_ethane();
        let mut function = function_for(&molecule);
        let full = function.compute(Computation::Value).unwrap();
        assert_eq!(function.pair_masks(), &PairMasks::default());

        function.set_cutoff(Some(0.5));
        let masks = function.pair_masks().clone();
        assert!(masks.vdw.as_ref().unwrap().iter().all(|bit| !bit));
        let clipped = function.compute(Computation::Value).unwrap();
        let vdw = function
            .energy_breakdown()
            .map(|b| b.get(TermKind::VanDerWaals))
            .unwrap();
        assert_eq!(vdw, 0.0);
        assert!(clipped != full);

        function.set_cutoff(Some(100.0));
        assert!(function.pair_masks().vdw.as_ref().unwrap().iter().all(|bit| *bit));
        let restored = function.compute(Computation::Value).unwrap();
        assert!((restored - full).abs() < 1e-12);

        function.set_cutoff(None);
        assert_eq!(function.pair_masks(), &PairMasks::default());
    }

    #[test]
    fn electrostatics_join_the_total_once_set_up() {
        let mut function = function_for(&distorted_ethane());
        let without = function.compute(Computation::Value).unwrap();
        function.setup_electrostatics().unwrap();
        assert!(!function.interactions().electrostatics.is_empty());
        let with = function.compute(Computation::Value).unwrap();
        let breakdown = function.energy_breakdown().unwrap();
        assert!((with - without - breakdown.get(TermKind::Electrostatic)).abs() < 1e-9);
    }

    #[test]
    fn relaxed_water_is_a_stationary_point() {
        let mut function = function_for(&relaxed_water());
        let energy = function.compute(Computation::Gradients).unwrap();
        assert!(energy.abs() < 1e-9);
        assert!(function.gradients().iter().all(|g| g.norm() < 1e-6));
    }

    #[test]
    fn medium_verbosity_reports_term_totals() {
        let sink = BufferSink::new();
        let mut function = function_for(&distorted_ethane());
        function.set_trace_sink(Box::new(sink.clone()));
        function.set_verbosity(Verbosity::Medium);
        function.compute(Computation::Value).unwrap();

        let contents = sink.contents();
        assert!(contents.contains("TOTAL BOND STRETCHING ENERGY"));
        assert!(contents.contains("TOTAL ENERGY ="));
        assert!(!contents.contains("B O N D   S T R E T C H I N G"));
    }
}
