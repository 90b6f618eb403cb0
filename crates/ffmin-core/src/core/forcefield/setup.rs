use super::constants::{
    ANGLE_FORCE_PREFACTOR, BARRIER_EPSILON, BOND_FORCE_PREFACTOR, BOND_ORDER_CORRECTION,
    COULOMB_CONSTANT, DEG_TO_RAD, KCAL_TO_KJ,
};
use super::interactions::{
    AngleInteraction, BondInteraction, ElectrostaticInteraction, InteractionLists,
    OopInteraction, TorsionInteraction, VdwInteraction,
};
use super::params::{ParameterError, ParameterStore, UffParam};
use super::trace::{Tracer, Verbosity};
use crate::core::models::groups::AtomGroups;
use crate::core::models::molecule::Molecule;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum SetupError {
    #[error("Parameter lookup failed: {0}")]
    Parameter(#[from] ParameterError),
    #[error("Atoms {0} and {1} are not bonded but are part of an angle or torsion")]
    MissingBond(usize, usize),
    #[error("Atom index {0} is out of range")]
    AtomIndexOutOfRange(usize),
}

/// Natural bond length `r0 = ri + rj + rbo - ren` for an effective bond order.
pub fn natural_bond_length(pi: &UffParam, pj: &UffParam, order: f64) -> f64 {
    let (ri, rj) = (pi.r1, pj.r1);
    let (chi_i, chi_j) = (pi.xi, pj.xi);
    let rbo = -BOND_ORDER_CORRECTION * (ri + rj) * order.ln();
    let ren = ri * rj * (chi_i.sqrt() - chi_j.sqrt()).powi(2) / (chi_i * ri + chi_j * rj);
    ri + rj + rbo - ren
}

fn is_group16(atomic_number: u8) -> bool {
    matches!(atomic_number, 8 | 16 | 34 | 52 | 84)
}

struct Builder<'a> {
    molecule: &'a Molecule,
    params: &'a ParameterStore,
    groups: &'a AtomGroups,
}

impl<'a> Builder<'a> {
    fn param(&self, atom: usize) -> Result<&'a UffParam, SetupError> {
        let atom = self
            .molecule
            .atom(atom)
            .ok_or(SetupError::AtomIndexOutOfRange(atom))?;
        Ok(self.params.get(&atom.force_field_type)?)
    }

    fn atomic_number(&self, atom: usize) -> Result<u8, SetupError> {
        self.molecule
            .atom(atom)
            .map(|a| a.atomic_number)
            .ok_or(SetupError::AtomIndexOutOfRange(atom))
    }

    fn type_label(&self, atom: usize) -> &str {
        self.molecule
            .atom(atom)
            .map(|a| a.force_field_type.as_str())
            .unwrap_or_default()
    }

    fn effective_order(&self, a: usize, b: usize) -> Result<f64, SetupError> {
        self.molecule
            .bond_between(a, b)
            .map(|bond| bond.effective_order())
            .ok_or(SetupError::MissingBond(a, b))
    }

    fn bonds(&self) -> Result<Vec<BondInteraction>, SetupError> {
        let mut bonds = Vec::with_capacity(self.molecule.bonds().len());
        for bond in self.molecule.bonds() {
            let atoms = [bond.atom1, bond.atom2];
            if !self.groups.allows_bonded(&atoms) {
                continue;
            }
            let (pa, pb) = (self.param(atoms[0])?, self.param(atoms[1])?);
            let order = bond.effective_order();
            let r0 = natural_bond_length(pa, pb, order);
            let kb = 0.5 * KCAL_TO_KJ * BOND_FORCE_PREFACTOR * pa.z1 * pb.z1 / (r0 * r0 * r0);
            bonds.push(BondInteraction {
                atoms,
                order,
                r0,
                kb,
            });
        }
        Ok(bonds)
    }

    fn angles(&self) -> Result<Vec<AngleInteraction>, SetupError> {
        let mut angles = Vec::new();
        for atoms in self.molecule.angles() {
            if !self.groups.allows_bonded(&atoms) {
                continue;
            }
            let [a, b, c] = atoms;
            let (pa, pb, pc) = (self.param(a)?, self.param(b)?, self.param(c)?);

            let theta0 = pb.theta0;
            let cos_t0 = (theta0 * DEG_TO_RAD).cos();
            let sin_t0 = (theta0 * DEG_TO_RAD).sin();
            let c2 = 1.0 / (4.0 * sin_t0 * sin_t0);
            let c1 = -4.0 * c2 * cos_t0;
            let c0 = c2 * (2.0 * cos_t0 * cos_t0 + 1.0);

            let rab = natural_bond_length(pa, pb, self.effective_order(a, b)?);
            let rbc = natural_bond_length(pb, pc, self.effective_order(b, c)?);
            let rac = (rab * rab + rbc * rbc - 2.0 * rab * rbc * cos_t0).sqrt();
            let ka = ANGLE_FORCE_PREFACTOR * KCAL_TO_KJ * (pa.z1 * pc.z1 / rac.powi(5))
                * (3.0 * rab * rbc * (1.0 - cos_t0 * cos_t0) - rac * rac * cos_t0);

            angles.push(AngleInteraction {
                atoms,
                coordination: pb.coordination,
                theta0,
                ka,
                c0,
                c1,
                c2,
            });
        }
        Ok(angles)
    }

    fn torsions(&self) -> Result<Vec<TorsionInteraction>, SetupError> {
        let mut torsions = Vec::new();
        for atoms in self.molecule.torsions() {
            if !self.groups.allows_bonded(&atoms) {
                continue;
            }
            let [_, b, c, _] = atoms;
            let (pb, pc) = (self.param(b)?, self.param(c)?);
            let (zb, zc) = (self.atomic_number(b)?, self.atomic_number(c)?);
            let order = self.effective_order(b, c)?;

            let (v, n, phi0) = match (pb.coordination, pc.coordination) {
                (3, 3) => {
                    let (mut n, mut phi0) = (3.0, 60.0);
                    let mut vi = pb.vi;
                    let mut vj = pc.vi;
                    if let Some(v) = sp3_group16_barrier(zb) {
                        (vi, n, phi0) = (v, 2.0, 90.0);
                    }
                    if let Some(v) = sp3_group16_barrier(zc) {
                        (vj, n, phi0) = (v, 2.0, 90.0);
                    }
                    (0.5 * KCAL_TO_KJ * (vi * vj).sqrt(), n, phi0)
                }
                (2, 2) => (
                    0.5 * KCAL_TO_KJ * 5.0 * (pb.uj * pc.uj).sqrt() * (1.0 + 4.18 * order.ln()),
                    2.0,
                    180.0,
                ),
                (2, 3) | (3, 2) => {
                    let sp3_atom = if pb.coordination == 3 { zb } else { zc };
                    if is_group16(sp3_atom) {
                        (0.5 * KCAL_TO_KJ, 2.0, 90.0)
                    } else {
                        (0.5 * KCAL_TO_KJ, 6.0, 0.0)
                    }
                }
                _ => (0.0, 0.0, 0.0),
            };

            if v.abs() < BARRIER_EPSILON {
                continue;
            }
            torsions.push(TorsionInteraction {
                atoms,
                v,
                n,
                phi0,
                cos_n_phi0: (n * phi0 * DEG_TO_RAD).cos(),
            });
        }
        Ok(torsions)
    }

    fn oops(&self) -> Result<Vec<OopInteraction>, SetupError> {
        let mut oops = Vec::new();
        for center in 0..self.molecule.atom_count() {
            if !matches!(self.atomic_number(center)?, 6 | 7 | 8 | 15 | 33 | 51 | 83) {
                continue;
            }
            let label = self.type_label(center);
            let neighbors = self.molecule.neighbors(center);
            let &[a, c, d] = neighbors else {
                continue;
            };
            if !self.groups.allows_bonded(&[a, center, c, d]) {
                continue;
            }

            let (c_terms, koop) = if ["N_3", "N_2", "N_R", "O_2", "O_R"]
                .iter()
                .any(|prefix| label.starts_with(prefix))
            {
                ([1.0, -1.0, 0.0], 6.0 * KCAL_TO_KJ)
            } else if let Some(phi) = pnictogen_inversion_angle(label) {
                let phi = phi * DEG_TO_RAD;
                let c1 = -4.0 * phi.cos();
                let c2 = 1.0;
                let c0 = -c1 * phi.cos() + c2 * (2.0 * phi).cos();
                ([c0, c1, c2], 22.0 * KCAL_TO_KJ)
            } else if label.starts_with("C_2") || label.starts_with("C_R") {
                let bonded_to_carbonyl_oxygen = neighbors
                    .iter()
                    .any(|&n| self.type_label(n).starts_with("O_2"));
                let k = if bonded_to_carbonyl_oxygen { 50.0 } else { 6.0 };
                ([1.0, -1.0, 0.0], k * KCAL_TO_KJ)
            } else {
                continue;
            };

            let koop = koop / 3.0;
            for atoms in [[a, center, c, d], [d, center, c, a], [a, center, d, c]] {
                oops.push(OopInteraction {
                    atoms,
                    koop,
                    c0: c_terms[0],
                    c1: c_terms[1],
                    c2: c_terms[2],
                });
            }
        }
        Ok(oops)
    }

    fn non_bonded_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let count = self.molecule.atom_count();
        (0..count)
            .flat_map(move |i| ((i + 1)..count).map(move |j| (i, j)))
            .filter(move |&(i, j)| {
                self.groups.allows_pair(i, j)
                    && !self.molecule.is_bonded(i, j)
                    && !self.molecule.is_one_three(i, j)
            })
    }

    fn vdw(&self) -> Result<Vec<VdwInteraction>, SetupError> {
        let mut vdw = Vec::new();
        for (i, j) in self.non_bonded_pairs() {
            let (pi, pj) = (self.param(i)?, self.param(j)?);
            vdw.push(VdwInteraction {
                atoms: [i, j],
                kab: KCAL_TO_KJ * (pi.d1 * pj.d1).sqrt(),
                xij: (pi.x1 * pj.x1).sqrt(),
            });
        }
        Ok(vdw)
    }

    fn electrostatics(&self) -> Vec<ElectrostaticInteraction> {
        let atoms = self.molecule.atoms();
        self.non_bonded_pairs()
            .filter_map(|(i, j)| {
                let qq = KCAL_TO_KJ
                    * COULOMB_CONSTANT
                    * atoms[i].partial_charge
                    * atoms[j].partial_charge;
                (qq != 0.0).then_some(ElectrostaticInteraction { atoms: [i, j], qq })
            })
            .collect()
    }
}

fn sp3_group16_barrier(atomic_number: u8) -> Option<f64> {
    match atomic_number {
        8 => Some(2.0),
        16 | 34 | 52 | 84 => Some(6.8),
        _ => None,
    }
}

fn pnictogen_inversion_angle(label: &str) -> Option<f64> {
    [
        ("P_3+3", 84.4339),
        ("As3+3", 86.9735),
        ("Sb3+3", 87.7047),
        ("Bi3+3", 90.0),
    ]
    .iter()
    .find(|(prefix, _)| label.starts_with(prefix))
    .map(|&(_, phi)| phi)
}

/// Builds the bonded and van der Waals interaction lists from scratch.
///
/// The electrostatic list is always returned empty; it is populated separately by
/// [`build_electrostatics`].
pub fn build_interactions(
    molecule: &Molecule,
    params: &ParameterStore,
    groups: &AtomGroups,
    tracer: &mut Tracer,
) -> Result<InteractionLists, SetupError> {
    let builder = Builder {
        molecule,
        params,
        groups,
    };

    tracer.line(Verbosity::Low, "SETTING UP BOND CALCULATIONS...");
    let bonds = builder.bonds()?;
    tracer.line(Verbosity::Low, "SETTING UP ANGLE CALCULATIONS...");
    let angles = builder.angles()?;
    tracer.line(Verbosity::Low, "SETTING UP TORSION CALCULATIONS...");
    let torsions = builder.torsions()?;
    tracer.line(Verbosity::Low, "SETTING UP OOP CALCULATIONS...");
    let oops = builder.oops()?;
    tracer.line(Verbosity::Low, "SETTING UP VAN DER WAALS CALCULATIONS...");
    let vdw = builder.vdw()?;

    debug!(
        bonds = bonds.len(),
        angles = angles.len(),
        torsions = torsions.len(),
        oops = oops.len(),
        vdw = vdw.len(),
        "Interaction lists built"
    );

    Ok(InteractionLists {
        bonds,
        angles,
        torsions,
        oops,
        vdw,
        electrostatics: Vec::new(),
    })
}

/// Builds the electrostatic pair list under the same exclusion and group policy
/// as the van der Waals list. Pairs whose charge product is zero are omitted.
pub fn build_electrostatics(
    molecule: &Molecule,
    params: &ParameterStore,
    groups: &AtomGroups,
    tracer: &mut Tracer,
) -> Vec<ElectrostaticInteraction> {
    tracer.line(Verbosity::Low, "SETTING UP ELECTROSTATIC CALCULATIONS...");
    let builder = Builder {
        molecule,
        params,
        groups,
    };
    let electrostatics = builder.electrostatics();
    debug!(pairs = electrostatics.len(), "Electrostatic list built");
    electrostatics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::trace::BufferSink;
    use crate::core::models::atom::Atom;
    use crate::core::models::molecule::MoleculeBuilder;
    use crate::core::models::topology::{Bond, BondOrder};
    use nalgebra::Point3;
    use std::collections::HashSet;

    fn ethane() -> Molecule {
        MoleculeBuilder::new()
            .atom(6, "C_3", [0.0, 0.0, 0.0])
            .atom(6, "C_3", [1.53, 0.0, 0.0])
            .atom(1, "H_", [-0.36, 1.03, 0.0])
            .atom(1, "H_", [-0.36, -0.51, 0.89])
            .atom(1, "H_", [-0.36, -0.51, -0.89])
            .atom(1, "H_", [1.89, -1.03, 0.0])
            .atom(1, "H_", [1.89, 0.51, 0.89])
            .atom(1, "H_", [1.89, 0.51, -0.89])
            .bond(0, 1, BondOrder::Single)
            .bond(0, 2, BondOrder::Single)
            .bond(0, 3, BondOrder::Single)
            .bond(0, 4, BondOrder::Single)
            .bond(1, 5, BondOrder::Single)
            .bond(1, 6, BondOrder::Single)
            .bond(1, 7, BondOrder::Single)
            .build()
            .unwrap()
    }

    fn formaldehyde() -> Molecule {
        MoleculeBuilder::new()
            .atom(6, "C_2", [0.0, 0.0, 0.0])
            .atom(8, "O_2", [1.2, 0.0, 0.0])
            .atom(1, "H_", [-0.55, 0.94, 0.0])
            .atom(1, "H_", [-0.55, -0.94, 0.0])
            .bond(0, 1, BondOrder::Double)
            .bond(0, 2, BondOrder::Single)
            .bond(0, 3, BondOrder::Single)
            .build()
            .unwrap()
    }

    fn build(molecule: &Molecule) -> InteractionLists {
        build_interactions(
            molecule,
            &ParameterStore::builtin(),
            &AtomGroups::new(),
            &mut Tracer::default(),
        )
        .unwrap()
    }

    #[test]
    fn natural_bond_length_of_carbon_single_bond() {
        let store = ParameterStore::builtin();
        let c = store.get("C_3").unwrap();
        let r0 = natural_bond_length(c, c, 1.0);
        assert!((r0 - 1.514).abs() < 1e-9);
        assert!(natural_bond_length(c, c, 2.0) < r0);
    }

    #[test]
    fn ethane_lists_have_expected_sizes() {
        let lists = build(&ethane());
        assert_eq!(lists.bonds.len(), 7);
        assert_eq!(lists.angles.len(), 12);
        assert_eq!(lists.torsions.len(), 9);
        assert!(lists.oops.is_empty());
        assert_eq!(lists.vdw.len(), 9);
        assert!(lists.electrostatics.is_empty());
    }

    #[test]
    fn sp3_sp3_torsion_uses_threefold_barrier() {
        let lists = build(&ethane());
        let store = ParameterStore::builtin();
        let vi = store.get("C_3").unwrap().vi;
        for torsion in &lists.torsions {
            assert_eq!(torsion.n, 3.0);
            assert_eq!(torsion.phi0, 60.0);
            assert!((torsion.v - 0.5 * KCAL_TO_KJ * vi).abs() < 1e-12);
            assert!((torsion.cos_n_phi0 + 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn bond_force_constant_includes_half_prefactor() {
        let lists = build(&ethane());
        let store = ParameterStore::builtin();
        let (c, h) = (store.get("C_3").unwrap(), store.get("H_").unwrap());
        let ch = lists.bonds.iter().find(|b| b.atoms == [0, 2]).unwrap();
        let r0 = natural_bond_length(c, h, 1.0);
        assert!((ch.r0 - r0).abs() < 1e-12);
        let kb = 0.5 * KCAL_TO_KJ * 664.12 * c.z1 * h.z1 / r0.powi(3);
        assert!((ch.kb - kb).abs() < 1e-9);
    }

    #[test]
    fn angle_records_carry_central_coordination() {
        let lists = build(&formaldehyde());
        assert_eq!(lists.angles.len(), 3);
        for angle in &lists.angles {
            assert_eq!(angle.atoms[1], 0);
            assert_eq!(angle.coordination, 2);
            assert!(angle.ka > 0.0);
        }
    }

    #[test]
    fn carbonyl_carbon_gets_three_stiff_oop_records() {
        let lists = build(&formaldehyde());
        assert_eq!(lists.oops.len(), 3);
        let expected: HashSet<[usize; 4]> =
            [[1, 0, 2, 3], [3, 0, 2, 1], [1, 0, 3, 2]].into_iter().collect();
        let found: HashSet<[usize; 4]> = lists.oops.iter().map(|o| o.atoms).collect();
        assert_eq!(found, expected);
        for oop in &lists.oops {
            assert!((oop.koop - 50.0 * KCAL_TO_KJ / 3.0).abs() < 1e-12);
            assert_eq!([oop.c0, oop.c1, oop.c2], [1.0, -1.0, 0.0]);
        }
    }

    #[test]
    fn phosphine_inversion_uses_angle_dependent_coefficients() {
        let molecule = MoleculeBuilder::new()
            .atom(15, "P_3+3", [0.0, 0.0, 0.0])
            .atom(1, "H_", [1.4, 0.0, -0.2])
            .atom(1, "H_", [-0.7, 1.2, -0.2])
            .atom(1, "H_", [-0.7, -1.2, -0.2])
            .bond(0, 1, BondOrder::Single)
            .bond(0, 2, BondOrder::Single)
            .bond(0, 3, BondOrder::Single)
            .build()
            .unwrap();
        let lists = build(&molecule);
        assert_eq!(lists.oops.len(), 3);
        let phi = 84.4339 * DEG_TO_RAD;
        let oop = &lists.oops[0];
        assert!((oop.c1 + 4.0 * phi.cos()).abs() < 1e-12);
        assert_eq!(oop.c2, 1.0);
        assert!((oop.koop - 22.0 * KCAL_TO_KJ / 3.0).abs() < 1e-12);
    }

    #[test]
    fn centers_without_three_neighbors_have_no_oop() {
        let molecule = MoleculeBuilder::new()
            .atom(6, "C_2", [0.0, 0.0, 0.0])
            .atom(6, "C_2", [1.34, 0.0, 0.0])
            .bond(0, 1, BondOrder::Double)
            .build()
            .unwrap();
        assert!(build(&molecule).oops.is_empty());
    }

    #[test]
    fn hydroxyl_torsion_uses_group16_override() {
        let molecule = MoleculeBuilder::new()
            .atom(1, "H_", [-0.4, 1.0, 0.0])
            .atom(6, "C_3", [0.0, 0.0, 0.0])
            .atom(8, "O_3", [1.43, 0.0, 0.0])
            .atom(1, "H_", [1.75, 0.9, 0.0])
            .bond(0, 1, BondOrder::Single)
            .bond(1, 2, BondOrder::Single)
            .bond(2, 3, BondOrder::Single)
            .build()
            .unwrap();
        let lists = build(&molecule);
        assert_eq!(lists.torsions.len(), 1);
        let torsion = &lists.torsions[0];
        assert_eq!(torsion.n, 2.0);
        assert_eq!(torsion.phi0, 90.0);
        let vi = ParameterStore::builtin().get("C_3").unwrap().vi;
        assert!((torsion.v - 0.5 * KCAL_TO_KJ * (vi * 2.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn sp2_sp3_torsion_is_sixfold() {
        let molecule = MoleculeBuilder::new()
            .atom(1, "H_", [-0.5, 0.9, 0.0])
            .atom(6, "C_2", [0.0, 0.0, 0.0])
            .atom(6, "C_3", [1.5, 0.0, 0.0])
            .atom(1, "H_", [1.9, 1.0, 0.0])
            .bond(0, 1, BondOrder::Single)
            .bond(1, 2, BondOrder::Single)
            .bond(2, 3, BondOrder::Single)
            .build()
            .unwrap();
        let torsion = &build(&molecule).torsions[0];
        assert_eq!(torsion.n, 6.0);
        assert_eq!(torsion.phi0, 0.0);
        assert!((torsion.v - 0.5 * KCAL_TO_KJ).abs() < 1e-12);
    }

    #[test]
    fn zero_barrier_torsions_are_dropped() {
        let molecule = MoleculeBuilder::new()
            .atom(1, "H_", [-0.5, 0.9, 0.0])
            .atom(6, "C_1", [0.0, 0.0, 0.0])
            .atom(6, "C_1", [1.2, 0.0, 0.0])
            .atom(1, "H_", [1.7, 0.9, 0.0])
            .bond(0, 1, BondOrder::Single)
            .bond(1, 2, BondOrder::Triple)
            .bond(2, 3, BondOrder::Single)
            .build()
            .unwrap();
        assert!(build(&molecule).torsions.is_empty());
    }

    #[test]
    fn aromatic_sp2_torsion_uses_effective_order() {
        let mut molecule = MoleculeBuilder::new()
            .atom(1, "H_", [-0.5, 0.9, 0.0])
            .atom(6, "C_R", [0.0, 0.0, 0.0])
            .atom(6, "C_R", [1.4, 0.0, 0.0])
            .atom(1, "H_", [1.9, 0.9, 0.0])
            .bond(0, 1, BondOrder::Single)
            .bond(2, 3, BondOrder::Single)
            .build()
            .unwrap();
        molecule
            .add_bond(Bond::new(1, 2, BondOrder::Aromatic))
            .unwrap();
        let torsion = &build(&molecule).torsions[0];
        let expected = 0.5 * KCAL_TO_KJ * 5.0 * 2.0 * (1.0 + 4.18 * 1.5_f64.ln());
        assert!((torsion.v - expected).abs() < 1e-9);
        assert_eq!(torsion.n, 2.0);
        assert_eq!(torsion.phi0, 180.0);
    }

    #[test]
    fn non_bonded_lists_exclude_one_two_and_one_three_pairs() {
        let molecule = ethane();
        let lists = build(&molecule);
        for pair in &lists.vdw {
            let [i, j] = pair.atoms;
            assert!(!molecule.is_bonded(i, j));
            assert!(!molecule.is_one_three(i, j));
        }
    }

    #[test]
    fn setup_is_idempotent() {
        let molecule = ethane();
        assert_eq!(build(&molecule), build(&molecule));
    }

    #[test]
    fn missing_parameter_is_reported() {
        let molecule = MoleculeBuilder::new()
            .atom(6, "C_3", [0.0, 0.0, 0.0])
            .atom(99, "Zz_9", [1.5, 0.0, 0.0])
            .bond(0, 1, BondOrder::Single)
            .build()
            .unwrap();
        let result = build_interactions(
            &molecule,
            &ParameterStore::builtin(),
            &AtomGroups::new(),
            &mut Tracer::default(),
        );
        assert_eq!(
            result,
            Err(SetupError::Parameter(ParameterError::MissingParameter {
                atom_type: "Zz_9".to_string()
            }))
        );
    }

    #[test]
    fn intra_groups_restrict_bonded_records() {
        let molecule = ethane();
        let mut groups = AtomGroups::new();
        groups.add_intra_group([0, 2, 3, 4]);
        let lists = build_interactions(
            &molecule,
            &ParameterStore::builtin(),
            &groups,
            &mut Tracer::default(),
        )
        .unwrap();
        assert_eq!(lists.bonds.len(), 3);
        assert_eq!(lists.angles.len(), 3);
        assert!(lists.torsions.is_empty());
        assert!(lists.vdw.is_empty());
    }

    #[test]
    fn electrostatics_skip_neutral_pairs() {
        let mut molecule = Molecule::new();
        molecule.add_atom(Atom::new(0, 11, "Na").with_charge(1.0), Point3::origin());
        molecule.add_atom(Atom::new(0, 17, "Cl").with_charge(-1.0), Point3::new(3.0, 0.0, 0.0));
        molecule.add_atom(Atom::new(0, 18, "Ar4+4"), Point3::new(0.0, 4.0, 0.0));
        let store = ParameterStore::builtin();
        let groups = AtomGroups::new();
        let list = build_electrostatics(&molecule, &store, &groups, &mut Tracer::default());
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].atoms, [0, 1]);
        assert!((list[0].qq + KCAL_TO_KJ * COULOMB_CONSTANT).abs() < 1e-9);
    }

    #[test]
    fn setup_progress_is_traced_at_low_verbosity() {
        let buffer = BufferSink::new();
        let mut tracer = Tracer::new(Verbosity::Low, Box::new(buffer.clone()));
        build_interactions(
            &ethane(),
            &ParameterStore::builtin(),
            &AtomGroups::new(),
            &mut tracer,
        )
        .unwrap();
        let lines = buffer.lines();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "SETTING UP BOND CALCULATIONS...");
    }
}
