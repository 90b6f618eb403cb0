use crate::core::forcefield::params::ParameterStore;
use crate::core::forcefield::registry::UffForceField;
use crate::core::forcefield::setup::natural_bond_length;
use crate::core::models::molecule::{Molecule, MoleculeBuilder};
use crate::core::models::topology::BondOrder;
use crate::engine::function::ForceFieldFunction;

/// Staggered ethane with every bond and angle slightly off its ideal value.
pub fn distorted_ethane() -> Molecule {
    MoleculeBuilder::new()
        .charged_atom(6, "C_3", -0.18, [0.0, 0.0, 0.0])
        .charged_atom(6, "C_3", -0.18, [1.60, 0.05, 0.0])
        .charged_atom(1, "H_", 0.06, [-0.40, 1.00, 0.10])
        .charged_atom(1, "H_", 0.06, [-0.30, -0.55, 0.95])
        .charged_atom(1, "H_", 0.06, [-0.42, -0.45, -0.85])
        .charged_atom(1, "H_", 0.06, [1.95, -1.05, 0.05])
        .charged_atom(1, "H_", 0.06, [1.90, 0.60, 0.80])
        .charged_atom(1, "H_", 0.06, [2.00, 0.45, -0.95])
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

/// Water at its exact UFF bond lengths and bend angle: a stationary point with
/// only bond and angle terms.
pub fn relaxed_water() -> Molecule {
    let params = ParameterStore::builtin();
    let oxygen = params.get("O_3").unwrap();
    let hydrogen = params.get("H_").unwrap();
    let r0 = natural_bond_length(oxygen, hydrogen, 1.0);
    let half_angle = oxygen.theta0.to_radians() / 2.0;
    MoleculeBuilder::new()
        .atom(8, "O_3", [0.0, 0.0, 0.0])
        .atom(1, "H_", [r0 * half_angle.sin(), r0 * half_angle.cos(), 0.0])
        .atom(1, "H_", [-r0 * half_angle.sin(), r0 * half_angle.cos(), 0.0])
        .bond(0, 1, BondOrder::Single)
        .bond(0, 2, BondOrder::Single)
        .build()
        .unwrap()
}

/// Two bonded carbons at the given separation; only a bond term applies.
pub fn carbon_pair(distance: f64) -> Molecule {
    MoleculeBuilder::new()
        .atom(6, "C_3", [0.0, 0.0, 0.0])
        .atom(6, "C_3", [distance, 0.0, 0.0])
        .bond(0, 1, BondOrder::Single)
        .build()
        .unwrap()
}

pub fn function_for(molecule: &Molecule) -> ForceFieldFunction {
    let mut function =
        ForceFieldFunction::new(Box::new(UffForceField), ParameterStore::builtin());
    function.setup(molecule).unwrap();
    function
}
