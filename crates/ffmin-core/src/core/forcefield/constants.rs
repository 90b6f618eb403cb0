/// Conversion factor from kcal/mol to kJ/mol. All energies are reported in kJ/mol.
pub const KCAL_TO_KJ: f64 = 4.1868;

/// Coulomb constant in kcal·Å/(mol·e²).
pub const COULOMB_CONSTANT: f64 = 332.0637;

/// Bond-order correction coefficient of the UFF natural bond length.
pub const BOND_ORDER_CORRECTION: f64 = 0.1332;

/// Prefactor of the UFF bond stretching force constant (kcal·Å/mol per charge unit²).
pub const BOND_FORCE_PREFACTOR: f64 = 664.12;

/// Prefactor of the UFF angle bending force constant.
pub const ANGLE_FORCE_PREFACTOR: f64 = 644.12;

/// Lower bound applied to non-bonded distances before division.
pub const MIN_DISTANCE: f64 = 1.0e-3;

/// Fallback dihedral (radians) used when the torsion angle is undefined.
pub const TORSION_FALLBACK: f64 = 1.0e-3;

/// Torsion barriers below this magnitude are dropped during setup.
pub const BARRIER_EPSILON: f64 = 2.0e-6;

pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;
pub const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;
