/// Bond stretch between `atoms[0]` and `atoms[1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BondInteraction {
    pub atoms: [usize; 2],
    /// Effective bond order used in the interpolation.
    pub order: f64,
    /// Natural bond length (Å).
    pub r0: f64,
    /// Force constant with the 1/2 prefactor folded in (kJ/mol/Å²).
    pub kb: f64,
}

/// Angle bend `atoms[0]-atoms[1]-atoms[2]`, with `atoms[1]` at the vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleInteraction {
    pub atoms: [usize; 3],
    /// Coordination class of the central atom; selects the functional form.
    pub coordination: u8,
    /// Natural angle (degrees).
    pub theta0: f64,
    pub ka: f64,
    pub c0: f64,
    pub c1: f64,
    pub c2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TorsionInteraction {
    pub atoms: [usize; 4],
    /// Barrier height (kJ/mol).
    pub v: f64,
    /// Periodicity.
    pub n: f64,
    /// Phase (degrees).
    pub phi0: f64,
    /// `cos(n * phi0)`.
    pub cos_n_phi0: f64,
}

/// Inversion of the central atom `atoms[1]`: the angle of the bond to `atoms[3]`
/// out of the plane through `atoms[0]`, `atoms[1]` and `atoms[2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OopInteraction {
    pub atoms: [usize; 4],
    pub koop: f64,
    pub c0: f64,
    pub c1: f64,
    pub c2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VdwInteraction {
    pub atoms: [usize; 2],
    /// Combined well depth (kJ/mol).
    pub kab: f64,
    /// Combined minimum-energy distance (Å).
    pub xij: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElectrostaticInteraction {
    pub atoms: [usize; 2],
    /// Charge product scaled by the Coulomb constant (kJ·Å/mol).
    pub qq: f64,
}

/// Interaction lists produced by a setup. Nothing is appended after a setup
/// completes; a new setup replaces the whole value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionLists {
    pub bonds: Vec<BondInteraction>,
    pub angles: Vec<AngleInteraction>,
    pub torsions: Vec<TorsionInteraction>,
    pub oops: Vec<OopInteraction>,
    pub vdw: Vec<VdwInteraction>,
    pub electrostatics: Vec<ElectrostaticInteraction>,
}

impl InteractionLists {
    pub fn clear(&mut self) {
        self.bonds.clear();
        self.angles.clear();
        self.torsions.clear();
        self.oops.clear();
        self.vdw.clear();
        self.electrostatics.clear();
    }

    pub fn total_len(&self) -> usize {
        self.bonds.len()
            + self.angles.len()
            + self.torsions.len()
            + self.oops.len()
            + self.vdw.len()
            + self.electrostatics.len()
    }
}
