use super::constants::{RAD_TO_DEG, TORSION_FALLBACK};
use super::interactions::InteractionLists;
use super::potentials;
use super::trace::{Tracer, Verbosity};
use crate::core::utils::geometry;
use nalgebra::{Point3, Vector3};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of UFF energy terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TermKind {
    Bond,
    Angle,
    Torsion,
    OutOfPlane,
    VanDerWaals,
    Electrostatic,
}

impl TermKind {
    pub const ALL: [TermKind; 6] = [
        TermKind::Bond,
        TermKind::Angle,
        TermKind::Torsion,
        TermKind::OutOfPlane,
        TermKind::VanDerWaals,
        TermKind::Electrostatic,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Heading used in trace tables and reports.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Bond => "BOND STRETCHING",
            Self::Angle => "ANGLE BENDING",
            Self::Torsion => "TORSIONAL",
            Self::OutOfPlane => "OUT-OF-PLANE BENDING",
            Self::VanDerWaals => "VAN DER WAALS",
            Self::Electrostatic => "ELECTROSTATIC",
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown energy term '{0}'")]
pub struct ParseTermKindError(String);

impl FromStr for TermKind {
    type Err = ParseTermKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bond" | "bonds" => Ok(Self::Bond),
            "angle" | "angles" => Ok(Self::Angle),
            "torsion" | "torsions" => Ok(Self::Torsion),
            "oop" | "out-of-plane" => Ok(Self::OutOfPlane),
            "vdw" | "van-der-waals" => Ok(Self::VanDerWaals),
            "electrostatic" | "electrostatics" | "ele" => Ok(Self::Electrostatic),
            _ => Err(ParseTermKindError(s.to_string())),
        }
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bond => "bond",
            Self::Angle => "angle",
            Self::Torsion => "torsion",
            Self::OutOfPlane => "oop",
            Self::VanDerWaals => "vdw",
            Self::Electrostatic => "electrostatic",
        };
        write!(f, "{name}")
    }
}

/// Per-term on/off switches. All terms start enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledTerms([bool; 6]);

impl Default for EnabledTerms {
    fn default() -> Self {
        Self::all()
    }
}

impl EnabledTerms {
    pub fn all() -> Self {
        Self([true; 6])
    }

    pub fn none() -> Self {
        Self([false; 6])
    }

    pub fn only(kind: TermKind) -> Self {
        let mut terms = Self::none();
        terms.set(kind, true);
        terms
    }

    pub fn set(&mut self, kind: TermKind, enabled: bool) {
        self.0[kind.index()] = enabled;
    }

    pub fn is_enabled(&self, kind: TermKind) -> bool {
        self.0[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = TermKind> + '_ {
        TermKind::ALL.into_iter().filter(|k| self.is_enabled(*k))
    }
}

impl FromIterator<TermKind> for EnabledTerms {
    fn from_iter<I: IntoIterator<Item = TermKind>>(iter: I) -> Self {
        let mut terms = Self::none();
        for kind in iter {
            terms.set(kind, true);
        }
        terms
    }
}

/// Cutoff inclusion bits for the non-bonded lists. `None` includes every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairMasks {
    pub vdw: Option<Vec<bool>>,
    pub electrostatics: Option<Vec<bool>>,
}

impl PairMasks {
    fn includes(mask: &Option<Vec<bool>>, index: usize) -> bool {
        mask.as_ref()
            .map_or(true, |bits| bits.get(index).copied().unwrap_or(false))
    }
}

/// Everything a term needs besides its own interaction list.
pub struct TermContext<'a> {
    pub positions: &'a [Point3<f64>],
    /// Force accumulator; `None` evaluates the energy only.
    pub gradients: Option<&'a mut [Vector3<f64>]>,
    pub labels: &'a [String],
    pub masks: &'a PairMasks,
    pub tracer: &'a mut Tracer,
}

impl TermContext<'_> {
    fn label(&self, atom: usize) -> &str {
        self.labels.get(atom).map(String::as_str).unwrap_or("?")
    }

    /// Adds `-dE/dx * dx/dr` to the force of every listed atom.
    fn add_forces<const N: usize>(
        &mut self,
        atoms: &[usize; N],
        d_energy: f64,
        derivatives: &[Vector3<f64>; N],
    ) {
        if let Some(gradients) = self.gradients.as_deref_mut() {
            for (atom, derivative) in atoms.iter().zip(derivatives) {
                gradients[*atom] -= derivative * d_energy;
            }
        }
    }

    fn wants_gradients(&self) -> bool {
        self.gradients.is_some()
    }
}

/// Evaluates one term over its interaction list, returning the energy in kJ/mol.
pub fn evaluate(kind: TermKind, lists: &InteractionLists, ctx: &mut TermContext<'_>) -> f64 {
    let energy = match kind {
        TermKind::Bond => bond_energy(lists, ctx),
        TermKind::Angle => angle_energy(lists, ctx),
        TermKind::Torsion => torsion_energy(lists, ctx),
        TermKind::OutOfPlane => oop_energy(lists, ctx),
        TermKind::VanDerWaals => vdw_energy(lists, ctx),
        TermKind::Electrostatic => electrostatic_energy(lists, ctx),
    };
    ctx.tracer.line_with(Verbosity::Medium, || {
        format!("     TOTAL {} ENERGY = {:8.3} kJ/mol", kind.title(), energy)
    });
    energy
}

fn table_header(tracer: &mut Tracer, title: &str, header: &[&str]) {
    if !tracer.enabled(Verbosity::High) {
        return;
    }
    tracer.line(Verbosity::High, "");
    tracer.line(Verbosity::High, title);
    tracer.line(Verbosity::High, "");
    for line in header {
        tracer.line(Verbosity::High, line);
    }
}

fn bond_energy(lists: &InteractionLists, ctx: &mut TermContext<'_>) -> f64 {
    table_header(
        ctx.tracer,
        "B O N D   S T R E T C H I N G",
        &[
            "ATOM TYPES  BOND    BOND       IDEAL       FORCE",
            " I      J   TYPE   LENGTH     LENGTH     CONSTANT      DELTA      ENERGY",
            "------------------------------------------------------------------------",
        ],
    );
    let mut energy = 0.0;
    for bond in &lists.bonds {
        let [a, b] = bond.atoms;
        let geo = geometry::distance_derivatives(&ctx.positions[a], &ctx.positions[b]);
        let (e, de) = potentials::harmonic_bond(geo.value, bond.r0, bond.kb);
        ctx.add_forces(&bond.atoms, de, &geo.gradients);
        energy += e;
        if ctx.tracer.enabled(Verbosity::High) {
            let line = format!(
                "{:<5} {:<5}  {:4.2}{:8.3}   {:8.3}     {:8.3}   {:8.3}   {:8.3}",
                ctx.label(a),
                ctx.label(b),
                bond.order,
                geo.value,
                bond.r0,
                bond.kb,
                geo.value - bond.r0,
                e
            );
            ctx.tracer.line(Verbosity::High, &line);
        }
    }
    energy
}

fn angle_energy(lists: &InteractionLists, ctx: &mut TermContext<'_>) -> f64 {
    table_header(
        ctx.tracer,
        "A N G L E   B E N D I N G",
        &[
            "ATOM TYPES       VALENCE     IDEAL      FORCE",
            " I    J    K      ANGLE      ANGLE     CONSTANT      ENERGY",
            "-----------------------------------------------------------",
        ],
    );
    let mut energy = 0.0;
    for angle in &lists.angles {
        let [a, b, c] = angle.atoms;
        let (pa, pb, pc) = (&ctx.positions[a], &ctx.positions[b], &ctx.positions[c]);
        let (mut theta, derivatives) = if ctx.wants_gradients() {
            let geo = geometry::bend_angle_derivatives(pa, pb, pc);
            (geo.value, geo.gradients)
        } else {
            (geometry::bend_angle(pa, pb, pc), [Vector3::zeros(); 3])
        };
        if !theta.is_finite() {
            theta = 0.0;
        }
        let coefficients = [angle.c0, angle.c1, angle.c2];
        let (e, de) = potentials::angle_bend(theta, angle.coordination, angle.ka, coefficients);
        ctx.add_forces(&angle.atoms, de, &derivatives);
        energy += e;
        if ctx.tracer.enabled(Verbosity::High) {
            let line = format!(
                "{:<5} {:<5} {:<5}{:8.3}  {:8.3}     {:8.3}   {:8.3}",
                ctx.label(a),
                ctx.label(b),
                ctx.label(c),
                theta * RAD_TO_DEG,
                angle.theta0,
                angle.ka,
                e
            );
            ctx.tracer.line(Verbosity::High, &line);
        }
    }
    energy
}

fn torsion_energy(lists: &InteractionLists, ctx: &mut TermContext<'_>) -> f64 {
    table_header(
        ctx.tracer,
        "T O R S I O N A L",
        &[
            "----ATOM TYPES-----    FORCE         TORSION",
            " I    J    K    L     CONSTANT        ANGLE         ENERGY",
            "----------------------------------------------------------------",
        ],
    );
    let mut energy = 0.0;
    for torsion in &lists.torsions {
        let [a, b, c, d] = torsion.atoms;
        let p = ctx.positions;
        let (mut phi, derivatives) = if ctx.wants_gradients() {
            let geo = geometry::torsion_angle_derivatives(&p[a], &p[b], &p[c], &p[d]);
            (geo.value, geo.gradients)
        } else {
            (
                geometry::torsion_angle(&p[a], &p[b], &p[c], &p[d]),
                [Vector3::zeros(); 4],
            )
        };
        if !phi.is_finite() {
            phi = TORSION_FALLBACK;
        }
        let (e, de) = potentials::cosine_torsion(phi, torsion.v, torsion.n, torsion.cos_n_phi0);
        ctx.add_forces(&torsion.atoms, de, &derivatives);
        energy += e;
        if ctx.tracer.enabled(Verbosity::High) {
            let line = format!(
                "{:<5} {:<5} {:<5} {:<5}{:6.3}       {:8.3}     {:8.3}",
                ctx.label(a),
                ctx.label(b),
                ctx.label(c),
                ctx.label(d),
                torsion.v,
                phi * RAD_TO_DEG,
                e
            );
            ctx.tracer.line(Verbosity::High, &line);
        }
    }
    energy
}

fn oop_energy(lists: &InteractionLists, ctx: &mut TermContext<'_>) -> f64 {
    table_header(
        ctx.tracer,
        "O U T - O F - P L A N E   B E N D I N G",
        &[
            "ATOM TYPES                 OOP     FORCE",
            " I    J     K     L       ANGLE   CONSTANT     ENERGY",
            "----------------------------------------------------------",
        ],
    );
    let mut energy = 0.0;
    for oop in &lists.oops {
        let [a, b, c, d] = oop.atoms;
        let p = ctx.positions;
        let (mut omega, derivatives) = if ctx.wants_gradients() {
            let geo = geometry::wilson_angle_derivatives(&p[a], &p[b], &p[c], &p[d]);
            (geo.value, geo.gradients)
        } else {
            (
                geometry::wilson_angle(&p[a], &p[b], &p[c], &p[d]),
                [Vector3::zeros(); 4],
            )
        };
        if !omega.is_finite() {
            omega = 0.0;
        }
        let (e, de) = potentials::inversion(omega, oop.koop, [oop.c0, oop.c1, oop.c2]);
        ctx.add_forces(&oop.atoms, de, &derivatives);
        energy += e;
        if ctx.tracer.enabled(Verbosity::High) {
            let line = format!(
                "{:<5} {:<5} {:<5} {:<5}{:8.3}   {:8.3}     {:8.3}",
                ctx.label(a),
                ctx.label(b),
                ctx.label(c),
                ctx.label(d),
                omega * RAD_TO_DEG,
                oop.koop,
                e
            );
            ctx.tracer.line(Verbosity::High, &line);
        }
    }
    energy
}

fn vdw_energy(lists: &InteractionLists, ctx: &mut TermContext<'_>) -> f64 {
    table_header(
        ctx.tracer,
        "V A N   D E R   W A A L S",
        &[
            "ATOM TYPES",
            " I    J        Rij       kij       ENERGY",
            "-----------------------------------------",
        ],
    );
    let mut energy = 0.0;
    for (index, pair) in lists.vdw.iter().enumerate() {
        if !PairMasks::includes(&ctx.masks.vdw, index) {
            continue;
        }
        let [a, b] = pair.atoms;
        let geo = geometry::distance_derivatives(&ctx.positions[a], &ctx.positions[b]);
        let (e, de) = potentials::lennard_jones_12_6(geo.value, pair.xij, pair.kab);
        ctx.add_forces(&pair.atoms, de, &geo.gradients);
        energy += e;
        if ctx.tracer.enabled(Verbosity::High) {
            let line = format!(
                "{:<5} {:<5} {:8.3}  {:8.3}  {:8.3}",
                ctx.label(a),
                ctx.label(b),
                geo.value,
                pair.kab,
                e
            );
            ctx.tracer.line(Verbosity::High, &line);
        }
    }
    energy
}

fn electrostatic_energy(lists: &InteractionLists, ctx: &mut TermContext<'_>) -> f64 {
    table_header(
        ctx.tracer,
        "E L E C T R O S T A T I C   I N T E R A C T I O N S",
        &[
            "ATOM TYPES",
            " I    J           Rij   332.17*QiQj  ENERGY",
            "-------------------------------------------",
        ],
    );
    let mut energy = 0.0;
    for (index, pair) in lists.electrostatics.iter().enumerate() {
        if !PairMasks::includes(&ctx.masks.electrostatics, index) {
            continue;
        }
        let [a, b] = pair.atoms;
        let geo = geometry::distance_derivatives(&ctx.positions[a], &ctx.positions[b]);
        let (e, de) = potentials::coulomb(geo.value, pair.qq);
        ctx.add_forces(&pair.atoms, de, &geo.gradients);
        energy += e;
        if ctx.tracer.enabled(Verbosity::High) {
            let line = format!(
                "{:<5} {:<5}   {:8.3}  {:8.3}  {:8.3}",
                ctx.label(a),
                ctx.label(b),
                geo.value,
                pair.qq,
                e
            );
            ctx.tracer.line(Verbosity::High, &line);
        }
    }
    energy
}
