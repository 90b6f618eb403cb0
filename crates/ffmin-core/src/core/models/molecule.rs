use super::atom::Atom;
use super::topology::{Bond, BondOrder};
use itertools::Itertools;
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MoleculeError {
    #[error("Atom index {index} is out of range for a molecule with {count} atoms")]
    AtomIndexOutOfRange { index: usize, count: usize },
    #[error("Atom {0} cannot be bonded to itself")]
    SelfBond(usize),
    #[error("Atoms {0} and {1} are already bonded")]
    DuplicateBond(usize, usize),
    #[error("Expected {expected} positions, got {found}")]
    PositionCountMismatch { expected: usize, found: usize },
}

/// A molecular graph: atoms, bonds and an initial geometry.
///
/// The molecule is the topology collaborator of the force field. It answers the
/// graph questions the setup needs (neighbors, angle triples, torsion paths,
/// 1-2 and 1-3 relationships) and supplies the starting coordinates. It never
/// changes during a calculation; the energy function owns the working copy of
/// the positions.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    positions: Vec<Point3<f64>>,
    adjacency: Vec<Vec<usize>>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an atom and returns its 0-based index. The atom's `index` field is
    /// overwritten with that position.
    pub fn add_atom(&mut self, mut atom: Atom, position: Point3<f64>) -> usize {
        let index = self.atoms.len();
        atom.index = index;
        self.atoms.push(atom);
        self.positions.push(position);
        self.adjacency.push(Vec::new());
        index
    }

    pub fn add_bond(&mut self, bond: Bond) -> Result<(), MoleculeError> {
        self.check_index(bond.atom1)?;
        self.check_index(bond.atom2)?;
        if bond.atom1 == bond.atom2 {
            return Err(MoleculeError::SelfBond(bond.atom1));
        }
        if self.is_bonded(bond.atom1, bond.atom2) {
            return Err(MoleculeError::DuplicateBond(bond.atom1, bond.atom2));
        }
        self.adjacency[bond.atom1].push(bond.atom2);
        self.adjacency[bond.atom2].push(bond.atom1);
        self.bonds.push(bond);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), MoleculeError> {
        if index < self.atoms.len() {
            Ok(())
        } else {
            Err(MoleculeError::AtomIndexOutOfRange {
                index,
                count: self.atoms.len(),
            })
        }
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn atom_mut(&mut self, index: usize) -> Option<&mut Atom> {
        self.atoms.get_mut(index)
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn set_positions(&mut self, positions: &[Point3<f64>]) -> Result<(), MoleculeError> {
        if positions.len() != self.atoms.len() {
            return Err(MoleculeError::PositionCountMismatch {
                expected: self.atoms.len(),
                found: positions.len(),
            });
        }
        self.positions.copy_from_slice(positions);
        Ok(())
    }

    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.adjacency.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_bonded(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).contains(&b)
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<&Bond> {
        self.bonds.iter().find(|bond| bond.partner(a) == Some(b))
    }

    /// Returns `true` when `a` and `b` share a common bonded neighbor.
    pub fn is_one_three(&self, a: usize, b: usize) -> bool {
        a != b
            && self
                .neighbors(a)
                .iter()
                .any(|&k| self.neighbors(b).contains(&k))
    }

    /// Enumerates every bond angle as `[a, b, c]` with `b` the central atom and
    /// `a`, `c` two distinct neighbors of `b`.
    pub fn angles(&self) -> Vec<[usize; 3]> {
        (0..self.atoms.len())
            .flat_map(|center| {
                self.neighbors(center)
                    .iter()
                    .tuple_combinations()
                    .map(move |(&a, &c)| [a, center, c])
            })
            .collect()
    }

    /// Enumerates every dihedral path `[a, b, c, d]` along the bonds a-b, b-c, c-d.
    ///
    /// Each path is listed once, oriented along the bond list. Paths whose end atoms
    /// coincide (three-membered rings) are excluded.
    pub fn torsions(&self) -> Vec<[usize; 4]> {
        let mut torsions = Vec::new();
        for bond in &self.bonds {
            let (b, c) = (bond.atom1, bond.atom2);
            for &a in self.neighbors(b).iter().filter(|&&a| a != c) {
                for &d in self.neighbors(c).iter().filter(|&&d| d != b) {
                    if a != d {
                        torsions.push([a, b, c, d]);
                    }
                }
            }
        }
        torsions
    }
}

/// Fluent construction of a [`Molecule`], deferring graph validation to
/// [`MoleculeBuilder::build`].
#[derive(Debug, Default)]
pub struct MoleculeBuilder {
    atoms: Vec<(Atom, Point3<f64>)>,
    bonds: Vec<Bond>,
}

impl MoleculeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom(mut self, atomic_number: u8, force_field_type: &str, position: [f64; 3]) -> Self {
        let index = self.atoms.len();
        self.atoms.push((
            Atom::new(index, atomic_number, force_field_type),
            Point3::from(position),
        ));
        self
    }

    pub fn charged_atom(
        mut self,
        atomic_number: u8,
        force_field_type: &str,
        charge: f64,
        position: [f64; 3],
    ) -> Self {
        let index = self.atoms.len();
        self.atoms.push((
            Atom::new(index, atomic_number, force_field_type).with_charge(charge),
            Point3::from(position),
        ));
        self
    }

    pub fn bond(mut self, atom1: usize, atom2: usize, order: BondOrder) -> Self {
        self.bonds.push(Bond::new(atom1, atom2, order));
        self
    }

    pub fn custom_bond(mut self, bond: Bond) -> Self {
        self.bonds.push(bond);
        self
    }

    pub fn build(self) -> Result<Molecule, MoleculeError> {
        let mut molecule = Molecule::new();
        for (atom, position) in self.atoms {
            molecule.add_atom(atom, position);
        }
        for bond in self.bonds {
            molecule.add_bond(bond)?;
        }
        Ok(molecule)
    }
}
