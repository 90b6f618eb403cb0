use std::fmt;

/// Represents an atom of a molecular graph with its force field properties.
///
/// An atom carries everything the force field setup needs to know about it:
/// its element, its assigned force field type label (e.g. `"C_3"`, `"N_R"`) and
/// its partial charge. Cartesian coordinates are deliberately *not* stored here;
/// they belong to the molecule's initial geometry and, once a calculation has
/// been set up, to the energy function that optimizes them.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The 0-based position of this atom in its molecule.
    pub index: usize,
    /// The atomic number (element) of the atom.
    pub atomic_number: u8,
    /// The name of the atom as read from the input (e.g. "C1", "HA").
    pub name: String,
    /// The force field atom type (e.g. "C_3", "O_2").
    pub force_field_type: String,
    /// The partial atomic charge in elementary charge units.
    pub partial_charge: f64,
}

impl Atom {
    /// Creates a new `Atom` with a zero partial charge.
    ///
    /// The atom name defaults to the type label; use [`Atom::with_name`] to set a
    /// distinct name.
    ///
    /// # Arguments
    ///
    /// * `index` - The 0-based index of the atom within its molecule.
    /// * `atomic_number` - The element of the atom.
    /// * `force_field_type` - The force field type label.
    pub fn new(index: usize, atomic_number: u8, force_field_type: &str) -> Self {
        Self {
            index,
            atomic_number,
            name: force_field_type.to_string(),
            force_field_type: force_field_type.to_string(),
            partial_charge: 0.0,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.partial_charge = charge;
        self
    }

    /// Returns `true` for the group 16 elements that receive special torsion
    /// treatment (O, S, Se, Te, Po).
    pub fn is_chalcogen(&self) -> bool {
        matches!(self.atomic_number, 8 | 16 | 34 | 52 | 84)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.force_field_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_has_expected_default_fields() {
        let atom = Atom::new(3, 6, "C_3");

        assert_eq!(atom.index, 3);
        assert_eq!(atom.atomic_number, 6);
        assert_eq!(atom.name, "C_3");
        assert_eq!(atom.force_field_type, "C_3");
        assert_eq!(atom.partial_charge, 0.0);
    }

    #[test]
    fn builder_methods_set_name_and_charge() {
        let atom = Atom::new(0, 8, "O_2").with_name("O1").with_charge(-0.45);
        assert_eq!(atom.name, "O1");
        assert_eq!(atom.partial_charge, -0.45);
    }

    #[test]
    fn chalcogens_are_recognized() {
        for z in [8, 16, 34, 52, 84] {
            assert!(Atom::new(0, z, "X").is_chalcogen());
        }
        assert!(!Atom::new(0, 6, "C_3").is_chalcogen());
        assert!(!Atom::new(0, 7, "N_3").is_chalcogen());
    }

    #[test]
    fn display_shows_name_and_type() {
        let atom = Atom::new(0, 6, "C_R").with_name("CA");
        assert_eq!(atom.to_string(), "CA(C_R)");
    }
}
