use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// The numeric order used in parameter interpolation.
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Single => 1.0,
            Self::Double => 2.0,
            Self::Triple => 3.0,
            Self::Aromatic => 1.5,
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "ar" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

/// Effective order assigned to amide C-N bonds.
pub const AMIDE_BOND_ORDER: f64 = 1.41;
/// Effective order assigned to aromatic bonds.
pub const AROMATIC_BOND_ORDER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1: usize,     // Index of the first atom
    pub atom2: usize,     // Index of the second atom
    pub order: BondOrder, // Topological bond order
    pub aromatic: bool,
    pub amide: bool,
}

impl Bond {
    pub fn new(atom1: usize, atom2: usize, order: BondOrder) -> Self {
        Self {
            atom1,
            atom2,
            aromatic: order == BondOrder::Aromatic,
            order,
            amide: false,
        }
    }

    pub fn with_aromatic(mut self, aromatic: bool) -> Self {
        self.aromatic = aromatic;
        self
    }

    pub fn with_amide(mut self, amide: bool) -> Self {
        self.amide = amide;
        self
    }

    pub fn contains(&self, atom: usize) -> bool {
        self.atom1 == atom || self.atom2 == atom
    }

    /// Returns the atom on the other end of the bond, if `atom` is one of its ends.
    pub fn partner(&self, atom: usize) -> Option<usize> {
        if self.atom1 == atom {
            Some(self.atom2)
        } else if self.atom2 == atom {
            Some(self.atom1)
        } else {
            None
        }
    }

    /// The order used by the force field: the amide flag wins over the aromatic
    /// flag, which wins over the topological order.
    pub fn effective_order(&self) -> f64 {
        if self.amide {
            AMIDE_BOND_ORDER
        } else if self.aromatic {
            AROMATIC_BOND_ORDER
        } else {
            self.order.as_f64()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_order_from_str_parses_valid_strings() {
        assert_eq!("1".parse::<BondOrder>().unwrap(), BondOrder::Single);
        assert_eq!("S".parse::<BondOrder>().unwrap(), BondOrder::Single);
        assert_eq!("double".parse::<BondOrder>().unwrap(), BondOrder::Double);
        assert_eq!("3".parse::<BondOrder>().unwrap(), BondOrder::Triple);
        assert_eq!("ar".parse::<BondOrder>().unwrap(), BondOrder::Aromatic);
        assert_eq!(
            "aromatic".parse::<BondOrder>().unwrap(),
            BondOrder::Aromatic
        );
    }

    #[test]
    fn bond_order_from_str_rejects_invalid_strings() {
        assert!("".parse::<BondOrder>().is_err());
        assert!("quadruple".parse::<BondOrder>().is_err());
        assert!("0".parse::<BondOrder>().is_err());
    }

    #[test]
    fn bond_order_display_outputs_expected_strings() {
        assert_eq!(BondOrder::Single.to_string(), "Single");
        assert_eq!(BondOrder::Aromatic.to_string(), "Aromatic");
    }

    #[test]
    fn bond_order_default_is_single() {
        assert_eq!(BondOrder::default(), BondOrder::Single);
    }

    #[test]
    fn bond_new_initializes_fields_correctly() {
        let bond = Bond::new(1, 2, BondOrder::Double);
        assert_eq!(bond.atom1, 1);
        assert_eq!(bond.atom2, 2);
        assert_eq!(bond.order, BondOrder::Double);
        assert!(!bond.aromatic);
        assert!(!bond.amide);
    }

    #[test]
    fn aromatic_order_sets_aromatic_flag() {
        assert!(Bond::new(0, 1, BondOrder::Aromatic).aromatic);
    }

    #[test]
    fn contains_and_partner_report_bond_ends() {
        let bond = Bond::new(10, 20, BondOrder::Single);
        assert!(bond.contains(10));
        assert!(bond.contains(20));
        assert!(!bond.contains(30));
        assert_eq!(bond.partner(10), Some(20));
        assert_eq!(bond.partner(20), Some(10));
        assert_eq!(bond.partner(30), None);
    }

    #[test]
    fn effective_order_follows_flag_precedence() {
        assert_eq!(Bond::new(0, 1, BondOrder::Double).effective_order(), 2.0);
        assert_eq!(
            Bond::new(0, 1, BondOrder::Single)
                .with_aromatic(true)
                .effective_order(),
            1.5
        );
        assert_eq!(
            Bond::new(0, 1, BondOrder::Aromatic)
                .with_amide(true)
                .effective_order(),
            1.41
        );
    }
}
