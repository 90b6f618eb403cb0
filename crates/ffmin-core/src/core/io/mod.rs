//! Reading and writing molecular structure files.
//!
//! Structures enter the library as a [`Molecule`](crate::core::models::molecule::Molecule)
//! through the [`traits::MolecularFile`] interface. The Biograf format is the one
//! concrete implementation: it carries force field types, partial charges,
//! coordinates, connectivity and bond orders, which is everything a setup needs.

pub mod bgf;
pub mod traits;
