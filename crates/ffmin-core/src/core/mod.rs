//! # Core Module
//!
//! Stateless data and mathematics underneath the energy function and the minimizer.
//!
//! ## Overview
//!
//! Nothing in this module owns coordinates that change during an optimization. It
//! describes *what* is being computed: the molecular graph, the Universal Force Field
//! parameters, the interaction records derived from both, and the closed-form
//! potentials evaluated over them.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, molecules and atom-group restrictions
//! - **Force Field** ([`forcefield`]) - Parameters, interaction setup, term evaluation and tracing
//! - **File I/O** ([`io`]) - The Biograf reader and writer
//! - **Geometry** ([`utils`]) - Internal coordinates and their Cartesian derivatives
//!
//! ## Conventions
//!
//! - Atom indices are 0-based and dense
//! - Lengths are in Angstrom, angles in radians unless a name says otherwise
//! - Energies are in kJ/mol

pub mod forcefield;
pub mod io;
pub mod models;
pub mod utils;
