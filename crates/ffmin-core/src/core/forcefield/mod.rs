//! # Force Field Module
//!
//! This module implements the Universal Force Field (UFF): its parameter table, the
//! construction of interaction lists from a molecular graph, and the evaluation of
//! each energy term with analytic first derivatives.
//!
//! ## Overview
//!
//! Evaluation happens in two phases. A *setup* turns a [`Molecule`](crate::core::models::molecule::Molecule)
//! and a [`params::ParameterStore`] into [`interactions::InteractionLists`], deriving every
//! force constant and equilibrium value once. A *compute* then walks those lists for
//! the current coordinates. The terms are:
//!
//! - **Bond stretching** - harmonic in the bond length
//! - **Angle bending** - cosine Fourier series in four coordination-dependent shapes
//! - **Torsion** - `V (1 - cos(n phi0) cos(n phi))` keyed on the hybridization of the central bond
//! - **Out-of-plane bending** - Wilson angle inversion for trigonal C, N, O and the pnictogens
//! - **Van der Waals** - 12-6 Lennard-Jones over 1-4 and farther pairs
//! - **Electrostatics** - optional Coulomb term, built only on request
//!
//! Energies are in kJ/mol. Gradient arrays hold forces (`-dE/dr`).
//!
//! ## Key Components
//!
//! - [`params`] - Per-type constants, built-in table and CSV loading
//! - [`setup`] - Interaction-list construction with group filters
//! - [`interactions`] - Immutable interaction records
//! - [`potentials`] - Closed-form energies and their derivatives
//! - [`terms`] - Per-term evaluation, cutoff masks and trace tables
//! - [`trace`] - Verbosity levels and trace sinks
//! - [`registry`] - The [`registry::ForceField`] capability and the name-to-constructor registry
//!
//! ## Usage
//!
//! ```ignore
//! use ffmin::core::forcefield::registry::ForceFieldRegistry;
//!
//! let uff = ForceFieldRegistry::with_defaults().create("UFF")?;
//! let lists = uff.setup(&molecule, &ParameterStore::builtin(), &AtomGroups::new(), &mut Tracer::default())?;
//! ```

pub mod constants;
pub mod interactions;
pub mod params;
pub mod potentials;
pub mod registry;
pub mod setup;
pub mod terms;
pub mod trace;
