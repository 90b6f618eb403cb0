//! # ffmin
//!
//! Universal Force Field energies with analytic gradients, and local geometry
//! minimization by steepest descent or nonlinear conjugate gradients.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer split so each concern can be tested on its own.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Molecule`, `AtomGroups`),
//!   the UFF parameter table, interaction-list setup, closed-form potentials and
//!   BGF I/O.
//!
//! - **[`engine`]: The Logic Core.** The stateful `ForceFieldFunction` that owns
//!   positions and gradients, numerical gradient validation, and the `Minimizer`
//!   with its line searches.
//!
//! - **[`workflows`]: The Public API.** Single-call entry points that take a molecule
//!   and a configuration and return energies, gradient reports or minimized
//!   coordinates.

pub mod core;
pub mod engine;
pub mod workflows;
