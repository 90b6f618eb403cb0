//! # Engine Module
//!
//! This module holds the stateful machinery of ffmin: the differentiable energy
//! function, the local minimizers that drive it, and the configuration and
//! reporting types around them.
//!
//! ## Overview
//!
//! A [`function::ForceFieldFunction`] is set up once for a molecule. Setup resolves
//! atom types against the parameter store and freezes the interaction lists; from
//! then on only the working coordinates change. The function computes the total
//! energy and, on request, the force array that the minimizers in [`minimize`]
//! follow downhill.
//!
//! ## Architecture
//!
//! - **Energy Function** ([`function`]) - Coordinates, forces, term switches, cutoff masks and trace output
//! - **Minimization** ([`minimize`]) - Steepest descent, conjugate gradients and their line searches
//! - **Gradient Validation** ([`validation`]) - Analytic forces compared against finite differences
//! - **Configuration** ([`config`]) - Evaluation and minimization settings with validating builders
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events for front ends
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation
//!
//! ## Conventions
//!
//! Energies are in kJ/mol and lengths in Angstrom. The force array always stores
//! `-dE/dr`, so a minimizer moves atoms along it, never against it.

pub mod config;
pub mod error;
pub mod function;
pub mod minimize;
pub mod progress;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;
