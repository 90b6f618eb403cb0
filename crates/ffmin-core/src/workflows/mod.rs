//! # Workflows Module
//!
//! High-level entry points that run a complete ffmin job on a molecule.
//!
//! ## Overview
//!
//! Each workflow resolves the force field through the registry, loads the
//! parameter table (the built-in UFF table unless a CSV path is configured), sets up
//! the energy function under the given atom groups and then performs its task,
//! reporting phases through a [`ProgressReporter`](crate::engine::progress::ProgressReporter).
//!
//! - **Minimization** ([`minimize`]) - Steepest descent or conjugate gradients to convergence
//! - **Energy Evaluation** ([`energy`]) - Total energy, per-term breakdown and forces
//! - **Gradient Validation** ([`validate`]) - Analytic forces checked against finite differences

pub mod energy;
pub mod minimize;
mod prepare;
pub mod validate;
