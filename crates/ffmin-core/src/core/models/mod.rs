//! # Core Models Module
//!
//! This module contains the molecular graph consumed by the force field setup.
//!
//! ## Overview
//!
//! A calculation starts from a [`molecule::Molecule`]: atoms carrying a force
//! field type label and a partial charge, bonds carrying an order plus aromatic
//! and amide flags, and an initial geometry. The molecule answers the graph
//! questions the interaction-list builder asks and is never modified by it.
//!
//! ## Key Components
//!
//! - [`atom`] - Atom identity, element, type label and charge
//! - [`topology`] - Bonds, bond orders and effective interpolation orders
//! - [`molecule`] - The molecular graph, its builder, and angle/torsion enumeration
//! - [`groups`] - Intra-/inter-group restriction masks for partial calculations
//!
//! ## Usage
//!
//! ```ignore
//! use ffmin::core::models::molecule::MoleculeBuilder;
//! use ffmin::core::models::topology::BondOrder;
//!
//! let water = MoleculeBuilder::new()
//!     .atom(8, "O_3", [0.0, 0.0, 0.0])
//!     .atom(1, "H_", [0.96, 0.0, 0.0])
//!     .atom(1, "H_", [-0.24, 0.93, 0.0])
//!     .bond(0, 1, BondOrder::Single)
//!     .bond(0, 2, BondOrder::Single)
//!     .build()?;
//! ```

pub mod atom;
pub mod groups;
pub mod molecule;
pub mod topology;
