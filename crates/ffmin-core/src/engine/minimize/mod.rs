//! Local geometry optimization.
//!
//! The [`minimizer::Minimizer`] implements steepest descent and Fletcher-Reeves
//! nonlinear conjugate gradients. Each step hands a search direction to one of the
//! [`line_search`] strategies, which moves the coordinates of the
//! [`ForceFieldFunction`](crate::engine::function::ForceFieldFunction) without ever
//! raising its energy.

pub mod line_search;
pub mod minimizer;
