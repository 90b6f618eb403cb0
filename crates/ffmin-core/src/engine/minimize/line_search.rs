use crate::engine::error::EngineError;
use crate::engine::function::{Computation, ForceFieldFunction};
use nalgebra::{Point3, Vector3};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

const SIMPLE_INITIAL_STEP: f64 = 0.2;
const SIMPLE_GROWTH: f64 = 2.15;
const SIMPLE_MAX_STEP: f64 = 1.0;
const SIMPLE_SHRINK: f64 = 0.1;
const SIMPLE_MAX_TRIALS: usize = 10;
const SIMPLE_ENERGY_EPSILON: f64 = 1e-3;
/// Largest displacement of a single atom in one simple trial, in Angstrom.
const TRUST_RADIUS: f64 = 0.3;
const TRUST_RADIUS_SQ: f64 = TRUST_RADIUS * TRUST_RADIUS;

const NEWTON_DEFAULT_STEP: f64 = 0.025;
const NEWTON_MAX_STEP: f64 = 5.0;
const NEWTON_REFINEMENTS: usize = 3;
const NEWTON_DELTA_FRACTION: f64 = 0.001;
const NEWTON_FALLBACK_FRACTION: f64 = 0.001;
const NEAR_ZERO_SCALE: f64 = 2e-6;
const DEGENERATE_SCALE: f64 = 1e-70;

/// Strategy used to move along a search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSearchType {
    /// Trust-region stepping with multiplicative growth and shrinkage.
    #[default]
    Simple,
    /// Newton's method on a three-point numerical second derivative.
    Newton2Num,
}

#[derive(Debug, Error)]
#[error("Unknown line search '{0}' (expected 'simple' or 'newton')")]
pub struct ParseLineSearchError(String);

impl FromStr for LineSearchType {
    type Err = ParseLineSearchError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "newton" | "newton2num" => Ok(Self::Newton2Num),
            _ => Err(ParseLineSearchError(s.to_string())),
        }
    }
}

impl fmt::Display for LineSearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Newton2Num => write!(f, "newton"),
        }
    }
}

/// Runs the selected line search from the current coordinates along `direction`.
pub fn search(
    kind: LineSearchType,
    function: &mut ForceFieldFunction,
    direction: &mut [Vector3<f64>],
) -> Result<f64, EngineError> {
    match kind {
        LineSearchType::Simple => simple(function, direction),
        LineSearchType::Newton2Num => newton_2num(function, direction),
    }
}

/// Trust-region line search.
///
/// Trial steps start at 0.2 along `direction`. A lower energy keeps the move and
/// grows the step by 2.15 up to 1.0; a higher energy reverts it and shrinks the step
/// tenfold. Each atom moves at most [`TRUST_RADIUS`] per trial and entries with a
/// non-finite norm are skipped. The search stops after ten trials or once two
/// successive energies differ by less than 1e-3.
///
/// Returns the length of the net displacement from the starting coordinates.
pub fn simple(
    function: &mut ForceFieldFunction,
    direction: &[Vector3<f64>],
) -> Result<f64, EngineError> {
    let start = function.positions().to_vec();
    let mut current_energy = function.compute(Computation::Value)?;
    let mut step = SIMPLE_INITIAL_STEP;

    for _ in 0..SIMPLE_MAX_TRIALS {
        let last = function.positions().to_vec();
        for (position, d) in function.positions_mut().iter_mut().zip(direction) {
            if !d.norm_squared().is_finite() {
                continue;
            }
            let mut displacement = d * step;
            if displacement.norm_squared() > TRUST_RADIUS_SQ {
                displacement = displacement.normalize() * TRUST_RADIUS;
            }
            *position += displacement;
        }

        let trial_energy = function.compute(Computation::Value)?;
        let change = (trial_energy - current_energy).abs();

        if trial_energy.is_nan() || trial_energy > current_energy {
            step *= SIMPLE_SHRINK;
            function.set_positions(&last)?;
        } else if trial_energy < current_energy {
            current_energy = trial_energy;
            step = (step * SIMPLE_GROWTH).min(SIMPLE_MAX_STEP);
        }

        if change < SIMPLE_ENERGY_EPSILON {
            break;
        }
    }

    Ok(net_displacement(&start, function.positions()))
}

/// Numerical Newton line search along the whole direction array.
///
/// Non-finite direction entries are zeroed in place. The direction is scaled by its
/// norm so the first trial moves 0.025 Angstrom; up to three Newton refinements use
/// energies at `step`, `step + delta` and `step + 2 delta` to estimate the
/// curvature, with the step clamped to 5 Angstrom. If no trial lowers the energy a
/// much smaller step is tried once. The coordinates are finally set to the best
/// evaluated point, which is the start when nothing improved.
///
/// Returns the length of the committed displacement.
pub fn newton_2num(
    function: &mut ForceFieldFunction,
    direction: &mut [Vector3<f64>],
) -> Result<f64, EngineError> {
    let mut sum = 0.0;
    for d in direction.iter_mut() {
        let norm_sq = d.norm_squared();
        if norm_sq.is_finite() {
            sum += norm_sq;
        } else {
            *d = Vector3::zeros();
        }
    }

    let mut scale = sum.sqrt();
    if scale < NEAR_ZERO_SCALE {
        warn!(scale, "Search direction is nearly zero; substituting a tiny scale");
        scale = DEGENERATE_SCALE;
    }

    let origin = function.positions().to_vec();
    let mut opt_energy = function.compute(Computation::Value)?;
    let mut opt_step = 0.0;
    let max_step = NEWTON_MAX_STEP / scale;
    let mut step = NEWTON_DEFAULT_STEP / scale;

    let mut refinements = 0;
    loop {
        let e1 = energy_at(function, &origin, direction, step)?;
        if e1 < opt_energy {
            opt_step = step;
            opt_energy = e1;
        }

        if refinements == NEWTON_REFINEMENTS {
            break;
        }
        refinements += 1;

        let delta = step * NEWTON_DELTA_FRACTION;
        let e2 = energy_at(function, &origin, direction, step + delta)?;
        let e3 = energy_at(function, &origin, direction, step + 2.0 * delta)?;

        let denom = e3 - 2.0 * e2 + e1;
        if denom == 0.0 {
            break;
        }
        step = (step - delta * (e2 - e1) / denom).abs();
        if !step.is_finite() {
            break;
        }
        if step > max_step {
            debug!(step, max_step, "Damping Newton step length");
            step = max_step;
        }
    }

    if opt_step == 0.0 {
        let fallback = NEWTON_FALLBACK_FRACTION * NEWTON_DEFAULT_STEP / scale;
        let energy = energy_at(function, &origin, direction, fallback)?;
        if energy < opt_energy {
            opt_step = fallback;
        }
    }

    take_step(function, &origin, direction, opt_step);
    Ok(opt_step * scale)
}

fn take_step(
    function: &mut ForceFieldFunction,
    origin: &[Point3<f64>],
    direction: &[Vector3<f64>],
    step: f64,
) {
    for ((position, start), d) in function
        .positions_mut()
        .iter_mut()
        .zip(origin)
        .zip(direction)
    {
        *position = start + d * step;
    }
}

fn energy_at(
    function: &mut ForceFieldFunction,
    origin: &[Point3<f64>],
    direction: &[Vector3<f64>],
    step: f64,
) -> Result<f64, EngineError> {
    take_step(function, origin, direction, step);
    function.compute(Computation::Value)
}

fn net_displacement(start: &[Point3<f64>], end: &[Point3<f64>]) -> f64 {
    start
        .iter()
        .zip(end)
        .map(|(a, b)| (b - a).norm_squared())
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{carbon_pair, distorted_ethane, function_for, relaxed_water};

    fn forces(function: &mut ForceFieldFunction) -> Vec<Vector3<f64>> {
        function.compute(Computation::Gradients).unwrap();
        function.gradients().to_vec()
    }

    #[test]
    fn simple_search_lowers_energy_along_forces() {
        let mut function = function_for(&distorted_ethane());
        let start = function.compute(Computation::Value).unwrap();
        let direction = forces(&mut function);

        let moved = simple(&mut function, &direction).unwrap();
        let end = function.compute(Computation::Value).unwrap();
        assert!(moved > 0.0);
        assert!(end < start);
    }

    #[test]
    fn newton_search_lowers_energy_along_forces() {
        let mut function = function_for(&distorted_ethane());
        let start = function.compute(Computation::Value).unwrap();
        let mut direction = forces(&mut function);

        let moved = newton_2num(&mut function, &mut direction).unwrap();
        let end = function.compute(Computation::Value).unwrap();
        assert!(moved > 0.0);
        assert!(end < start);
    }

    #[test]
    fn uphill_direction_never_raises_energy() {
        for kind in [LineSearchType::Simple, LineSearchType::Newton2Num] {
            let molecule = distorted_ethane();
            let mut function = function_for(&molecule);
            let start = function.compute(Computation::Value).unwrap();
            let mut direction: Vec<_> = forces(&mut function).iter().map(|f| -f).collect();

            search(kind, &mut function, &mut direction).unwrap();
            let end = function.compute(Computation::Value).unwrap();
            assert!(end <= start, "{kind} raised the energy from {start} to {end}");
        }
    }

    #[test]
    fn simple_search_caps_per_atom_displacement() {
        let mut function = function_for(&carbon_pair(1.2));
        let start = function.compute(Computation::Value).unwrap();
        let origin = function.positions().to_vec();
        let direction = vec![Vector3::new(-1000.0, 0.0, 0.0), Vector3::new(1000.0, 0.0, 0.0)];

        simple(&mut function, &direction).unwrap();
        let end = function.compute(Computation::Value).unwrap();
        let separation = (function.positions()[1] - function.positions()[0]).norm();
        assert!(end < start);
        assert!(separation > 1.2);
        for (before, after) in origin.iter().zip(function.positions()) {
            assert!((after - before).norm() <= TRUST_RADIUS * SIMPLE_MAX_TRIALS as f64 + 1e-9);
            assert!(after.y == 0.0 && after.z == 0.0);
        }
    }

    #[test]
    fn zero_direction_leaves_coordinates_in_place() {
        for kind in [LineSearchType::Simple, LineSearchType::Newton2Num] {
            let molecule = relaxed_water();
            let mut function = function_for(&molecule);
            let mut direction = vec![Vector3::zeros(); 3];
            let moved = search(kind, &mut function, &mut direction).unwrap();
            assert_eq!(moved, 0.0);
            assert_eq!(function.positions(), molecule.positions());
        }
    }

    #[test]
    fn newton_search_zeroes_non_finite_direction_entries() {
        let mut function = function_for(&distorted_ethane());
        let mut direction = forces(&mut function);
        direction[3] = Vector3::new(f64::NAN, 0.0, 0.0);
        direction[5] = Vector3::new(f64::INFINITY, 1.0, 0.0);
        let origin = function.positions().to_vec();

        newton_2num(&mut function, &mut direction).unwrap();
        assert_eq!(direction[3], Vector3::zeros());
        assert_eq!(direction[5], Vector3::zeros());
        assert_eq!(function.positions()[3], origin[3]);
        assert!(function.positions().iter().all(|p| p.coords.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn line_search_type_parses_names() {
        assert_eq!("Simple".parse::<LineSearchType>().unwrap(), LineSearchType::Simple);
        assert_eq!(
            "newton".parse::<LineSearchType>().unwrap(),
            LineSearchType::Newton2Num
        );
        assert!("wolfe".parse::<LineSearchType>().is_err());
        assert_eq!(LineSearchType::Newton2Num.to_string(), "newton");
    }
}
