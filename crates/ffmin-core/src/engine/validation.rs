use super::error::EngineError;
use super::function::{Computation, DifferenceScheme, ForceFieldFunction};
use crate::core::forcefield::terms::{EnabledTerms, TermKind};
use crate::core::forcefield::trace::Verbosity;
use nalgebra::Vector3;
use std::fmt::Write as _;
use tracing::{info, warn};

/// Largest accepted relative error for a term, in percent. `None` means the term is
/// reported but never fails validation.
pub fn tolerance(kind: TermKind) -> Option<f64> {
    match kind {
        TermKind::Bond | TermKind::Angle | TermKind::VanDerWaals | TermKind::Electrostatic => {
            Some(5.0)
        }
        TermKind::Torsion => Some(8.0),
        TermKind::OutOfPlane => None,
    }
}

/// Numerical and analytic force on one atom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomGradientCheck {
    pub atom: usize,
    pub numerical: Vector3<f64>,
    pub analytical: Vector3<f64>,
    /// Per-component `|num - ana| / max(|num|, 1) * 100`.
    pub relative_error: Vector3<f64>,
}

impl AtomGradientCheck {
    fn new(atom: usize, numerical: Vector3<f64>, analytical: Vector3<f64>) -> Self {
        let relative_error = numerical.zip_map(&analytical, |num, ana| {
            (num - ana).abs() / num.abs().max(1.0) * 100.0
        });
        Self {
            atom,
            numerical,
            analytical,
            relative_error,
        }
    }

    pub fn max_error(&self) -> f64 {
        self.relative_error.max()
    }
}

/// Comparison for one term, or for the total when `kind` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TermGradientCheck {
    pub kind: Option<TermKind>,
    pub tolerance: Option<f64>,
    pub atoms: Vec<AtomGradientCheck>,
}

impl TermGradientCheck {
    pub fn title(&self) -> &'static str {
        self.kind.map_or("TOTAL", |kind| kind.title())
    }

    pub fn max_error(&self) -> f64 {
        self.atoms
            .iter()
            .map(AtomGradientCheck::max_error)
            .fold(0.0, f64::max)
    }

    pub fn passed(&self) -> bool {
        self.tolerance.is_none_or(|limit| self.max_error() <= limit)
    }
}

/// Result of [`validate_gradients`].
#[derive(Debug, Clone, PartialEq)]
pub struct GradientReport {
    pub total: TermGradientCheck,
    pub terms: Vec<TermGradientCheck>,
}

impl GradientReport {
    /// True when every gating term is within its tolerance.
    pub fn passed(&self) -> bool {
        self.terms.iter().all(TermGradientCheck::passed)
    }

    pub fn term(&self, kind: TermKind) -> Option<&TermGradientCheck> {
        self.terms.iter().find(|check| check.kind == Some(kind))
    }

    pub fn failures(&self) -> impl Iterator<Item = &TermGradientCheck> {
        self.terms.iter().filter(|check| !check.passed())
    }

    /// Renders the report as per-term tables.
    pub fn render(&self) -> String {
        let mut out = String::from("\nV A L I D A T E   G R A D I E N T S\n");
        for check in std::iter::once(&self.total).chain(&self.terms) {
            let _ = writeln!(out, "\n{}\n", check.title());
            let _ = writeln!(
                out,
                "ATOM IDX      NUMERICAL GRADIENT           ANALYTICAL GRADIENT        REL. ERROR (%)   "
            );
            let _ = writeln!(
                out,
                "----------------------------------------------------------------------------------------"
            );
            for row in &check.atoms {
                let (n, a, e) = (row.numerical, row.analytical, row.relative_error);
                let _ = writeln!(
                    out,
                    "{:2}       ({:7.3}, {:7.3}, {:7.3})  ({:7.3}, {:7.3}, {:7.3})  ({:5.2}, {:5.2}, {:5.2})",
                    row.atom + 1,
                    n.x,
                    n.y,
                    n.z,
                    a.x,
                    a.y,
                    a.z,
                    e.x,
                    e.y,
                    e.z
                );
            }
            let verdict = match check.tolerance {
                Some(limit) if check.passed() => format!("PASSED (<= {limit}%)"),
                Some(limit) => format!("FAILED (> {limit}%)"),
                None => "NOT CHECKED".to_string(),
            };
            let _ = writeln!(out, "max error {:.3}%  {verdict}", check.max_error());
        }
        out
    }
}

/// Compares the analytic forces of every atom with central finite differences, for
/// the currently enabled terms as a whole and for each term on its own.
///
/// The term enablement in place before the call is restored afterwards, including
/// on error, and the value and forces are recomputed for it so that
/// [`ForceFieldFunction::value`] and [`ForceFieldFunction::gradients`] describe the
/// caller's configuration again. The rendered report is written to the trace sink
/// at low verbosity.
pub fn validate_gradients(function: &mut ForceFieldFunction) -> Result<GradientReport, EngineError> {
    if !function.is_set_up() {
        return Err(EngineError::NotSetUp);
    }

    let enabled = function.enabled_terms();
    let result = run_checks(function, enabled);
    function.set_enabled_terms(enabled);
    let restored = function.compute(Computation::Gradients);
    let report = result?;
    restored?;

    let rendered = report.render();
    function.trace_with(Verbosity::Low, || rendered);

    if report.passed() {
        info!("Analytic gradients agree with finite differences");
    } else {
        for check in report.failures() {
            warn!(
                term = check.title(),
                max_error = check.max_error(),
                "Analytic gradient exceeds tolerance"
            );
        }
    }
    Ok(report)
}

fn run_checks(
    function: &mut ForceFieldFunction,
    enabled: EnabledTerms,
) -> Result<GradientReport, EngineError> {
    let total = check_terms(function, enabled, None)?;
    let mut terms = Vec::with_capacity(TermKind::ALL.len());
    for kind in TermKind::ALL {
        terms.push(check_terms(function, EnabledTerms::only(kind), Some(kind))?);
    }
    Ok(GradientReport { total, terms })
}

fn check_terms(
    function: &mut ForceFieldFunction,
    enabled: EnabledTerms,
    kind: Option<TermKind>,
) -> Result<TermGradientCheck, EngineError> {
    function.set_enabled_terms(enabled);
    function.compute(Computation::Gradients)?;
    let analytical = function.gradients().to_vec();

    let mut atoms = Vec::with_capacity(analytical.len());
    for (atom, analytic) in analytical.into_iter().enumerate() {
        let numerical = function.numerical_derivative(atom, DifferenceScheme::Central)?;
        atoms.push(AtomGradientCheck::new(atom, numerical, analytic));
    }

    Ok(TermGradientCheck {
        kind,
        tolerance: kind.and_then(tolerance),
        atoms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::params::ParameterStore;
    use crate::core::forcefield::registry::UffForceField;
    use crate::core::forcefield::trace::BufferSink;
    use crate::engine::fixtures::{distorted_ethane, function_for};

    #[test]
    fn relative_error_uses_unit_floor() {
        let check = AtomGradientCheck::new(
            0,
            Vector3::new(10.0, 0.5, 0.0),
            Vector3::new(9.0, 0.0, 0.0),
        );
        assert!((check.relative_error.x - 10.0).abs() < 1e-12);
        assert!((check.relative_error.y - 50.0).abs() < 1e-12);
        assert_eq!(check.relative_error.z, 0.0);
        assert!((check.max_error() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn tolerances_per_term() {
        assert_eq!(tolerance(TermKind::Bond), Some(5.0));
        assert_eq!(tolerance(TermKind::Torsion), Some(8.0));
        assert_eq!(tolerance(TermKind::OutOfPlane), None);
    }

    #[test]
    fn distorted_ethane_gradients_validate() {
        let mut function = function_for(&distorted_ethane());
        function.setup_electrostatics().unwrap();

        let report = validate_gradients(&mut function).unwrap();
        assert_eq!(report.terms.len(), TermKind::ALL.len());
        assert_eq!(report.total.atoms.len(), 8);
        assert!(report.passed(), "{}", report.render());
        assert!(report.term(TermKind::Bond).unwrap().max_error() < 1.0);
    }

    #[test]
    fn validation_restores_enabled_terms() {
        let mut function = function_for(&distorted_ethane());
        function.set_term_enabled(TermKind::Torsion, false);
        let before = function.enabled_terms();

        validate_gradients(&mut function).unwrap();
        assert_eq!(function.enabled_terms(), before);
    }

    #[test]
    fn validation_restores_value_and_forces() {
        let mut function = function_for(&distorted_ethane());
        function.compute(Computation::Gradients).unwrap();
        let value = function.value();
        let forces = function.gradients().to_vec();
        assert!(value.abs() > 1e-6);

        validate_gradients(&mut function).unwrap();
        assert!((function.value() - value).abs() < 1e-9);
        assert_eq!(function.gradients().len(), forces.len());
        for (after, before) in function.gradients().iter().zip(&forces) {
            assert!((after - before).norm() < 1e-9);
        }
    }

    #[test]
    fn report_is_written_to_trace_sink() {
        let mut function = function_for(&distorted_ethane());
        let sink = BufferSink::default();
        function.set_trace_sink(Box::new(sink.clone()));
        function.set_verbosity(Verbosity::Low);

        validate_gradients(&mut function).unwrap();
        let contents = sink.contents();
        assert!(contents.contains("V A L I D A T E   G R A D I E N T S"));
        assert!(contents.contains("BOND STRETCHING"));
        assert!(contents.contains("PASSED"));
    }

    #[test]
    fn validation_requires_setup() {
        let mut function =
            ForceFieldFunction::new(Box::new(UffForceField), ParameterStore::builtin());
        assert!(matches!(
            validate_gradients(&mut function),
            Err(EngineError::NotSetUp)
        ));
    }
}
