use super::{load_groups, load_structure};
use crate::cli::EvaluationArgs;
use crate::config::builder::build_evaluation_config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use ffmin::engine::progress::ProgressReporter;
use ffmin::workflows;
use tracing::info;

pub fn run(args: EvaluationArgs) -> Result<()> {
    let app_config = build_evaluation_config(&args)?;
    let (molecule, _) = load_structure(&app_config.input_path)?;
    let groups = load_groups(app_config.groups_path.as_deref())?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the core gradient validation workflow...");
    let report = workflows::validate::run(&molecule, &groups, &app_config.core_config, &reporter)?;

    println!("{:<24} {:>14} {:>10}", "TERM", "MAX ERROR (%)", "STATUS");
    for check in std::iter::once(&report.total).chain(&report.terms) {
        let status = match check.tolerance {
            Some(_) if check.passed() => "ok",
            Some(_) => "FAILED",
            None => "-",
        };
        println!(
            "{:<24} {:>14.3} {:>10}",
            check.title(),
            check.max_error(),
            status
        );
    }

    if report.passed() {
        println!("All analytic gradients agree with finite differences.");
        Ok(())
    } else {
        Err(CliError::GradientMismatch {
            terms: report
                .failures()
                .map(|check| check.title().to_string())
                .collect(),
        })
    }
}
