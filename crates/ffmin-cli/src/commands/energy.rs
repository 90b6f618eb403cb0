use super::{load_groups, load_structure};
use crate::cli::EvaluationArgs;
use crate::config::builder::build_evaluation_config;
use crate::error::Result;
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

    info!("Invoking the core energy workflow...");
    let result = workflows::energy::run(&molecule, &groups, &app_config.core_config, &reporter)?;

    println!("{:<24} {:>14}", "TERM", "ENERGY (kJ/mol)");
    for (kind, energy) in result.breakdown.iter() {
        if app_config.core_config.enabled_terms.is_enabled(kind) {
            println!("{:<24} {:>14.5}", kind.title(), energy);
        }
    }
    println!("{:<24} {:>14.5}", "TOTAL", result.energy);

    let rms_force = if result.forces.is_empty() {
        0.0
    } else {
        (result.forces.iter().map(|f| f.norm_squared()).sum::<f64>() / result.forces.len() as f64)
            .sqrt()
    };
    println!("{:<24} {:>14.5}", "RMS FORCE (kJ/mol/A)", rms_force);
    Ok(())
}
