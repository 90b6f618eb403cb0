use super::{load_groups, load_structure};
use crate::cli::MinimizeArgs;
use crate::config::builder::build_minimization_config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use ffmin::core::io::bgf::BgfFile;
use ffmin::core::io::traits::MolecularFile;
use ffmin::engine::progress::ProgressReporter;
use ffmin::workflows;
use tracing::{info, warn};

pub fn run(args: MinimizeArgs) -> Result<()> {
    let app_config = build_minimization_config(&args)?;
    let (molecule, metadata) = load_structure(&app_config.input_path)?;
    let groups = load_groups(app_config.groups_path.as_deref())?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let optimization = &app_config.core_config.optimization;
    println!(
        "Minimizing {} atoms with {} ({} line search, at most {} steps)...",
        molecule.atom_count(),
        optimization.algorithm,
        optimization.line_search,
        optimization.max_steps
    );
    info!("Invoking the core minimization workflow...");

    let result =
        workflows::minimize::run(&molecule, &groups, &app_config.core_config, &reporter)?;

    if result.outcome.converged {
        println!(
            "Converged after {} steps: {:.5} -> {:.5} kJ/mol",
            result.outcome.steps, result.initial_energy, result.outcome.energy
        );
    } else {
        warn!("Minimization stopped at the step limit before converging.");
        println!(
            "Step limit reached after {} steps: {:.5} -> {:.5} kJ/mol",
            result.outcome.steps, result.initial_energy, result.outcome.energy
        );
    }

    let output_path = &app_config.output_path;
    info!("Writing minimized structure to {:?}", output_path);
    BgfFile::write_to_path(&result.molecule, &metadata, output_path).map_err(|e| {
        CliError::FileWriting {
            path: output_path.clone(),
            source: e.into(),
        }
    })?;
    println!("✓ Minimized structure written to: {}", output_path.display());

    Ok(())
}
