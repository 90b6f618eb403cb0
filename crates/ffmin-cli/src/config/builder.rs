use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileForcefieldConfig, FileMinimizationConfig};
use super::models::{EvaluationAppConfig, MinimizationAppConfig};
use crate::cli::{EvaluationArgs, MinimizeArgs};
use crate::error::{CliError, Result};
use ffmin::core::forcefield::terms::{EnabledTerms, TermKind};
use ffmin::engine::config as core_config;
use std::path::PathBuf;
use std::str::FromStr;

pub fn build_evaluation_config(args: &EvaluationArgs) -> Result<EvaluationAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(args)?;
    let ff_file = file_config.forcefield.take().unwrap_or_default();

    let (core_config, groups_path) = merge_evaluation(args, ff_file, &defaults)?;
    Ok(EvaluationAppConfig {
        input_path: args.input.clone(),
        groups_path,
        core_config,
    })
}

pub fn build_minimization_config(args: &MinimizeArgs) -> Result<MinimizationAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(&args.evaluation)?;
    let ff_file = file_config.forcefield.take().unwrap_or_default();
    let min_file = file_config.minimization.take().unwrap_or_default();

    let (evaluation, groups_path) = merge_evaluation(&args.evaluation, ff_file, &defaults)?;

    let algorithm = match (args.algorithm, min_file.algorithm.as_deref()) {
        (Some(algorithm), _) => algorithm,
        (None, Some(name)) => parse_value("minimization.algorithm", name)?,
        (None, None) => defaults.algorithm,
    };
    let line_search = match (args.line_search, min_file.line_search.as_deref()) {
        (Some(line_search), _) => line_search,
        (None, Some(name)) => parse_value("minimization.line-search", name)?,
        (None, None) => defaults.line_search,
    };
    let max_steps = args
        .steps
        .or(min_file.max_steps)
        .unwrap_or(defaults.max_steps);
    let energy_tolerance = args
        .econv
        .or(min_file.energy_tolerance)
        .unwrap_or(defaults.energy_tolerance);
    let update_pairs_frequency = args
        .update_pairs
        .or(min_file.update_pairs_frequency)
        .unwrap_or(defaults.update_pairs_frequency);

    let core_config = core_config::MinimizationConfigBuilder::new()
        .forcefield(&evaluation.forcefield)
        .parameters_path(evaluation.parameters_path)
        .enabled_terms(evaluation.enabled_terms)
        .electrostatics(evaluation.electrostatics)
        .cutoff(evaluation.cutoff)
        .verbosity(evaluation.verbosity)
        .algorithm(algorithm)
        .line_search(line_search)
        .max_steps(max_steps)
        .energy_tolerance(energy_tolerance)
        .update_pairs_frequency(update_pairs_frequency)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(MinimizationAppConfig {
        input_path: args.evaluation.input.clone(),
        output_path: args.output.clone(),
        groups_path,
        core_config,
    })
}

fn load_file_config(args: &EvaluationArgs) -> Result<FileConfig> {
    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    apply_set_values(file_config, &args.set_values)
}

fn merge_evaluation(
    args: &EvaluationArgs,
    ff_file: FileForcefieldConfig,
    defaults: &DefaultsConfig,
) -> Result<(core_config::EvaluationConfig, Option<PathBuf>)> {
    let forcefield = args
        .forcefield
        .clone()
        .or(ff_file.name)
        .unwrap_or_else(|| defaults.forcefield.clone());
    let parameters_path = args.params.clone().or(ff_file.parameters);
    let groups_path = args.groups.clone().or(ff_file.groups);

    let enabled_terms = match (&args.terms, &ff_file.terms) {
        (Some(terms), _) => terms.iter().copied().collect(),
        (None, Some(names)) => parse_terms("forcefield.terms", names)?,
        (None, None) => EnabledTerms::all(),
    };

    let electrostatics = match (
        args.electrostatics.with_electrostatics,
        args.electrostatics.no_electrostatics,
    ) {
        (true, false) => true,
        (false, true) => false,
        _ => ff_file.electrostatics.unwrap_or(defaults.electrostatics),
    };

    let verbosity = match (args.trace, ff_file.trace.as_deref()) {
        (Some(verbosity), _) => verbosity,
        (None, Some(level)) => parse_value("forcefield.trace", level)?,
        (None, None) => defaults.verbosity,
    };

    let config = core_config::EvaluationConfigBuilder::new()
        .forcefield(&forcefield)
        .parameters_path(parameters_path)
        .enabled_terms(enabled_terms)
        .electrostatics(electrostatics)
        .cutoff(args.cutoff.or(ff_file.cutoff))
        .verbosity(verbosity)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;
    Ok((config, groups_path))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CliError::Config(format!("Invalid value for {}: {}", key, e)))
}

fn parse_terms<S: AsRef<str>>(key: &str, names: &[S]) -> Result<EnabledTerms> {
    names
        .iter()
        .map(|name| parse_value::<TermKind>(key, name.as_ref()))
        .collect()
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "forcefield.name" => {
                ff_section(&mut config).name = Some(value_str.to_string());
            }
            "forcefield.parameters" => {
                ff_section(&mut config).parameters = Some(PathBuf::from(value_str));
            }
            "forcefield.groups" => {
                ff_section(&mut config).groups = Some(PathBuf::from(value_str));
            }
            "forcefield.terms" => {
                let names: Vec<String> = value_str.split(',').map(str::to_string).collect();
                parse_terms(key, &names)?;
                ff_section(&mut config).terms = Some(names);
            }
            "forcefield.electrostatics" => {
                ff_section(&mut config).electrostatics = Some(parse_value(key, value_str)?);
            }
            "forcefield.cutoff" => {
                ff_section(&mut config).cutoff = Some(parse_value(key, value_str)?);
            }
            "forcefield.trace" => {
                ff_section(&mut config).trace = Some(value_str.to_string());
            }
            "minimization.algorithm" => {
                min_section(&mut config).algorithm = Some(value_str.to_string());
            }
            "minimization.line-search" => {
                min_section(&mut config).line_search = Some(value_str.to_string());
            }
            "minimization.max-steps" => {
                min_section(&mut config).max_steps = Some(parse_value(key, value_str)?);
            }
            "minimization.energy-tolerance" => {
                min_section(&mut config).energy_tolerance = Some(parse_value(key, value_str)?);
            }
            "minimization.update-pairs-frequency" => {
                min_section(&mut config).update_pairs_frequency =
                    Some(parse_value(key, value_str)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

fn ff_section(config: &mut FileConfig) -> &mut FileForcefieldConfig {
    config.forcefield.get_or_insert_with(Default::default)
}

fn min_section(config: &mut FileConfig) -> &mut FileMinimizationConfig {
    config.minimization.get_or_insert_with(Default::default)
}
