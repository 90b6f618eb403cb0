use clap::{Args, Parser, Subcommand};
use ffmin::core::forcefield::terms::TermKind;
use ffmin::core::forcefield::trace::Verbosity;
use ffmin::engine::config::Algorithm;
use ffmin::engine::minimize::line_search::LineSearchType;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "ffmin - Universal Force Field energies, gradient checks and local geometry minimization for BGF structures.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Minimize the geometry of a structure and write the result as BGF.
    Minimize(MinimizeArgs),
    /// Print the total energy and its per-term breakdown.
    Energy(EvaluationArgs),
    /// Compare analytic forces against finite differences.
    Validate(EvaluationArgs),
}

/// Input and force-field options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct EvaluationArgs {
    /// Path to the input structure in BGF format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Force field name, overriding the config file (e.g., 'UFF').
    #[arg(long, value_name = "NAME")]
    pub forcefield: Option<String>,

    /// CSV parameter table replacing the built-in UFF parameters.
    #[arg(long, value_name = "PATH")]
    pub params: Option<PathBuf>,

    /// TOML file restricting interactions to atom groups.
    #[arg(long, value_name = "PATH")]
    pub groups: Option<PathBuf>,

    /// Comma-separated list of energy terms to evaluate (bond, angle, torsion, oop, vdw, electrostatic).
    #[arg(long, value_name = "TERMS", value_delimiter = ',')]
    pub terms: Option<Vec<TermKind>>,

    /// Override `forcefield.electrostatics` from the config file.
    #[command(flatten)]
    pub electrostatics: ElectrostaticsSwitch,

    /// Non-bonded cutoff radius in Angstrom.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// Force-field trace level (none, low, medium, high).
    #[arg(short = 't', long, value_name = "LEVEL")]
    pub trace: Option<Verbosity>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S minimization.max-steps=500
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// A group to handle mutually exclusive flags for the electrostatic term.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct ElectrostaticsSwitch {
    /// Include charge-charge interactions.
    #[arg(long)]
    pub with_electrostatics: bool,
    /// Exclude charge-charge interactions.
    #[arg(long)]
    pub no_electrostatics: bool,
}

/// Arguments for the `minimize` subcommand.
#[derive(Args, Debug, Clone)]
pub struct MinimizeArgs {
    #[command(flatten)]
    pub evaluation: EvaluationArgs,

    /// Path for the minimized structure in BGF format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Minimization algorithm ('sd' or 'cg').
    #[arg(short, long, value_name = "NAME")]
    pub algorithm: Option<Algorithm>,

    /// Line search ('simple' or 'newton').
    #[arg(short, long, value_name = "NAME")]
    pub line_search: Option<LineSearchType>,

    /// Maximum number of minimizer steps.
    #[arg(short = 'n', long, value_name = "INT")]
    pub steps: Option<usize>,

    /// Convergence threshold on the energy change between steps, in kJ/mol.
    #[arg(short, long, value_name = "FLOAT")]
    pub econv: Option<f64>,

    /// Rebuild the cutoff pair masks every this many steps (0 never rebuilds).
    #[arg(long, value_name = "INT")]
    pub update_pairs: Option<usize>,
}
