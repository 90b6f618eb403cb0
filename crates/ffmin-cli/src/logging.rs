use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt::{self},
    prelude::*,
};

/// Target of the force-field trace tables emitted by the library.
pub const TRACE_TARGET: &str = "ffmin::trace";

fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::ERROR
    } else {
        match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Console filter: the chosen log level, with the trace tables shown only when
/// requested regardless of that level.
pub fn console_filter(verbosity: u8, quiet: bool, show_trace: bool) -> Targets {
    let trace_level = if show_trace {
        LevelFilter::INFO
    } else {
        LevelFilter::OFF
    };
    Targets::new()
        .with_default(level_for(verbosity, quiet))
        .with_target(TRACE_TARGET, trace_level)
}

pub fn setup_logging(
    verbosity: u8,
    quiet: bool,
    show_trace: bool,
    log_file: Option<PathBuf>,
) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(console_filter(verbosity, quiet, show_trace));

    let subscriber = tracing_subscriber::registry().with(stderr_layer);

    if let Some(path) = log_file {
        let file = File::create(&path).map_err(CliError::Io)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_target(true)
            .with_filter(console_filter(verbosity.max(1), false, true));

        subscriber.with(file_layer).init();
    } else {
        subscriber.init();
    }

    Ok(())
}
