//! Command-line configuration, layered as CLI flag, then config file, then the
//! built-in defaults.

pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;
