use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::info;

/// Detail level of the force-field trace tables.
///
/// `Low` reports setup progress and the minimizer step table, `Medium` adds the
/// per-term totals, and `High` lists every individual interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Verbosity {
    #[default]
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Error)]
#[error("Invalid verbosity '{0}' (expected none, low, medium or high)")]
pub struct ParseVerbosityError(String);

impl FromStr for Verbosity {
    type Err = ParseVerbosityError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "0" => Ok(Self::None),
            "low" | "1" => Ok(Self::Low),
            "medium" | "2" => Ok(Self::Medium),
            "high" | "3" => Ok(Self::High),
            _ => Err(ParseVerbosityError(s.to_string())),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{name}")
    }
}

/// Destination of trace lines. The core only ever writes to a sink.
pub trait TraceSink: Send {
    fn write_line(&mut self, line: &str);
}

/// Forwards every trace line to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn write_line(&mut self, line: &str) {
        info!(target: "ffmin::trace", "{}", line);
    }
}

/// Collects trace lines in memory. Clones share the same buffer, so a clone kept
/// by the caller observes the lines written through a boxed copy.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }
}

impl TraceSink for BufferSink {
    fn write_line(&mut self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// A sink paired with the verbosity that gates it.
pub struct Tracer {
    verbosity: Verbosity,
    sink: Box<dyn TraceSink>,
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new(Verbosity::None, Box::new(TracingSink))
    }
}

impl Tracer {
    pub fn new(verbosity: Verbosity, sink: Box<dyn TraceSink>) -> Self {
        Self { verbosity, sink }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    pub fn set_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.sink = sink;
    }

    #[inline]
    pub fn enabled(&self, level: Verbosity) -> bool {
        level != Verbosity::None && self.verbosity >= level
    }

    pub fn line(&mut self, level: Verbosity, line: &str) {
        if self.enabled(level) {
            self.sink.write_line(line);
        }
    }

    /// Like [`Tracer::line`], but only formats the line when it will be written.
    pub fn line_with<F: FnOnce() -> String>(&mut self, level: Verbosity, build: F) {
        if self.enabled(level) {
            self.sink.write_line(&build());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels_are_ordered() {
        assert!(Verbosity::None < Verbosity::Low);
        assert!(Verbosity::Low < Verbosity::Medium);
        assert!(Verbosity::Medium < Verbosity::High);
    }

    #[test]
    fn verbosity_parses_names_and_numbers() {
        assert_eq!("HIGH".parse::<Verbosity>().unwrap(), Verbosity::High);
        assert_eq!("1".parse::<Verbosity>().unwrap(), Verbosity::Low);
        assert!("loud".parse::<Verbosity>().is_err());
        assert_eq!(Verbosity::Medium.to_string(), "medium");
    }

    #[test]
    fn tracer_gates_lines_by_verbosity() {
        let buffer = BufferSink::new();
        let mut tracer = Tracer::new(Verbosity::Medium, Box::new(buffer.clone()));

        tracer.line(Verbosity::Low, "low");
        tracer.line(Verbosity::Medium, "medium");
        tracer.line(Verbosity::High, "high");
        tracer.line_with(Verbosity::High, || panic!("must not be formatted"));

        assert_eq!(buffer.lines(), vec!["low", "medium"]);
    }

    #[test]
    fn silent_tracer_writes_nothing() {
        let buffer = BufferSink::new();
        let mut tracer = Tracer::new(Verbosity::None, Box::new(buffer.clone()));
        tracer.line(Verbosity::Low, "setup");
        assert!(buffer.lines().is_empty());
        assert!(!tracer.enabled(Verbosity::None));
    }
}
