//! DropCraft Logging
//!
//! Shared tracing setup for the `dropcraft` binary. Log lines go to stderr
//! so that command output on stdout (roots, proofs, JSON) stays clean for
//! piping.
//!
//! ## Usage
//!
//! ```no_run
//! use dropcraft_logging::{init, LogLevel};
//!
//! // `-v` on the command line
//! init(LogLevel::from_verbosity(1));
//!
//! // Or an explicit `--log-level warn`
//! let level: LogLevel = "warn".parse().unwrap();
//! init(level);
//! ```
//!
//! `RUST_LOG`, when set, overrides the level entirely.

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Crates whose events follow the selected level. Everything else is held
/// at `warn`.
const DROPCRAFT_TARGETS: &[&str] = &[
    "dropcraft",
    "dropcraft_core",
    "dropcraft_merkle",
    "dropcraft_distributor",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    /// Root installs, claims, file writes (default)
    #[default]
    Info,
    /// Rejected proofs, tree shapes
    Debug,
    Trace,
}

impl LogLevel {
    /// Map a `-v` count: none → `Info`, one → `Debug`, more → `Trace`
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => Self::Info,
            1 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// `--quiet` wins over any verbosity.
    pub fn from_flags(quiet: bool, verbosity: u8) -> Self {
        if quiet {
            Self::Error
        } else {
            Self::from_verbosity(verbosity)
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Filter directive: our crates at this level, dependencies at `warn`
    /// (or quieter, if this level is below `warn`).
    pub fn directive(&self) -> String {
        let floor = (*self).min(Self::Warn).as_str();
        let mut directive = floor.to_string();
        for target in DROPCRAFT_TARGETS {
            directive.push_str(&format!(",{}={}", target, self.as_str()));
        }
        directive
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

fn filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()))
}

/// Install the global subscriber. A subscriber that is already installed
/// is left in place.
pub fn init(level: LogLevel) {
    let _ = try_init(level);
}

/// Install the global subscriber, failing if one is already set.
pub fn try_init(level: LogLevel) -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(std::io::stderr)
        .with_target(level >= LogLevel::Debug)
        .try_init()
        .map_err(|e| e.to_string())
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(LogLevel::Trace.directive()))
        .with_test_writer()
        .try_init();
}
