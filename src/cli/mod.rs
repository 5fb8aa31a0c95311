//! CLI command implementations for Eldritch.

pub(crate) mod balance;
pub(crate) mod check_config;
pub(crate) mod walk;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;

/// Output format for the `walk` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum WalkFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `balance` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BalanceFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}

impl From<eldritch::ConfigError> for CliError {
    fn from(e: eldritch::ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<eldritch::simulation::ScenarioError> for CliError {
    fn from(e: eldritch::simulation::ScenarioError) -> Self {
        Self::new(e.to_string())
    }
}
