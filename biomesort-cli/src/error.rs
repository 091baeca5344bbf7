//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use biomesort::config::ConfigFileError;
use biomesort::pipeline::{PipelineError, RunSummary, SortError};
use biomesort::session::SessionError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be loaded
    Config(ConfigFileError),
    /// Failed to install the Ctrl-C handler
    Signal(String),
    /// The world could not be opened or closed
    Session(SessionError),
    /// The sort run stopped early
    Pipeline(PipelineError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        if let Some(summary) = self.partial_summary() {
            println!();
            println!("{}", summary);
        }
        eprintln!("Error: {}", self);

        match self {
            CliError::Session(SessionError::WorldNotFound(_)) => {
                eprintln!();
                eprintln!("--world must point at a world save directory, for example:");
                eprintln!("  ~/.minecraft/saves/MyWorld");
            }
            CliError::Session(SessionError::Open(_)) => {
                eprintln!();
                eprintln!("Make sure the directory is a Java Edition world (it must contain level.dat).");
            }
            CliError::Pipeline(PipelineError::TooManyLookupFailures { .. }) => {
                eprintln!();
                eprintln!("The world data may be damaged. Raise the limit with --max-lookup-failures");
                eprintln!("or set [pipeline] max_lookup_failures in the config file.");
            }
            _ => {}
        }

        process::exit(1)
    }

    /// Totals of a run that stopped part way, if the error carries them.
    pub fn partial_summary(&self) -> Option<&RunSummary> {
        match self {
            CliError::Pipeline(PipelineError::TooManyLookupFailures { summary, .. }) => {
                Some(summary)
            }
            _ => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Signal(msg) => write!(f, "Failed to set signal handler: {}", msg),
            CliError::Session(e) => write!(f, "{}", e),
            CliError::Pipeline(e) => write!(f, "Sort failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Session(e) => Some(e),
            CliError::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<SortError> for CliError {
    fn from(e: SortError) -> Self {
        match e {
            SortError::Session(e) => CliError::Session(e),
            SortError::Pipeline(e) => CliError::Pipeline(e),
        }
    }
}
