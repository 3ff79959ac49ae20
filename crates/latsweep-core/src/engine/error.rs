use thiserror::Error;

use super::config::ConfigError;
use crate::core::fit::polynomial::FitError;
use crate::core::io::pwscf_output::PwOutputError;
use crate::core::io::results::ResultsError;
use crate::workflows::execute::ExecutionSummary;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("I/O error on '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read output '{path}': {source}", path = path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: PwOutputError,
    },

    #[error("Fit failed: {source}")]
    Fit {
        #[from]
        source: FitError,
    },

    #[error("Failed to write results: {source}")]
    Results {
        #[from]
        source: ResultsError,
    },

    #[error("No energies extracted from '{dir}'. Check that calculations have completed.", dir = dir.display())]
    NoEnergies { dir: PathBuf },

    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "{} of {} calculation(s) failed: {}",
        .summary.failed(),
        .summary.outcomes.len(),
        .summary.describe_failures()
    )]
    Execution { summary: ExecutionSummary },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}
