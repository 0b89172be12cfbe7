use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::flight::FlightId;
use crate::flows::FlowTransitionError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no flight with id {flight_id}")]
    NotFound { flight_id: FlightId },
    #[error("flight {flight_id} has no available seats")]
    SoldOut { flight_id: FlightId },
}

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("could not read flight catalog `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse flight catalog `{path}` at line {line}: {source}")]
    Parse { path: PathBuf, line: usize, source: serde_json::Error },
    #[error("flight catalog `{path}` contains duplicate flight id {flight_id}")]
    DuplicateId { path: PathBuf, flight_id: FlightId },
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    CatalogLoad(#[from] CatalogLoadError),
    #[error(transparent)]
    FlowTransition(#[from] FlowTransitionError),
    #[error("benchmark failure: {0}")]
    Benchmark(String),
    #[error("integration failure: {0}")]
    Integration(String),
}

impl ApplicationError {
    /// Stable machine-readable class used in command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config_validation",
            Self::CatalogLoad(_) => "catalog_load",
            Self::FlowTransition(_) => "session_flow",
            Self::Benchmark(_) => "benchmark_load",
            Self::Integration(_) => "llm_integration",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "Configuration is invalid. Run `skydesk config` to inspect it.",
            Self::CatalogLoad(_) => "The flight catalog could not be loaded.",
            Self::FlowTransition(_) => "The session reached an unexpected state.",
            Self::Benchmark(_) => "The benchmark file could not be loaded.",
            Self::Integration(_) => {
                "The language model service is unavailable. Please retry shortly."
            }
        }
    }
}
