pub mod chat;
pub mod config;
pub mod eval;

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use skydesk_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use skydesk_core::{ApplicationError, FlightCatalog, FlowTransitionError};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            report: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            report: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Failure derived from an [`ApplicationError`], keeping its class.
    pub fn from_error(command: &str, error: &ApplicationError, exit_code: u8) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), exit_code)
    }

    /// Completed run that carries a structured report. `passed` decides
    /// between `ok`/exit 0 and `fail`/exit 1.
    pub fn report(
        command: &str,
        passed: bool,
        message: impl Into<String>,
        report: impl Serialize,
    ) -> Self {
        let (status, exit_code) = if passed { ("ok", 0) } else { ("fail", 1) };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: status.to_string(),
            error_class: None,
            message: message.into(),
            report: serde_json::to_value(report).ok(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads configuration with the catalog override applied, installs logging,
/// and reads the flight catalog.
pub(crate) fn prepare_session(
    command: &str,
    catalog_override: Option<PathBuf>,
) -> Result<(AppConfig, FlightCatalog), CommandResult> {
    let options = LoadOptions {
        overrides: ConfigOverrides { catalog_path: catalog_override, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    };
    let config = AppConfig::load(options)
        .map_err(|error| CommandResult::from_error(command, &error.into(), 2))?;
    crate::init_logging(&config);

    let catalog = FlightCatalog::load(&config.catalog.path)
        .map_err(|error| CommandResult::from_error(command, &error.into(), 2))?;
    tracing::info!(
        event_name = "cli.catalog.loaded",
        command,
        path = %config.catalog.path.display(),
        flights = catalog.len(),
        "flight catalog loaded"
    );
    Ok((config, catalog))
}

/// Classifies an error raised while the agent was running. Session flow
/// violations keep their own class; everything else came from the model.
pub(crate) fn agent_failure(error: anyhow::Error) -> ApplicationError {
    match error.downcast_ref::<FlowTransitionError>() {
        Some(flow_error) => ApplicationError::FlowTransition(flow_error.clone()),
        None => ApplicationError::Integration(format!("{error:#}")),
    }
}

pub(crate) fn build_runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}
