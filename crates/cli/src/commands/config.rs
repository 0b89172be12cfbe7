use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use skydesk_core::config::{AppConfig, LoadOptions};
use skydesk_core::ApplicationError;
use toml::Value;

use crate::commands::CommandResult;

const COMMAND: &str = "config";

struct Field {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::from_error(COMMAND, &ApplicationError::from(error), 2);
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", field.key, field.value));
    }

    CommandResult::success(COMMAND, lines.join("\n"))
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let api_key = config
        .llm
        .api_key
        .as_ref()
        .map_or_else(|| "<unset>".to_string(), |key| redact_token(key.expose_secret()));

    vec![
        Field {
            key: "llm.provider",
            env_keys: &["SKYDESK_LLM_PROVIDER"],
            value: format!("{:?}", config.llm.provider),
        },
        Field {
            key: "llm.model",
            env_keys: &["SKYDESK_LLM_MODEL"],
            value: config.llm.model.clone(),
        },
        Field {
            key: "llm.base_url",
            env_keys: &["SKYDESK_LLM_BASE_URL"],
            value: config.llm.base_url.clone().unwrap_or_else(|| "<unset>".to_string()),
        },
        Field {
            key: "llm.temperature",
            env_keys: &["SKYDESK_LLM_TEMPERATURE"],
            value: config.llm.temperature.to_string(),
        },
        Field { key: "llm.api_key", env_keys: &["SKYDESK_LLM_API_KEY"], value: api_key },
        Field {
            key: "catalog.path",
            env_keys: &["SKYDESK_CATALOG_PATH"],
            value: config.catalog.path.display().to_string(),
        },
        Field {
            key: "logging.level",
            env_keys: &["SKYDESK_LOGGING_LEVEL", "SKYDESK_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key: "logging.format",
            env_keys: &["SKYDESK_LOGGING_FORMAT", "SKYDESK_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    ["skydesk.toml", "config/skydesk.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// Keeps a key's vendor prefix (`sk-`) and hides the rest.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
