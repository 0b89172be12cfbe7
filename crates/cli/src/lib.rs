pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use skydesk_core::config::{AppConfig, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "skydesk",
    about = "Skydesk flight booking assistant",
    long_about = "Chat with the flight booking assistant, replay benchmark files against it, and inspect configuration.",
    after_help = "Examples:\n  skydesk chat --catalog flights.jsonl\n  skydesk eval --benchmark benchmark.yaml\n  skydesk config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive booking conversation on stdin/stdout")]
    Chat {
        #[arg(long, help = "Flight catalog file (.json array or .jsonl)")]
        catalog: Option<PathBuf>,
    },
    #[command(about = "Run a YAML benchmark against a fresh session and print a JSON report")]
    Eval {
        #[arg(long, help = "Benchmark file with prompt/expected_type/expected_result steps")]
        benchmark: PathBuf,
        #[arg(long, help = "Flight catalog file (.json array or .jsonl)")]
        catalog: Option<PathBuf>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat { catalog } => commands::chat::run(catalog),
        Command::Eval { benchmark, catalog } => {
            commands::eval::run(&commands::eval::EvalArgs { benchmark, catalog })
        }
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Installs the fmt subscriber on stderr. Later calls are no-ops so commands
/// can be driven repeatedly from tests.
pub fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
