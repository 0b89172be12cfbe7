use std::path::PathBuf;

use serde::Serialize;
use skydesk_agent::{evaluate, load_benchmark, AgentRuntime, LlmClient, OpenAiCompatibleClient};
use skydesk_core::config::AppConfig;
use skydesk_core::ApplicationError;

use crate::commands::{agent_failure, build_runtime, prepare_session, CommandResult};

const COMMAND: &str = "eval";

#[derive(Clone, Debug)]
pub struct EvalArgs {
    pub benchmark: PathBuf,
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct EvalReport {
    benchmark: String,
    steps: usize,
    score: f64,
    errors: Vec<String>,
}

pub fn run(args: &EvalArgs) -> CommandResult {
    run_with(args, |config| OpenAiCompatibleClient::from_config(&config.llm))
}

/// Same as [`run`] with the completion client supplied by the caller.
pub fn run_with<L, F>(args: &EvalArgs, make_client: F) -> CommandResult
where
    L: LlmClient,
    F: FnOnce(&AppConfig) -> L,
{
    let (config, catalog) = match prepare_session(COMMAND, args.catalog.clone()) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let steps = match load_benchmark(&args.benchmark) {
        Ok(steps) => steps,
        Err(error) => {
            return CommandResult::from_error(
                COMMAND,
                &ApplicationError::Benchmark(error.to_string()),
                2,
            );
        }
    };

    let runtime = match build_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let mut agent = AgentRuntime::new(make_client(&config), catalog);
    let outcome = runtime.block_on(evaluate(&mut agent, &steps));

    let result = match outcome {
        Ok(result) => result,
        Err(error) => return CommandResult::from_error(COMMAND, &agent_failure(error), 3),
    };

    let passed = result.errors.is_empty();
    let message = if passed {
        format!("all {} benchmark steps passed", steps.len())
    } else {
        format!("{} of {} benchmark steps failed", result.errors.len(), steps.len())
    };
    tracing::info!(
        event_name = "cli.eval.finished",
        session_id = %agent.session_id(),
        score = result.score,
        failures = result.errors.len(),
        "benchmark run finished"
    );

    CommandResult::report(
        COMMAND,
        passed,
        message,
        EvalReport {
            benchmark: args.benchmark.display().to_string(),
            steps: steps.len(),
            score: result.score,
            errors: result.errors,
        },
    )
}
