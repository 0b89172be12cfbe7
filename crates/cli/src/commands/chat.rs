use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use skydesk_agent::{AgentRuntime, LlmClient, OpenAiCompatibleClient};
use skydesk_core::config::AppConfig;

use crate::commands::{agent_failure, build_runtime, prepare_session, CommandResult};

const COMMAND: &str = "chat";
const PROMPT: &str = "> ";
const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

pub fn run(catalog: Option<PathBuf>) -> CommandResult {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with(
        catalog,
        |config| OpenAiCompatibleClient::from_config(&config.llm),
        stdin.lock(),
        stdout.lock(),
    )
}

/// Reads one user message per line until EOF or `exit`/`quit`, printing the
/// display form of each response.
pub fn run_with<L, F, R, W>(
    catalog: Option<PathBuf>,
    make_client: F,
    input: R,
    mut output: W,
) -> CommandResult
where
    L: LlmClient,
    F: FnOnce(&AppConfig) -> L,
    R: BufRead,
    W: Write,
{
    let (config, catalog) = match prepare_session(COMMAND, catalog) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };
    let runtime = match build_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let mut agent = AgentRuntime::new(make_client(&config), catalog);
    let mut turns = 0usize;
    let mut lines = input.lines();

    loop {
        if let Err(error) = write!(output, "{PROMPT}").and_then(|()| output.flush()) {
            return io_failure(error);
        }
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(error)) => return io_failure(error),
            None => break,
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&message) {
            break;
        }

        let response = match runtime.block_on(agent.converse(message)) {
            Ok(response) => response,
            Err(error) => {
                let error = agent_failure(error);
                let _ = writeln!(output, "{}", error.user_message());
                return CommandResult::from_error(COMMAND, &error, 3);
            }
        };
        turns += 1;
        if let Err(error) = writeln!(output, "{}", response.display()) {
            return io_failure(error);
        }
    }

    if let Err(error) = writeln!(output) {
        return io_failure(error);
    }
    CommandResult::success(
        COMMAND,
        format!("session {} ended after {turns} turns", agent.session_id()),
    )
}

fn io_failure(error: io::Error) -> CommandResult {
    CommandResult::failure(COMMAND, "terminal_io", format!("terminal i/o failed: {error}"), 4)
}
