//! Scripted benchmark runner.
//!
//! Each step starts from a fresh transcript in structured mode but reuses the
//! same runtime, so seats booked by earlier steps stay booked.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use skydesk_core::catalog::FlightCatalog;
use thiserror::Error;
use tracing::info;

use crate::conversation::ConversationTurn;
use crate::llm::LlmClient;
use crate::response::{AgentResponse, ResponseKind};
use crate::runtime::AgentRuntime;

#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("could not read benchmark file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse benchmark file `{path}`: {source}")]
    Parse { path: PathBuf, source: serde_yaml::Error },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BenchmarkStep {
    pub prompt: String,
    #[serde(default)]
    pub expected_type: Option<String>,
    /// `None` when the key is absent. An explicit `null` is
    /// `Some(ExpectedResult::Id(None))`.
    #[serde(default, deserialize_with = "present_expected_result")]
    pub expected_result: Option<ExpectedResult>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExpectedResult {
    Ids(Vec<i64>),
    Id(Option<i64>),
}

fn present_expected_result<'de, D>(deserializer: D) -> Result<Option<ExpectedResult>, D::Error>
where
    D: Deserializer<'de>,
{
    ExpectedResult::deserialize(deserializer).map(Some)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub score: f64,
    pub conversation: Vec<ConversationTurn>,
    pub errors: Vec<String>,
}

pub fn load_benchmark(path: &Path) -> Result<Vec<BenchmarkStep>, BenchmarkError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| BenchmarkError::ReadFile { path: path.to_path_buf(), source })?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(&raw)
        .map_err(|source| BenchmarkError::Parse { path: path.to_path_buf(), source })
}

/// Runs every step once against `runtime`. A failing model call aborts the run.
pub async fn evaluate<L>(
    runtime: &mut AgentRuntime<L>,
    steps: &[BenchmarkStep],
) -> Result<EvaluationResult>
where
    L: LlmClient,
{
    let mut errors = Vec::new();
    let mut passed = 0usize;

    for (index, step) in steps.iter().enumerate() {
        let number = index + 1;
        runtime.begin_benchmark_step();
        let response = runtime.converse(&step.prompt).await?;

        match check_step(number, step, &response) {
            Ok(()) => passed += 1,
            Err(error) => errors.push(error),
        }

        info!(
            event_name = "eval.step.finished",
            session_id = %runtime.session_id(),
            step = number,
            total = steps.len(),
            response_kind = %response.kind(),
            passed,
            "benchmark step finished"
        );
    }

    let score = if steps.is_empty() { 0.0 } else { passed as f64 / steps.len() as f64 };
    Ok(EvaluationResult { score, conversation: runtime.conversation().to_vec(), errors })
}

/// Builds a fresh runtime over `catalog` and runs the benchmark file.
pub async fn evaluate_file<L>(
    llm: L,
    catalog: FlightCatalog,
    benchmark: &Path,
) -> Result<EvaluationResult>
where
    L: LlmClient,
{
    let steps = load_benchmark(benchmark)?;
    let mut runtime = AgentRuntime::new(llm, catalog);
    evaluate(&mut runtime, &steps).await
}

fn check_step(number: usize, step: &BenchmarkStep, response: &AgentResponse) -> Result<(), String> {
    let Some(expected_type) = step.expected_type.as_deref() else {
        return Err(format!("Test {number}: Missing 'expected_type' key in benchmark file."));
    };
    let expected_kind = expected_type
        .parse::<ResponseKind>()
        .map_err(|other| format!("Test {number}: Unrecognized response type {other}."))?;

    match (expected_kind, response) {
        (ResponseKind::Text, AgentResponse::Text { .. }) => Ok(()),
        (ResponseKind::Text, other) => Err(format!(
            "Test {number}: Expected text response but got {}.",
            other.kind().type_name()
        )),
        (ResponseKind::FindFlights, AgentResponse::FindFlights { available_flight_ids, .. }) => {
            let expected = match &step.expected_result {
                Some(ExpectedResult::Ids(ids)) => ids,
                Some(ExpectedResult::Id(Some(id))) => {
                    return Err(format!(
                        "Test {number}: Expected result for find-flights must be a list of flight ids, got {id}."
                    ));
                }
                Some(ExpectedResult::Id(None)) | None => {
                    return Err(format!(
                        "Test {number}: Missing 'expected_result' for find-flights."
                    ));
                }
            };

            let actual = available_flight_ids.iter().map(|id| id.0).collect::<BTreeSet<_>>();
            let wanted = expected.iter().copied().collect::<BTreeSet<_>>();
            if actual == wanted {
                Ok(())
            } else {
                let actual_ids = available_flight_ids.iter().map(|id| id.0).collect::<Vec<_>>();
                Err(format!(
                    "Test {number}: Expected available flights {expected:?} but got {actual_ids:?}."
                ))
            }
        }
        (ResponseKind::FindFlights, other) => Err(format!(
            "Test {number}: Expected FindFlightsResponse but got {}.",
            other.kind().type_name()
        )),
        (ResponseKind::BookFlight, AgentResponse::BookFlight { booked_flight_id, .. }) => {
            let expected = match &step.expected_result {
                Some(ExpectedResult::Id(expected)) => *expected,
                Some(ExpectedResult::Ids(ids)) => {
                    return Err(format!(
                        "Test {number}: Expected result for book-flight must be a single flight id or null, got {ids:?}."
                    ));
                }
                None => {
                    return Err(format!("Test {number}: Missing 'expected_result' for book-flight."));
                }
            };

            let actual = booked_flight_id.map(|id| id.0);
            if actual == expected {
                Ok(())
            } else {
                Err(format!(
                    "Test {number}: Expected booked flight {} but got {}.",
                    render_optional_id(expected),
                    render_optional_id(actual)
                ))
            }
        }
        (ResponseKind::BookFlight, other) => Err(format!(
            "Test {number}: Expected BookFlightResponse but got {}.",
            other.kind().type_name()
        )),
    }
}

fn render_optional_id(id: Option<i64>) -> String {
    id.map_or_else(|| "None".to_string(), |id| id.to_string())
}
