//! Agent Runtime - LLM-mediated flight search and booking
//!
//! This crate is the dialogue side of skydesk. It:
//! - Sends the conversation to a completion service in structured or prose mode
//! - Extracts a typed action from whatever text comes back
//! - Validates booking references against what the user has been shown
//! - Drives flight search and seat booking in `skydesk-core`
//! - Replays scripted benchmarks and scores the agent's answers
//!
//! # Architecture
//!
//! Each call to [`runtime::AgentRuntime::converse`] runs one turn:
//! 1. **Completion** (`llm`, `openai`) - history in, text out
//! 2. **Interpretation** (`interpreter`) - text to [`interpreter::Intent`]
//! 3. **Guardrails** (`guardrails`) - is the requested flight bookable here?
//! 4. **Domain call** - search or book against the catalog
//! 5. **Response** (`response`) - exactly one typed [`response::AgentResponse`]
//!
//! # Safety Principle
//!
//! The model only translates. Which flights exist, whether a seat is left,
//! and whether an id may be booked are decided deterministically.

pub mod conversation;
pub mod evaluation;
pub mod guardrails;
pub mod interpreter;
pub mod llm;
pub mod openai;
pub mod prompts;
pub mod response;
pub mod runtime;

pub use conversation::{ConversationTurn, Role};
pub use evaluation::{evaluate, evaluate_file, load_benchmark, BenchmarkStep, EvaluationResult};
pub use llm::{CompletionMode, LlmClient, ScriptedLlmClient};
pub use openai::OpenAiCompatibleClient;
pub use response::{AgentResponse, ResponseKind};
pub use runtime::AgentRuntime;
