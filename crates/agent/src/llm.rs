use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::conversation::ConversationTurn;

/// How the model is expected to answer a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// A single JSON action object, no prose.
    Structured,
    /// Unconstrained prose.
    Natural,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, history: &[ConversationTurn], mode: CompletionMode)
        -> Result<String>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    pub mode: CompletionMode,
    pub history: Vec<ConversationTurn>,
}

/// Replays canned completions in order and records every request.
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedLlmClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        match self.replies.lock() {
            Ok(mut replies) => replies.push_back(reply.into()),
            Err(poisoned) => poisoned.into_inner().push_back(reply.into()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn modes(&self) -> Vec<CompletionMode> {
        self.calls().into_iter().map(|call| call.mode).collect()
    }

    pub fn remaining(&self) -> usize {
        match self.replies.lock() {
            Ok(replies) => replies.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(
        &self,
        history: &[ConversationTurn],
        mode: CompletionMode,
    ) -> Result<String> {
        let call = RecordedCall { mode, history: history.to_vec() };
        match self.calls.lock() {
            Ok(mut calls) => calls.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }

        let next = match self.replies.lock() {
            Ok(mut replies) => replies.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        next.ok_or_else(|| anyhow!("scripted llm client ran out of replies"))
    }
}
