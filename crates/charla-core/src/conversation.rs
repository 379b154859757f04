//! Conversation state machine
//!
//! Drives one exchange at a time: a submission appends the user
//! message and hands back the prompt to dispatch; the eventual outcome
//! appends the bot reply (or the fixed fallback) and re-opens the
//! conversation for the next submission.

use anyhow::Result;
use tracing::warn;

use crate::message::Message;
use crate::store::{MessageStore, StoreError};

/// Fallback bot reply appended when the remote call fails.
pub const ERROR_REPLY: &str = "Sorry, I encountered an error processing your request.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
}

pub struct Conversation {
    store: MessageStore,
    phase: Phase,
}

impl Conversation {
    pub fn new(store: MessageStore) -> Self {
        Self {
            store,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_awaiting(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    /// Accepts `input` when idle. Returns the trimmed prompt to send
    /// to the remote endpoint, or `None` while a response is already
    /// outstanding (at most one request in flight, no queue). Blank
    /// input is rejected before any state change.
    pub fn submit(&mut self, input: &str) -> Result<Option<String>, StoreError> {
        if self.phase == Phase::AwaitingResponse {
            return Ok(None);
        }
        let text = input.trim();
        if text.is_empty() {
            return Err(StoreError::InvalidMessage);
        }
        self.store.append(Message::user(text))?;
        self.phase = Phase::AwaitingResponse;
        Ok(Some(text.to_string()))
    }

    /// Lands the outcome of the in-flight exchange. A reply without
    /// usable text counts as a failure and appends the fixed fallback
    /// instead. Always returns to idle.
    pub fn resolve(&mut self, outcome: Result<String>) {
        let message = match outcome {
            Ok(reply) if !reply.trim().is_empty() => Message::bot(reply),
            Ok(_) => Message::bot_error(ERROR_REPLY),
            Err(e) => {
                warn!(error = %e, "chat request failed");
                Message::bot_error(ERROR_REPLY)
            }
        };
        // Every arm carries non-blank content, so append cannot reject.
        if let Err(e) = self.store.append(message) {
            warn!(error = %e, "failed to append bot reply");
        }
        self.phase = Phase::Idle;
    }

    /// Empties the conversation and its persisted copy.
    pub fn clear(&mut self) {
        self.store.clear();
    }
}
