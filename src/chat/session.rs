//! Session orchestrator
//!
//! Owns one [`SessionState`] and drives the handlers for it.

use super::error::ChatError;
use super::handlers;
use super::messages;
use super::navigation;
use super::router::{self, Route};
use super::state::{Message, Node, SessionState};
use crate::pokeapi::PokemonData;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Upper bound on automatic transitions in the opening walk
const MAX_AUTO_HOPS: usize = 8;

/// Summary of one session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub interaction_count: u64,
    pub current_node: Node,
    pub total_messages: usize,
}

pub struct ChatSession {
    state: SessionState,
    data: Arc<dyn PokemonData>,
}

impl ChatSession {
    /// Open a new conversation with a fresh id and run it up to the menu.
    pub async fn start(data: Arc<dyn PokemonData>) -> Result<(Self, Message), ChatError> {
        let session_id = format!("session_{}", Uuid::new_v4());
        let mut session = Self {
            state: SessionState::new(session_id),
            data,
        };
        let greeting = session.begin().await?;
        tracing::info!(session_id = %session.state.session_id, "Session started");
        Ok((session, greeting))
    }

    /// Start the conversation over. The session id is kept so the store key
    /// stays valid.
    pub async fn reset(&mut self) -> Result<Message, ChatError> {
        self.state = SessionState::new(self.state.session_id.clone());
        let greeting = self.begin().await?;
        tracing::info!(session_id = %self.state.session_id, "Session reset");
        Ok(greeting)
    }

    /// Handle one user message and return the reply.
    ///
    /// Blank input is answered without touching the state. An unexpected
    /// handler failure yields a generic error reply and leaves the state as
    /// it was.
    pub async fn process_message(&mut self, text: &str) -> Result<Message, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Message::assistant(messages::EMPTY_INPUT));
        }

        let pending = self.state.clone().with_input(text);
        let result = if navigation::is_back_command(text) {
            Ok(navigation::go_back(&pending))
        } else {
            handlers::handle(&pending, self.data.as_ref()).await
        };

        let next = match result {
            Ok(next) => next,
            Err(ChatError::Unexpected(reason)) => {
                tracing::warn!(
                    session_id = %self.state.session_id,
                    node = %self.state.current_node,
                    %reason,
                    "Handler failed"
                );
                return Ok(Message::assistant(messages::processing_error(&reason)));
            }
            Err(e) => return Err(self.fatal(e)),
        };

        next.validate().map_err(|e| self.fatal(e))?;
        self.state = next;
        self.latest_message()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            session_id: self.state.session_id.clone(),
            start_time: self.state.metadata.start_time,
            interaction_count: self.state.metadata.interaction_count,
            current_node: self.state.current_node,
            total_messages: self.state.messages.len(),
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn session_id(&self) -> &str {
        &self.state.session_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Walk from START following the routers until the machine waits.
    async fn begin(&mut self) -> Result<Message, ChatError> {
        let mut state = self.state.clone();

        for _ in 0..MAX_AUTO_HOPS {
            let from = state.current_node;
            state = handlers::handle(&state, self.data.as_ref()).await?;
            state.validate().map_err(|e| self.fatal(e))?;

            match router::route(from, &state) {
                Route::Goto(next) => state = state.goto(next),
                Route::Suspend | Route::Terminal => {
                    self.state = state;
                    return self.latest_message();
                }
            }
        }

        Err(self.fatal(ChatError::InvariantViolation(
            "automatic transitions did not settle".to_string(),
        )))
    }

    fn latest_message(&self) -> Result<Message, ChatError> {
        self.state
            .last_message()
            .cloned()
            .ok_or_else(|| self.fatal(ChatError::InvariantViolation("transcript is empty".to_string())))
    }

    fn fatal(&self, err: ChatError) -> ChatError {
        tracing::error!(
            session_id = %self.state.session_id,
            node = %self.state.current_node,
            error = %err,
            "Session invariant violated"
        );
        err
    }
}
