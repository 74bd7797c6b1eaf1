//! Conversation state types

use super::error::ChatError;
use crate::pokeapi::{ErrorCode, Pokemon, PokemonType, TypeEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Nodes
// ============================================================================

/// One state of the dialogue machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Start,
    Menu,
    Search,
    Compare,
    Evolution,
    TypeSearch,
    End,
}

impl Node {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Menu => "menu",
            Self::Search => "search",
            Self::Compare => "compare",
            Self::Evolution => "evolution",
            Self::TypeSearch => "type_search",
            Self::End => "end",
        }
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Structured payload attached to an assistant message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageData {
    Pokemon(Box<Pokemon>),
    Comparison {
        pokemon1: Box<Pokemon>,
        pokemon2: Box<Pokemon>,
    },
    Evolution(Vec<Pokemon>),
    TypeList(Vec<TypeEntry>),
}

/// A transcript entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub data: Option<MessageData>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            data: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            data: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_data(mut self, data: MessageData) -> Self {
        self.data = Some(data);
        self
    }
}

// ============================================================================
// Context and metadata
// ============================================================================

/// What kind of input the conversation expects next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitingFor {
    MenuChoice,
    PokemonInput,
    NextAction,
}

/// Conversational payload carried between turns
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub pokemon_data: Option<Box<Pokemon>>,
    /// Empty, or the two records of the last comparison
    pub comparison_data: Vec<Pokemon>,
    pub evolution_chain: Option<Vec<Pokemon>>,
    pub waiting_for: Option<WaitingFor>,
    pub last_error: Option<ErrorCode>,
    /// Set after a type listing; cleared by the next speculative lookup
    pub last_type_searched: Option<PokemonType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub start_time: DateTime<Utc>,
    pub interaction_count: u64,
}

// ============================================================================
// Session state
// ============================================================================

/// Complete state of one conversation.
///
/// Handlers never mutate a state they were given. They clone it and thread
/// the copy through the consuming builder methods below.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub session_id: String,
    pub messages: Vec<Message>,
    pub user_input: String,
    pub current_node: Node,
    pub navigation_history: Vec<Node>,
    pub context: Context,
    pub metadata: Metadata,
}

impl SessionState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            user_input: String::new(),
            current_node: Node::Start,
            navigation_history: Vec::new(),
            context: Context::default(),
            metadata: Metadata {
                start_time: Utc::now(),
                interaction_count: 0,
            },
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.user_input = input.into();
        self
    }

    pub fn with_user_message(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    pub fn with_reply(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::assistant(content));
        self
    }

    pub fn with_reply_data(mut self, content: impl Into<String>, data: MessageData) -> Self {
        self.messages.push(Message::assistant(content).with_data(data));
        self
    }

    /// Move to `node`, remembering the current node for the back command.
    ///
    /// Nothing is pushed when staying put or when leaving START.
    pub fn goto(mut self, node: Node) -> Self {
        if node != self.current_node && self.current_node != Node::Start {
            self.navigation_history.push(self.current_node);
        }
        self.current_node = node;
        self
    }

    /// Pop the navigation history and move there without pushing.
    pub fn back(mut self) -> (Self, Option<Node>) {
        let destination = self.navigation_history.pop();
        if let Some(node) = destination {
            self.current_node = node;
        }
        (self, destination)
    }

    pub fn waiting_for(mut self, waiting_for: Option<WaitingFor>) -> Self {
        self.context.waiting_for = waiting_for;
        self
    }

    pub fn with_error(mut self, code: Option<ErrorCode>) -> Self {
        self.context.last_error = code;
        self
    }

    pub fn update_context(mut self, update: impl FnOnce(&mut Context)) -> Self {
        update(&mut self.context);
        self
    }

    /// Count one user-visible turn
    pub fn counted(mut self) -> Self {
        self.metadata.interaction_count += 1;
        self
    }

    /// Clear the pending input once a handler has used it
    pub fn consumed(mut self) -> Self {
        self.user_input.clear();
        self
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Check the structural invariants the handlers rely on
    pub fn validate(&self) -> Result<(), ChatError> {
        if self.session_id.is_empty() {
            return Err(ChatError::InvariantViolation(
                "session id is empty".to_string(),
            ));
        }
        if self.navigation_history.contains(&Node::Start) {
            return Err(ChatError::InvariantViolation(
                "start node found in navigation history".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_at_start() {
        let state = SessionState::new("s-1");
        assert_eq!(state.current_node, Node::Start);
        assert!(state.messages.is_empty());
        assert!(state.navigation_history.is_empty());
        assert_eq!(state.metadata.interaction_count, 0);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn goto_never_pushes_start_or_same_node() {
        let state = SessionState::new("s-1")
            .goto(Node::Menu)
            .goto(Node::Menu)
            .goto(Node::Search);
        assert_eq!(state.current_node, Node::Search);
        assert_eq!(state.navigation_history, vec![Node::Menu]);
    }

    #[test]
    fn back_pops_without_pushing() {
        let (state, dest) = SessionState::new("s-1")
            .goto(Node::Menu)
            .goto(Node::Compare)
            .back();
        assert_eq!(dest, Some(Node::Menu));
        assert_eq!(state.current_node, Node::Menu);
        assert!(state.navigation_history.is_empty());

        let (state, dest) = state.back();
        assert_eq!(dest, None);
        assert_eq!(state.current_node, Node::Menu);
    }

    #[test]
    fn builder_leaves_original_untouched() {
        let original = SessionState::new("s-1").with_input("pikachu");
        let next = original
            .clone()
            .with_user_message("pikachu")
            .counted()
            .consumed();

        assert_eq!(original.user_input, "pikachu");
        assert!(original.messages.is_empty());
        assert_eq!(next.user_input, "");
        assert_eq!(next.metadata.interaction_count, 1);
        assert_eq!(next.last_message().map(|m| m.role), Some(Role::User));
    }

    #[test]
    fn validate_rejects_broken_states() {
        let mut state = SessionState::new("");
        assert!(matches!(
            state.validate(),
            Err(ChatError::InvariantViolation(_))
        ));

        state.session_id = "s-1".into();
        state.navigation_history.push(Node::Start);
        assert!(matches!(
            state.validate(),
            Err(ChatError::InvariantViolation(_))
        ));
    }

    #[test]
    fn state_serializes_camel_case() {
        let state = SessionState::new("s-1")
            .goto(Node::TypeSearch)
            .waiting_for(Some(WaitingFor::MenuChoice))
            .with_error(Some(ErrorCode::InvalidType));
        let value = serde_json::to_value(&state).unwrap();

        assert_eq!(value["currentNode"], "type_search");
        assert_eq!(value["context"]["waitingFor"], "menu_choice");
        assert_eq!(value["context"]["lastError"], "INVALID_TYPE");
        assert_eq!(value["metadata"]["interactionCount"], 0);
    }

    #[test]
    fn every_node_has_a_distinct_name() {
        let nodes = [
            Node::Start,
            Node::Menu,
            Node::Search,
            Node::Compare,
            Node::Evolution,
            Node::TypeSearch,
            Node::End,
        ];
        let names: std::collections::HashSet<_> = nodes.iter().map(|n| n.as_str()).collect();
        assert_eq!(names.len(), nodes.len());
        for node in nodes {
            assert_eq!(serde_json::to_value(node).unwrap(), node.as_str());
        }
    }
}
