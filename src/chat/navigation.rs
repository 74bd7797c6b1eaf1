//! The back command

use super::messages;
use super::state::{Node, SessionState, WaitingFor};

/// Exact, case-insensitive match only; "backtrack" is not a back command.
pub fn is_back_command(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("voltar") || input.eq_ignore_ascii_case("back")
}

fn waiting_at(node: Node) -> Option<WaitingFor> {
    match node {
        Node::Start | Node::Menu => Some(WaitingFor::MenuChoice),
        Node::Search | Node::Compare | Node::Evolution | Node::TypeSearch => {
            Some(WaitingFor::PokemonInput)
        }
        Node::End => None,
    }
}

/// Return to the previous node and re-show its introduction.
///
/// The destination handler does not run. With an empty history the node is
/// left unchanged and the user is told they are already at the start.
pub fn go_back(state: &SessionState) -> SessionState {
    let input = state.user_input.clone();
    let (next, destination) = state.clone().with_user_message(input).back();

    let next = match destination {
        Some(node) => {
            tracing::debug!(session_id = %next.session_id, node = %node, "Navigated back");
            next.with_reply(messages::went_back(node))
                .waiting_for(waiting_at(node))
        }
        None => next.with_reply(messages::ALREADY_AT_START),
    };

    next.counted().consumed()
}
