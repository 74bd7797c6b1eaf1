//! Automatic transitions between nodes
//!
//! Routers are pure. They look at the state a handler produced and decide
//! whether the machine should keep going on its own or wait for the user.
//! Only the opening walk of a session follows them; a user turn runs exactly
//! one handler.

use super::state::{Node, SessionState};

/// Next step after a handler has run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Run the handler for this node next
    Goto(Node),
    /// Wait for user input
    Suspend,
    /// The conversation is over
    Terminal,
}

const EXIT_WORDS: [&str; 3] = ["sair", "tchau", "bye"];

fn is_exit(input: &str) -> bool {
    EXIT_WORDS.iter().any(|w| input.contains(w))
}

/// Route out of `from`, the node whose handler just produced `state`.
pub fn route(from: Node, state: &SessionState) -> Route {
    let input = state.user_input.trim().to_lowercase();
    match from {
        Node::Start => Route::Goto(Node::Menu),
        Node::Menu => {
            if input.is_empty() && state.current_node == Node::Menu {
                Route::Suspend
            } else {
                Route::Goto(state.current_node)
            }
        }
        Node::Search | Node::Compare | Node::Evolution | Node::TypeSearch => {
            if input.is_empty() {
                Route::Suspend
            } else if input.contains("menu") {
                Route::Goto(Node::Menu)
            } else if from == Node::Search && input.contains("evol") {
                Route::Goto(Node::Evolution)
            } else if is_exit(&input) {
                Route::Goto(Node::End)
            } else {
                Route::Goto(from)
            }
        }
        Node::End => Route::Terminal,
    }
}
