//! Property-based tests for the conversation engine
//!
//! Random message sequences are fed through a real session backed by the
//! in-memory data client; structural invariants must hold after every turn.

use super::navigation::is_back_command;
use super::session::ChatSession;
use super::state::Node;
use super::testing::{pokemon, species, MockPokemonData};
use crate::pokeapi::{PokemonData, TypeEntry};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn data() -> Arc<dyn PokemonData> {
    Arc::new(
        MockPokemonData::new()
            .with_pokemon(pokemon(1, "bulbasaur", [45, 49, 49, 65, 65, 45]))
            .with_pokemon(pokemon(2, "ivysaur", [60, 62, 63, 80, 80, 60]))
            .with_pokemon(pokemon(25, "pikachu", [35, 55, 40, 50, 50, 90]))
            .with_species(species(1, "bulbasaur", 1))
            .with_species(species(2, "ivysaur", 1))
            .with_chain(1, &[1, 2])
            .with_type(
                "grass",
                vec![TypeEntry {
                    name: "bulbasaur".into(),
                    url: "https://pokeapi.co/api/v2/pokemon/1/".into(),
                    id: Some(1),
                }],
            ),
    )
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_message() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("1".to_string()),
        Just("2".to_string()),
        Just("3".to_string()),
        Just("4".to_string()),
        Just("sair".to_string()),
        Just("menu".to_string()),
        Just("voltar".to_string()),
        Just("back".to_string()),
        Just("evoluir".to_string()),
        Just("pikachu".to_string()),
        Just("bulbasaur, pikachu".to_string()),
        Just("grass".to_string()),
        Just("missingno".to_string()),
        Just("   ".to_string()),
        "[a-z ,]{0,12}",
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_invariants_hold_for_any_conversation(
        messages in proptest::collection::vec(arb_message(), 0..25)
    ) {
        let rt = runtime();
        rt.block_on(async {
            let (mut session, _) = ChatSession::start(data()).await.unwrap();

            for text in &messages {
                let before = session.state().clone();
                session.process_message(text).await.unwrap();
                let after = session.state();

                prop_assert!(!after.navigation_history.contains(&Node::Start));
                prop_assert_ne!(after.current_node, Node::Start);
                prop_assert!(after.user_input.is_empty());
                prop_assert!(after.messages.len() >= before.messages.len());
                prop_assert_eq!(&after.messages[..before.messages.len()], &before.messages[..]);

                if text.trim().is_empty() {
                    prop_assert_eq!(after, &before);
                } else {
                    prop_assert_eq!(
                        after.metadata.interaction_count,
                        before.metadata.interaction_count + 1
                    );
                }
            }
            Ok(())
        })?;
    }

    #[test]
    fn prop_history_only_grows_on_node_change(
        messages in proptest::collection::vec(arb_message(), 0..25)
    ) {
        let rt = runtime();
        rt.block_on(async {
            let (mut session, _) = ChatSession::start(data()).await.unwrap();

            for text in &messages {
                let before = session.state().clone();
                session.process_message(text).await.unwrap();
                let after = session.state();

                if after.navigation_history.len() > before.navigation_history.len() {
                    prop_assert_ne!(after.current_node, before.current_node);
                    prop_assert_eq!(after.navigation_history.last(), Some(&before.current_node));
                }
            }
            Ok(())
        })?;
    }

    #[test]
    fn prop_back_with_empty_history_keeps_node(
        setup in proptest::collection::vec(arb_message(), 0..10),
        word in prop_oneof![Just("voltar"), Just("VOLTAR"), Just(" back ")],
    ) {
        let rt = runtime();
        rt.block_on(async {
            let (mut session, _) = ChatSession::start(data()).await.unwrap();
            for text in &setup {
                session.process_message(text).await.unwrap();
            }

            let depth = session.state().navigation_history.len();
            let node = session.state().current_node;
            session.process_message(word).await.unwrap();

            if depth == 0 {
                prop_assert_eq!(session.state().current_node, node);
            } else {
                prop_assert_eq!(session.state().navigation_history.len(), depth - 1);
            }
            Ok(())
        })?;
    }

    #[test]
    fn prop_back_command_requires_exact_word(prefix in "[a-z]{1,5}", suffix in "[a-z]{1,5}") {
        let glued_voltar = format!("{prefix}voltar");
        let glued_back = format!("back{suffix}");
        let spaced_back = format!("{prefix} back");
        prop_assert!(!is_back_command(&glued_voltar));
        prop_assert!(!is_back_command(&glued_back));
        prop_assert!(!is_back_command(&spaced_back));
    }
}
