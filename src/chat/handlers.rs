//! Node handlers
//!
//! Each handler takes the current state and the data client and returns a
//! new state. Lookup failures, bad input and upstream errors are all turned
//! into assistant messages here; only unexpected failures reach the caller.

use super::error::ChatError;
use super::messages::{self, Outcome};
use super::state::{MessageData, Node, SessionState, WaitingFor};
use crate::pokeapi::{ErrorCode, PokemonData, PokemonType, SUGGESTION_LIMIT};
use chrono::Utc;

// ============================================================================
// Menu keywords
// ============================================================================

/// Menu options in priority order. The first option with a keyword contained
/// in the input wins.
const MENU_OPTIONS: [(Node, &[&str]); 5] = [
    (
        Node::Search,
        &["1", "buscar", "procurar", "informação", "informacao"],
    ),
    (Node::Compare, &["2", "comparar", "comparação", "comparacao"]),
    (Node::Evolution, &["3", "evolução", "evolucao", "evoluir"]),
    (Node::TypeSearch, &["4", "tipo", "type"]),
    (Node::End, &["sair", "tchau", "bye"]),
];

/// Map a menu choice to its node; `None` when nothing matches.
pub fn classify_menu_choice(input: &str) -> Option<Node> {
    let input = input.trim().to_lowercase();
    MENU_OPTIONS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| input.contains(k)))
        .map(|(node, _)| *node)
}

/// Split compare input into exactly two trimmed, non-empty names.
pub fn parse_compare_input(input: &str) -> Option<[String; 2]> {
    let parts: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    parts.try_into().ok()
}

// ============================================================================
// Dispatch
// ============================================================================

/// Run the handler for the state's current node
pub async fn handle(
    state: &SessionState,
    data: &dyn PokemonData,
) -> Result<SessionState, ChatError> {
    tracing::debug!(
        session_id = %state.session_id,
        node = %state.current_node,
        "Running node handler"
    );

    match state.current_node {
        Node::Start => Ok(start(state)),
        Node::Menu => Ok(menu(state)),
        Node::Search => Ok(search(state, data).await),
        Node::Compare => compare(state, data).await,
        Node::Evolution => Ok(evolution(state, data).await),
        Node::TypeSearch => Ok(type_search(state, data).await),
        Node::End => Ok(end(state)),
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn start(state: &SessionState) -> SessionState {
    state
        .clone()
        .with_reply(messages::WELCOME)
        .waiting_for(Some(WaitingFor::MenuChoice))
        .with_error(None)
        .counted()
        .goto(Node::Menu)
}

fn menu(state: &SessionState) -> SessionState {
    if state.user_input.trim().is_empty() {
        return state.clone();
    }

    let choice = classify_menu_choice(&state.user_input);
    let (next_node, reply, waiting) = match choice {
        Some(node) => (node, messages::intro(node), WaitingFor::PokemonInput),
        None => (Node::Menu, messages::INVALID_CHOICE, WaitingFor::MenuChoice),
    };

    tracing::info!(
        session_id = %state.session_id,
        choice = %next_node,
        "Menu choice"
    );

    state
        .clone()
        .with_user_message(state.user_input.clone())
        .with_reply(reply)
        .waiting_for(Some(waiting))
        .counted()
        .consumed()
        .goto(next_node)
}

/// Navigation shortcut out of a working node without touching the data client
fn shortcut(state: SessionState, to: Node) -> SessionState {
    let (reply, waiting) = match to {
        Node::Evolution => (messages::GOING_TO_EVOLUTION, WaitingFor::PokemonInput),
        _ => (messages::BACK_TO_MENU, WaitingFor::MenuChoice),
    };
    // A listing only counts for the visit that showed it
    let state = if state.current_node == Node::TypeSearch {
        state.update_context(|ctx| ctx.last_type_searched = None)
    } else {
        state
    };
    state
        .with_reply(reply)
        .waiting_for(Some(waiting))
        .counted()
        .consumed()
        .goto(to)
}

async fn search(state: &SessionState, data: &dyn PokemonData) -> SessionState {
    let input = state.user_input.trim().to_lowercase();
    let next = state.clone().with_user_message(input.clone());

    if input.contains("menu") {
        return shortcut(next, Node::Menu);
    }
    if input.contains("evol") {
        return shortcut(next, Node::Evolution);
    }

    lookup(next, &input, data).await.0
}

/// Look up one Pokémon and its species, replying with the info card or a
/// not-found message with suggestions. Returns whether the lookup succeeded.
async fn lookup(state: SessionState, input: &str, data: &dyn PokemonData) -> (SessionState, bool) {
    let found = match data.get_pokemon(input).await {
        Ok(pokemon) => data
            .get_species(pokemon.species_id)
            .await
            .map(|species| (pokemon, species)),
        Err(e) => Err(e),
    };

    match found {
        Ok((pokemon, species)) => {
            tracing::info!(
                session_id = %state.session_id,
                pokemon = %pokemon.name,
                "Pokemon found"
            );
            let reply = messages::pokemon_info(&pokemon, &species);
            let pokemon = Box::new(pokemon);
            let next = state
                .with_reply_data(reply, MessageData::Pokemon(pokemon.clone()))
                .update_context(|ctx| ctx.pokemon_data = Some(pokemon))
                .with_error(None)
                .waiting_for(Some(WaitingFor::NextAction))
                .counted()
                .consumed();
            (next, true)
        }
        Err(e) => {
            tracing::info!(
                session_id = %state.session_id,
                input,
                error = %e,
                "Pokemon lookup failed"
            );
            let reply = if e.is_not_found() {
                match data.search_pokemon(input, SUGGESTION_LIMIT).await {
                    Ok(suggestions) if !suggestions.is_empty() => {
                        messages::not_found_with_suggestions(input, &suggestions)
                    }
                    Ok(_) => messages::not_found(input),
                    Err(suggest_err) => {
                        tracing::debug!(error = %suggest_err, "Suggestion lookup failed");
                        messages::not_found(input)
                    }
                }
            } else {
                messages::lookup_error(&e)
            };
            let next = state
                .with_reply(reply)
                .with_error(Some(e.code()))
                .waiting_for(Some(WaitingFor::PokemonInput))
                .counted()
                .consumed();
            (next, false)
        }
    }
}

async fn compare(state: &SessionState, data: &dyn PokemonData) -> Result<SessionState, ChatError> {
    let input = state.user_input.trim().to_string();
    let next = state.clone().with_user_message(input.clone());

    if input.to_lowercase().contains("menu") {
        return Ok(shortcut(next, Node::Menu));
    }

    let Some(names) = parse_compare_input(&input) else {
        return Ok(next
            .with_reply(messages::compare_error(messages::COMPARE_INSTRUCTIONS))
            .with_error(Some(ErrorCode::InvalidCompareInput))
            .waiting_for(Some(WaitingFor::PokemonInput))
            .counted()
            .consumed());
    };

    let records = match data.get_multiple_pokemon(&names).await {
        Ok(records) => records,
        Err(e) => {
            tracing::info!(session_id = %state.session_id, error = %e, "Comparison lookup failed");
            return Ok(next
                .with_reply(messages::compare_lookup_error(&e))
                .with_error(Some(e.code()))
                .waiting_for(Some(WaitingFor::PokemonInput))
                .counted()
                .consumed());
        }
    };

    let [first, second]: [_; 2] = records.try_into().map_err(|records: Vec<_>| {
        ChatError::Unexpected(format!("expected 2 records, got {}", records.len()))
    })?;

    let outcome = Outcome::of(&first, &second);
    let reply = messages::comparison(&first, &second, outcome);
    let payload = MessageData::Comparison {
        pokemon1: Box::new(first.clone()),
        pokemon2: Box::new(second.clone()),
    };

    Ok(next
        .with_reply_data(reply, payload)
        .update_context(|ctx| ctx.comparison_data = vec![first, second])
        .with_error(None)
        .waiting_for(Some(WaitingFor::NextAction))
        .counted()
        .consumed())
}

async fn evolution(state: &SessionState, data: &dyn PokemonData) -> SessionState {
    let input = state.user_input.trim().to_string();
    let next = state.clone().with_user_message(input.clone());

    if input.to_lowercase().contains("menu") {
        return shortcut(next, Node::Menu);
    }

    let result = async {
        let pokemon = data.get_pokemon(&input).await?;
        let species = data.get_species(pokemon.species_id).await?;
        let chain = data.get_evolution_chain(species.evolution_chain_id).await?;
        Ok::<_, crate::pokeapi::PokeApiError>((pokemon, chain))
    }
    .await;

    match result {
        Ok((pokemon, chain)) => {
            tracing::info!(
                session_id = %state.session_id,
                pokemon = %pokemon.name,
                forms = chain.len(),
                "Evolution chain resolved"
            );
            let reply = messages::evolution(&pokemon, &chain);
            next.with_reply_data(reply, MessageData::Evolution(chain.clone()))
                .update_context(|ctx| ctx.evolution_chain = Some(chain))
                .with_error(None)
                .waiting_for(Some(WaitingFor::NextAction))
                .counted()
                .consumed()
        }
        Err(e) => {
            tracing::info!(session_id = %state.session_id, error = %e, "Evolution lookup failed");
            next.with_reply(messages::evolution_error(&e))
                .with_error(Some(e.code()))
                .counted()
                .consumed()
        }
    }
}

async fn type_search(state: &SessionState, data: &dyn PokemonData) -> SessionState {
    let input = state.user_input.trim().to_lowercase();
    let next = state.clone().with_user_message(input.clone());

    if input.contains("menu") {
        return shortcut(next, Node::Menu);
    }

    let Ok(pokemon_type) = input.parse::<PokemonType>() else {
        if state.context.last_type_searched.is_some() {
            // The user is most likely picking a name from the listing
            let next = next.update_context(|ctx| ctx.last_type_searched = None);
            let (next, found) = lookup(next, &input, data).await;
            return if found { next.goto(Node::Search) } else { next };
        }
        return next
            .with_reply(messages::invalid_type(&input))
            .with_error(Some(ErrorCode::InvalidType))
            .waiting_for(Some(WaitingFor::PokemonInput))
            .counted()
            .consumed();
    };

    match data.get_pokemon_by_type(pokemon_type.as_str()).await {
        Ok(entries) => {
            tracing::info!(
                session_id = %state.session_id,
                pokemon_type = %pokemon_type,
                count = entries.len(),
                "Type listing"
            );
            let reply = messages::type_listing(pokemon_type, &entries);
            next.with_reply_data(reply, MessageData::TypeList(entries))
                .update_context(|ctx| ctx.last_type_searched = Some(pokemon_type))
                .with_error(None)
                .waiting_for(Some(WaitingFor::NextAction))
                .counted()
                .consumed()
        }
        Err(e) => {
            tracing::info!(session_id = %state.session_id, error = %e, "Type lookup failed");
            next.with_reply(messages::type_lookup_error(pokemon_type, &e))
                .with_error(Some(e.code()))
                .waiting_for(Some(WaitingFor::PokemonInput))
                .counted()
                .consumed()
        }
    }
}

fn end(state: &SessionState) -> SessionState {
    let elapsed = Utc::now() - state.metadata.start_time;
    let next = state
        .clone()
        .with_user_message(state.user_input.clone())
        .counted();
    let reply = messages::session_summary(next.metadata.interaction_count, elapsed);
    next.with_reply(reply).waiting_for(None).consumed()
}
