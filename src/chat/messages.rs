//! User-facing message templates
//!
//! Pure functions from domain records to text. Handlers pick a template and
//! supply the data; they never build strings themselves.

use super::state::Node;
use crate::pokeapi::{PokeApiError, Pokemon, PokemonType, Species, TypeEntry};
use chrono::TimeDelta;
use std::fmt::Write;

// ============================================================================
// Menu
// ============================================================================

pub const WELCOME: &str = "🎮 **Bem-vindo ao PokéDex Assistant!**

Olá, Treinador! Eu sou seu assistente pessoal do mundo Pokémon.

Posso te ajudar a:
1️⃣ Buscar informações de qualquer Pokémon
2️⃣ Comparar dois Pokémon lado a lado
3️⃣ Ver cadeias de evolução
4️⃣ Buscar Pokémon por tipo

Digite o **número da opção** ou me diga o que você quer fazer!";

pub const SEARCH_PROMPT: &str = "🔍 **Buscar Pokémon**

Digite o nome ou número do Pokémon que você quer conhecer!
Exemplo: \"Pikachu\" ou \"25\"";

pub const COMPARE_PROMPT: &str = "⚖️ **Comparar Pokémon**

Digite o nome ou número de dois Pokémon separados por vírgula.
Exemplo: \"Charizard, Blastoise\" ou \"6, 9\"";

pub const EVOLUTION_PROMPT: &str = "🔄 **Cadeia de Evolução**

Digite o nome ou número do Pokémon para ver sua linha evolutiva completa!";

pub const TYPE_PROMPT: &str = "🏷️ **Buscar por Tipo**

Digite o tipo de Pokémon que procura:
(fire, water, grass, electric, psychic, dragon, etc.)";

pub const FAREWELL: &str = "👋 Até logo, Treinador! Foi ótimo te ajudar na sua jornada Pokémon!";

pub const INVALID_CHOICE: &str = "❌ Desculpe, não entendi sua escolha.

Por favor, escolha uma das opções:
1️⃣ Buscar Pokémon
2️⃣ Comparar Pokémon
3️⃣ Ver Evolução
4️⃣ Buscar por Tipo

Ou digite \"sair\" para encerrar.";

/// Introductory text shown on entering `node`
pub fn intro(node: Node) -> &'static str {
    match node {
        Node::Start | Node::Menu => WELCOME,
        Node::Search => SEARCH_PROMPT,
        Node::Compare => COMPARE_PROMPT,
        Node::Evolution => EVOLUTION_PROMPT,
        Node::TypeSearch => TYPE_PROMPT,
        Node::End => FAREWELL,
    }
}

// ============================================================================
// Navigation
// ============================================================================

pub const BACK_TO_MENU: &str = "📋 Voltando ao menu principal...";

pub const GOING_TO_EVOLUTION: &str = "🔄 Indo para visualização de evolução...";

pub const ALREADY_AT_START: &str = "ℹ️ Você já está no início da conversa.";

pub const EMPTY_INPUT: &str = "❓ Por favor, digite alguma coisa!";

pub fn went_back(destination: Node) -> String {
    format!("⬅️ Voltando à etapa anterior...\n\n{}", intro(destination))
}

pub fn processing_error(reason: &str) -> String {
    format!("❌ Erro ao processar mensagem: {reason}\n\nDigite \"menu\" para voltar ao menu principal.")
}

// ============================================================================
// Search
// ============================================================================

fn stat(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub fn pokemon_info(pokemon: &Pokemon, species: &Species) -> String {
    let types: Vec<String> = pokemon.types.iter().map(|t| t.to_uppercase()).collect();
    let s = &pokemon.stats;

    let mut out = format!(
        "✨ **{}** #{}\n\n📝 {}\n\n🏷️ **Tipo(s):** {}\n📏 **Altura:** {}m\n⚖️ **Peso:** {}kg\n\n",
        pokemon.name_capitalized,
        pokemon.id,
        species.description,
        types.join(", "),
        pokemon.height,
        pokemon.weight,
    );

    let _ = write!(
        out,
        "📊 **Estatísticas:**\n❤️  HP: {}\n⚔️  Ataque: {}\n🛡️  Defesa: {}\n✨ Atq. Especial: {}\n🌟 Def. Especial: {}\n⚡ Velocidade: {}\n💪 **Total: {}**\n\n",
        stat(s.hp),
        stat(s.attack),
        stat(s.defense),
        stat(s.special_attack),
        stat(s.special_defense),
        stat(s.speed),
        s.total,
    );

    out.push_str("💫 **Habilidades:**\n");
    for ability in &pokemon.abilities {
        let hidden = if ability.is_hidden { " (oculta)" } else { "" };
        let _ = writeln!(out, "• {}{hidden}", ability.name);
    }

    if species.is_legendary {
        out.push_str("\n👑 **Pokémon Lendário!**\n");
    }
    if species.is_mythical {
        out.push_str("\n✨ **Pokémon Mítico!**\n");
    }

    out.push_str(
        "\n---\nO que você quer fazer agora?\n• Digite outro Pokémon para buscar\n• Digite \"evoluir\" para ver a cadeia evolutiva\n• Digite \"menu\" para voltar ao menu principal",
    );
    out
}

pub fn not_found(input: &str) -> String {
    format!("❌ Pokémon \"{input}\" não encontrado.\n\nTente outro nome ou número, ou digite \"menu\" para voltar.")
}

pub fn not_found_with_suggestions(input: &str, suggestions: &[String]) -> String {
    let mut out = format!("❌ Pokémon \"{input}\" não encontrado.\n\n🤔 Você quis dizer:\n");
    for s in suggestions {
        let _ = writeln!(out, "• {s}");
    }
    out.push_str("\nTente novamente ou digite \"menu\" para voltar.");
    out
}

pub fn lookup_error(err: &PokeApiError) -> String {
    format!("❌ Erro ao buscar Pokémon: {err}\n\nTente novamente ou digite \"menu\" para voltar.")
}

// ============================================================================
// Compare
// ============================================================================

/// Result of comparing two base stat totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    First,
    Second,
    Tie,
}

impl Outcome {
    pub fn of(first: &Pokemon, second: &Pokemon) -> Self {
        match first.stats.total.cmp(&second.stats.total) {
            std::cmp::Ordering::Greater => Self::First,
            std::cmp::Ordering::Less => Self::Second,
            std::cmp::Ordering::Equal => Self::Tie,
        }
    }
}

pub const COMPARE_INSTRUCTIONS: &str =
    "Por favor, forneça dois Pokémon separados por vírgula.\nExemplo: \"Pikachu, Raichu\"";

pub fn compare_error(reason: &str) -> String {
    format!("❌ {reason}\n\nTente novamente ou digite \"menu\" para voltar.")
}

pub fn compare_lookup_error(err: &PokeApiError) -> String {
    if err.is_not_found() {
        compare_error("Pokémon não encontrado")
    } else {
        compare_error(&format!("Falha na requisição à API: {err}"))
    }
}

pub fn comparison(first: &Pokemon, second: &Pokemon, outcome: Outcome) -> String {
    let (a, b) = (&first.stats, &second.stats);
    let rows = [
        ("HP", a.hp, b.hp),
        ("Ataque", a.attack, b.attack),
        ("Defesa", a.defense, b.defense),
        ("Atq. Especial", a.special_attack, b.special_attack),
        ("Def. Especial", a.special_defense, b.special_defense),
        ("Velocidade", a.speed, b.speed),
    ];

    let mut out = format!(
        "⚖️ **Comparação: {0} vs {1}**\n\n| Estatística | {0} | {1} |\n|---|---|---|\n",
        first.name_capitalized, second.name_capitalized,
    );
    for (label, x, y) in rows {
        let _ = writeln!(out, "| {label} | {} | {} |", stat(x), stat(y));
    }
    let _ = write!(
        out,
        "| **TOTAL** | **{}** | **{}** |\n\n🏷️ **Tipos:**\n• {}: {}\n• {}: {}\n\n",
        a.total,
        b.total,
        first.name_capitalized,
        first.types.join(", "),
        second.name_capitalized,
        second.types.join(", "),
    );

    match outcome {
        Outcome::First => {
            let _ = write!(out, "🏆 {} tem stats totais superiores!", first.name_capitalized);
        }
        Outcome::Second => {
            let _ = write!(out, "🏆 {} tem stats totais superiores!", second.name_capitalized);
        }
        Outcome::Tie => out.push_str("⚖️ Ambos têm stats totais iguais!"),
    }

    out.push_str("\n\n---\nDigite \"menu\" para voltar ou compare outros Pokémon!");
    out
}

// ============================================================================
// Evolution
// ============================================================================

pub fn evolution(pokemon: &Pokemon, chain: &[Pokemon]) -> String {
    let names: Vec<String> = chain
        .iter()
        .map(|p| format!("**{}**", p.name_capitalized))
        .collect();
    format!(
        "🔄 **Cadeia Evolutiva de {}**\n\n{}\n\n📊 Total de formas: {}\n\n---\nDigite outro Pokémon ou \"menu\" para voltar.",
        pokemon.name_capitalized,
        names.join(" ➡️ "),
        chain.len(),
    )
}

pub fn evolution_error(err: &PokeApiError) -> String {
    format!("❌ Erro ao buscar evolução: {err}\n\nTente novamente ou digite \"menu\" para voltar.")
}

// ============================================================================
// Type search
// ============================================================================

/// Entries listed inline; the rest are summarized as a count
const TYPE_LIST_SHOWN: usize = 15;

pub fn type_listing(pokemon_type: PokemonType, entries: &[TypeEntry]) -> String {
    let mut out = format!(
        "🏷️ **Pokémon do tipo {}**\n\n",
        pokemon_type.as_str().to_uppercase()
    );
    for (i, entry) in entries.iter().take(TYPE_LIST_SHOWN).enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, entry.name);
    }
    if entries.len() > TYPE_LIST_SHOWN {
        let _ = writeln!(out, "\n... e mais {} Pokémon!", entries.len() - TYPE_LIST_SHOWN);
    }
    out.push_str("\n---\nDigite o nome de um Pokémon para mais detalhes ou \"menu\" para voltar.");
    out
}

pub fn type_lookup_error(pokemon_type: PokemonType, err: &PokeApiError) -> String {
    format!(
        "❌ Erro ao buscar Pokémon do tipo {}: {err}\n\nTente novamente ou digite \"menu\" para voltar.",
        pokemon_type.as_str().to_uppercase()
    )
}

pub fn invalid_type(input: &str) -> String {
    let mut out = format!("❌ Tipo \"{input}\" não encontrado.\n\nTipos válidos incluem:\n");
    for row in PokemonType::ALL.chunks(5) {
        let names: Vec<&str> = row.iter().copied().map(PokemonType::as_str).collect();
        let _ = writeln!(out, "• {}", names.join(", "));
    }
    out.push_str("\nTente novamente ou digite \"menu\" para voltar.");
    out
}

// ============================================================================
// End
// ============================================================================

pub fn session_summary(interaction_count: u64, elapsed: TimeDelta) -> String {
    let secs = elapsed.num_seconds().max(0);
    format!(
        "👋 **Até logo, Treinador!**\n\n📊 **Resumo da sessão:**\n• Interações: {interaction_count}\n• Duração: {}m {}s\n\nObrigado por usar o PokéDex Assistant!\nVolte sempre que precisar de ajuda na sua jornada Pokémon! 🎮✨",
        secs / 60,
        secs % 60,
    )
}
