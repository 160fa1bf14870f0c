//! Domain layer: pure game logic types and helpers.

pub mod bidding;
pub mod cards_logic;
pub mod cards_parsing;
pub mod cards_serde;
pub mod cards_types;
pub mod combo;
pub mod dealing;
pub mod moves;
pub mod rules;
pub mod scoring;
pub mod seed_derivation;
pub mod seen_cards;
pub mod state;
pub mod tricks;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod tests_props_moves;
#[cfg(test)]
mod tests_scenarios;

// Re-exports for ergonomics
pub use cards_parsing::{format_cards, try_parse_cards};
pub use cards_types::{Card, Rank, Suit};
pub use combo::{classify, Combo, ComboKind};
pub use dealing::{deal, Deal};
pub use moves::generate_moves;
pub use rules::Four2Policy;
pub use seed_derivation::derive_dealing_seed;
pub use seen_cards::SeenCards;
pub use state::{MatchState, Phase, Role, Seat};
