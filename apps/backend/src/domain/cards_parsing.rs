//! Card parsing and formatting for text tokens (e.g., "AS", "TD", "BJ")

use std::fmt;
use std::str::FromStr;

use super::cards_types::{Card, Rank, Suit};
use crate::errors::domain::{DomainError, ValidationKind};

impl Rank {
    /// Single-token label used in card tokens and event payloads.
    pub const fn label(self) -> &'static str {
        match self {
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "T",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::SmallJoker => "SJ",
            Rank::BigJoker => "BJ",
        }
    }

    pub fn from_label(s: &str) -> Option<Rank> {
        Rank::ALL.into_iter().find(|r| r.label() == s)
    }
}

impl Suit {
    pub const fn letter(self) -> char {
        match self {
            Suit::Spades => 'S',
            Suit::Hearts => 'H',
            Suit::Diamonds => 'D',
            Suit::Clubs => 'C',
        }
    }
}

fn parse_err(s: &str) -> DomainError {
    DomainError::validation(ValidationKind::ParseCard, format!("Parse card: {s}"))
}

impl FromStr for Card {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SJ" => return Ok(Card::SMALL_JOKER),
            "BJ" => return Ok(Card::BIG_JOKER),
            _ => {}
        }
        if s.len() != 2 {
            return Err(parse_err(s));
        }
        let mut chars = s.chars();
        let rank_ch = chars.next().ok_or_else(|| parse_err(s))?;
        let suit_ch = chars.next().ok_or_else(|| parse_err(s))?;
        let rank = match rank_ch {
            '3' => Rank::Three,
            '4' => Rank::Four,
            '5' => Rank::Five,
            '6' => Rank::Six,
            '7' => Rank::Seven,
            '8' => Rank::Eight,
            '9' => Rank::Nine,
            'T' => Rank::Ten,
            'J' => Rank::Jack,
            'Q' => Rank::Queen,
            'K' => Rank::King,
            'A' => Rank::Ace,
            '2' => Rank::Two,
            _ => return Err(parse_err(s)),
        };
        let suit = match suit_ch {
            'S' => Suit::Spades,
            'H' => Suit::Hearts,
            'D' => Suit::Diamonds,
            'C' => Suit::Clubs,
            _ => return Err(parse_err(s)),
        };
        Ok(Card::new(rank, suit))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suit {
            Some(suit) => write!(f, "{}{}", self.rank.label(), suit.letter()),
            None => f.write_str(self.rank.label()),
        }
    }
}

/// Non-panicking helper to parse card tokens into Card instances.
pub fn try_parse_cards<I, S>(tokens: I) -> Result<Vec<Card>, DomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|s| s.as_ref().trim().parse::<Card>())
        .collect()
}

/// Space-separated tokens, e.g. `"3S 3H 4D"`.
pub fn format_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
