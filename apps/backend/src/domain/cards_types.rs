//! Core card-related types: Card, Rank, Suit

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];
}

/// Ranks in game strength order: 3 is lowest, the big joker highest.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Rank {
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
    Two,
    SmallJoker,
    BigJoker,
}

impl Rank {
    pub const COUNT: usize = 15;

    pub const ALL: [Rank; Rank::COUNT] = [
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
        Rank::Two,
        Rank::SmallJoker,
        Rank::BigJoker,
    ];

    /// The thirteen suited ranks.
    pub const SUITED: [Rank; 13] = [
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
        Rank::Two,
    ];

    /// Position in strength order (0 for Three .. 14 for BigJoker).
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Rank> {
        Rank::ALL.get(i).copied()
    }

    pub const fn is_joker(self) -> bool {
        matches!(self, Rank::SmallJoker | Rank::BigJoker)
    }

    /// Straights, pair sequences and planes only run through 3..=A.
    pub const fn is_sequenceable(self) -> bool {
        (self as usize) <= (Rank::Ace as usize)
    }

    /// The next rank up in strength order, if any.
    pub fn succ(self) -> Option<Rank> {
        Rank::from_index(self.index() + 1)
    }
}

/// One of the 54 deck cards. Jokers carry no suit.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Option<Suit>,
}

impl Card {
    pub const SMALL_JOKER: Card = Card {
        rank: Rank::SmallJoker,
        suit: None,
    };
    pub const BIG_JOKER: Card = Card {
        rank: Rank::BigJoker,
        suit: None,
    };

    /// A suited card. Jokers are only available through the constants.
    pub const fn new(rank: Rank, suit: Suit) -> Card {
        Card {
            rank,
            suit: Some(suit),
        }
    }

    pub const fn is_joker(&self) -> bool {
        self.rank.is_joker()
    }
}

// Hands sort by strength first; suit only breaks ties for a stable order.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.rank.cmp(&other.rank) {
            std::cmp::Ordering::Equal => self.suit.cmp(&other.suit),
            ord => ord,
        }
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
