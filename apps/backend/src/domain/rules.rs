use serde::{Deserialize, Serialize};

pub const PLAYERS: usize = 3;
pub const DECK_SIZE: usize = 54;
pub const HAND_SIZE: usize = 17;
pub const BOTTOM_SIZE: usize = 3;

/// Minimum lengths for the sequence shapes.
pub const MIN_STRAIGHT: usize = 5;
pub const MIN_PAIR_SEQUENCE: usize = 3;
pub const MIN_PLANE: usize = 2;

/// Which four-of-a-kind-with-two attachment shapes are legal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Four2Policy {
    #[default]
    Both,
    #[serde(rename = "singles")]
    SinglesOnly,
    #[serde(rename = "pairs")]
    PairsOnly,
}

impl Four2Policy {
    pub const fn allows_singles(self) -> bool {
        matches!(self, Four2Policy::Both | Four2Policy::SinglesOnly)
    }

    pub const fn allows_pairs(self) -> bool {
        matches!(self, Four2Policy::Both | Four2Policy::PairsOnly)
    }
}
