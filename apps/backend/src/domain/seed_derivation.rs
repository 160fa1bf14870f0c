//! RNG seed derivation for deterministic sessions.
//!
//! A session seed fans out into one dealing seed per match so a replayed
//! session deals the same cards in the same order.

/// Derive the dealing seed for match `match_no` (1-based) of a session.
pub fn derive_dealing_seed(session_seed: u64, match_no: u32) -> u64 {
    session_seed
        .wrapping_add((match_no as u64).wrapping_mul(1_000_000))
        .wrapping_add(2)
}
