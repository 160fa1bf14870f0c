//! Error codes for the arena backend API.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses and terminal stream `log` lines.

use core::fmt;

/// Centralized error codes for the arena backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Invalid seat number
    InvalidSeat,
    /// Card token could not be parsed
    ParseCard,
    /// Card not in hand
    CardNotInHand,
    /// Cards do not form a combo
    InvalidCombo,
    /// Combo does not beat the requirement
    DoesNotBeat,
    /// Pass is not allowed for this seat right now
    PassNotAllowed,
    /// Out of turn
    OutOfTurn,
    /// Phase mismatch
    PhaseMismatch,
    /// Match already finished
    MatchFinished,
    /// Malformed session orchestration request
    InvalidSessionRequest,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    /// No outstanding human ticket for the key
    TicketNotFound,
    /// Session not found
    SessionNotFound,
    /// General not found error
    NotFound,

    // Conflicts
    /// Ticket was already invalidated
    TicketExpired,
    /// Generic conflict
    Conflict,

    // System Errors
    /// Upstream agent or relay failed
    UpstreamError,
    /// Operation timed out
    Timeout,
    /// Internal server error
    Internal,
    /// Internal server error (explicit problem code)
    InternalError,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSeat => "INVALID_SEAT",
            Self::ParseCard => "PARSE_CARD",
            Self::CardNotInHand => "CARD_NOT_IN_HAND",
            Self::InvalidCombo => "INVALID_COMBO",
            Self::DoesNotBeat => "DOES_NOT_BEAT",
            Self::PassNotAllowed => "PASS_NOT_ALLOWED",
            Self::OutOfTurn => "OUT_OF_TURN",
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::MatchFinished => "MATCH_FINISHED",
            Self::InvalidSessionRequest => "INVALID_SESSION_REQUEST",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            Self::TicketNotFound => "TICKET_NOT_FOUND",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::TicketExpired => "TICKET_EXPIRED",
            Self::Conflict => "CONFLICT",

            Self::UpstreamError => "UPSTREAM_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Internal => "INTERNAL",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
