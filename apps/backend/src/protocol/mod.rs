//! Wire types shared by the HTTP surface and the session stream.

pub mod events;
pub mod human;

pub use events::{GameEvent, LogLevel, StreamEvent};
pub use human::HumanDecisionRequest;
