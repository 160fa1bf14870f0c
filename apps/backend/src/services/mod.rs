//! Services: session orchestration, the human ticket desk and per-seat stats.

pub mod session;
pub mod stats;
pub mod tickets;

pub use session::{start_session, SessionEnv, SessionHandle, SessionRequest};
pub use tickets::{HumanDecision, TicketDesk};
