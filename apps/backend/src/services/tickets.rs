//! Ticket desk for human seats.
//!
//! A ticket is one outstanding human decision, keyed by
//! `(session_id, request_id)`. The orchestrator registers it and awaits the
//! returned waiter; `POST /api/human/decision` fulfills it. A ticket
//! resolves at most once. Registering a new ticket for a seat expires any
//! older ticket that seat still had open.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::ai::{DecisionPhase, Move};
use crate::domain::Seat;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};

/// An answer submitted for a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanDecision {
    pub phase: DecisionPhase,
    pub bid: Option<bool>,
    pub double: Option<bool>,
    pub mv: Option<Move>,
    pub reason: Option<String>,
}

/// Why a waiter resolved without an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketRejection {
    Expired,
    Superseded,
    SessionClosed,
}

pub type TicketWaiter = oneshot::Receiver<Result<HumanDecision, TicketRejection>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TicketKey {
    session_id: String,
    request_id: String,
}

#[derive(Debug)]
struct Ticket {
    seat: Seat,
    phase: DecisionPhase,
    tx: Option<oneshot::Sender<Result<HumanDecision, TicketRejection>>>,
    expired: bool,
}

#[derive(Debug, Default)]
pub struct TicketDesk {
    tickets: DashMap<TicketKey, Ticket>,
}

impl TicketDesk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Open a ticket and return the waiter that receives its resolution.
    pub fn register(
        &self,
        session_id: &str,
        request_id: &str,
        seat: Seat,
        phase: DecisionPhase,
    ) -> TicketWaiter {
        for mut entry in self.tickets.iter_mut() {
            let (key, ticket) = entry.pair_mut();
            if key.session_id == session_id && ticket.seat == seat && !ticket.expired {
                ticket.expired = true;
                if let Some(tx) = ticket.tx.take() {
                    let _ = tx.send(Err(TicketRejection::Superseded));
                }
                debug!(session_id, seat, request_id = %key.request_id, "superseded open ticket");
            }
        }

        let (tx, rx) = oneshot::channel();
        let key = TicketKey {
            session_id: session_id.to_string(),
            request_id: request_id.to_string(),
        };
        self.tickets.insert(
            key,
            Ticket {
                seat,
                phase,
                tx: Some(tx),
                expired: false,
            },
        );
        rx
    }

    /// Deliver `decision` to the ticket's waiter. The ticket is consumed.
    pub fn fulfill(
        &self,
        session_id: &str,
        request_id: &str,
        decision: HumanDecision,
    ) -> Result<Seat, DomainError> {
        let key = TicketKey {
            session_id: session_id.to_string(),
            request_id: request_id.to_string(),
        };
        let mut entry = self.tickets.get_mut(&key).ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Ticket,
                format!("no ticket {request_id} in session {session_id}"),
            )
        })?;

        if entry.expired {
            return Err(DomainError::conflict(
                ConflictKind::TicketExpired,
                format!("ticket {request_id} has expired"),
            ));
        }
        if entry.phase != decision.phase {
            return Err(DomainError::conflict(
                ConflictKind::TicketPhaseMismatch,
                format!(
                    "ticket {request_id} expects a {} decision, got {}",
                    entry.phase.as_str(),
                    decision.phase.as_str()
                ),
            ));
        }

        let seat = entry.seat;
        let tx = entry.tx.take();
        drop(entry);
        self.tickets.remove(&key);

        match tx.map(|tx| tx.send(Ok(decision))) {
            Some(Ok(())) => Ok(seat),
            _ => Err(DomainError::conflict(
                ConflictKind::TicketExpired,
                format!("ticket {request_id} is no longer awaited"),
            )),
        }
    }

    /// Expire a ticket; later fulfillment attempts get `TICKET_EXPIRED`.
    pub fn invalidate(&self, session_id: &str, request_id: &str) {
        let key = TicketKey {
            session_id: session_id.to_string(),
            request_id: request_id.to_string(),
        };
        if let Some(mut ticket) = self.tickets.get_mut(&key) {
            ticket.expired = true;
            if let Some(tx) = ticket.tx.take() {
                let _ = tx.send(Err(TicketRejection::Expired));
            }
        }
    }

    /// Drop every ticket of a session, rejecting any still awaited.
    pub fn close_session(&self, session_id: &str) {
        let before = self.tickets.len();
        self.tickets.retain(|key, ticket| {
            if key.session_id != session_id {
                return true;
            }
            if let Some(tx) = ticket.tx.take() {
                let _ = tx.send(Err(TicketRejection::SessionClosed));
            }
            false
        });
        let purged = before.saturating_sub(self.tickets.len());
        if purged > 0 {
            info!(session_id, purged, "closed session tickets");
        }
    }

    pub fn open_count(&self, session_id: &str) -> usize {
        self.tickets
            .iter()
            .filter(|e| e.key().session_id == session_id && !e.value().expired)
            .count()
    }
}
