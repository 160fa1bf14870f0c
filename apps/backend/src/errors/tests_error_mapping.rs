// Unit tests for error mapping - pure domain logic without HTTP handlers
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_rule_violations_to_422() {
    let de = DomainError::validation(ValidationKind::DoesNotBeat, "pair of 4 vs pair of 9");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::DoesNotBeat);
    assert_eq!(app.status().as_u16(), 422);

    let de = DomainError::validation_other("something odd");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::ValidationError);
}

#[test]
fn maps_parse_errors_to_400() {
    let de = DomainError::validation(ValidationKind::ParseCard, "Parse card: ZZ");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::ParseCard);
    assert_eq!(app.status().as_u16(), 400);
}

#[test]
fn maps_ticket_errors() {
    let missing = DomainError::not_found(NotFoundKind::Ticket, "no ticket");
    let app: AppError = missing.into();
    assert_eq!(app.code().as_str(), "TICKET_NOT_FOUND");
    assert_eq!(app.status().as_u16(), 404);

    let expired = DomainError::conflict(ConflictKind::TicketExpired, "expired");
    let app: AppError = expired.into();
    assert_eq!(app.code().as_str(), "TICKET_EXPIRED");
    assert_eq!(app.status().as_u16(), 409);

    let wrong_phase = DomainError::conflict(ConflictKind::TicketPhaseMismatch, "bid vs play");
    let app: AppError = wrong_phase.into();
    assert_eq!(app.code().as_str(), "PHASE_MISMATCH");
    assert_eq!(app.status().as_u16(), 409);
}

#[test]
fn maps_infra() {
    let t = DomainError::infra(InfraErrorKind::Timeout, "agent timed out");
    let app: AppError = t.into();
    assert_eq!(app.status().as_u16(), 504);
    assert!(matches!(app, AppError::Timeout { .. }));

    let up = DomainError::infra(InfraErrorKind::Upstream, "relay 502");
    let app: AppError = up.into();
    assert_eq!(app.code(), ErrorCode::UpstreamError);
    assert_eq!(app.status().as_u16(), 502);
}
