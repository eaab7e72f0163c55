//! Session gate tests: issuance, expiry, issuer/audience checks and
//! termination of rejected sessions.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use chrono::Duration;
use checkin_auth::mocks::InMemorySessionStore;
use checkin_auth::{
    FileSessionStore, KeyDerivation, SessionConfig, SessionError, SessionGate, SessionStore,
    SessionUser,
};
use checkin_testing::{test_clock, FixedClock};
use checkin_core::environment::Clock;
use std::sync::Arc;

fn user() -> SessionUser {
    SessionUser {
        id: "42".to_string(),
        name: "Carla Mendes".to_string(),
        login: "carla".to_string(),
    }
}

fn gate_at(config: SessionConfig, clock: FixedClock) -> SessionGate {
    SessionGate::new(config, Arc::new(clock)).expect("valid key")
}

#[test]
fn test_issued_session_validates_within_lifetime() {
    let issued_at = test_clock();
    let token = gate_at(SessionConfig::new("s3cret"), issued_at.clone())
        .issue(&user(), "backend-token")
        .unwrap();

    let later = FixedClock::new(issued_at.now() + Duration::hours(23));
    let claims = gate_at(SessionConfig::new("s3cret"), later).validate(&token).unwrap();

    assert_eq!(claims.sub, "42");
    assert_eq!(claims.name.as_deref(), Some("Carla Mendes"));
    assert_eq!(claims.email.as_deref(), Some("carla"));
    assert_eq!(claims.access_token.as_deref(), Some("backend-token"));
    assert_eq!(claims.exp, Some((issued_at.now() + Duration::hours(24)).timestamp()));
}

#[test]
fn test_session_expires_at_max_age() {
    let issued_at = test_clock();
    let token = gate_at(SessionConfig::new("s3cret"), issued_at.clone())
        .issue(&user(), "backend-token")
        .unwrap();

    let at_expiry = FixedClock::new(issued_at.now() + Duration::hours(24));
    let result = gate_at(SessionConfig::new("s3cret"), at_expiry).validate(&token);

    assert_eq!(result, Err(SessionError::Expired));
    assert_eq!(SessionError::Expired.to_string(), "Sessão expirada.");
}

#[test]
fn test_custom_max_age() {
    let config = SessionConfig::new("s3cret").with_max_age(Duration::minutes(5));
    let issued_at = test_clock();
    let token = gate_at(config.clone(), issued_at.clone()).issue(&user(), "t").unwrap();

    let later = FixedClock::new(issued_at.now() + Duration::minutes(6));
    assert_eq!(gate_at(config, later).validate(&token), Err(SessionError::Expired));
}

#[test]
fn test_require_terminates_expired_session() {
    let issued_at = test_clock();
    let token = gate_at(SessionConfig::new("s3cret"), issued_at.clone())
        .issue(&user(), "backend-token")
        .unwrap();
    let store = InMemorySessionStore::with_token(token);

    let expired_gate = gate_at(
        SessionConfig::new("s3cret"),
        FixedClock::new(issued_at.now() + Duration::days(2)),
    );
    let result = expired_gate.require(&store);

    assert_eq!(result, Err(SessionError::Expired));
    assert_eq!(store.termination_count(), 1);
    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn test_require_without_session_is_missing() {
    let store = InMemorySessionStore::new();
    let gate = gate_at(SessionConfig::new("s3cret"), test_clock());

    assert_eq!(gate.require(&store), Err(SessionError::Missing));
    assert_eq!(store.termination_count(), 1);
}

#[test]
fn test_require_keeps_valid_session() {
    let gate = gate_at(SessionConfig::new("s3cret"), test_clock());
    let store = InMemorySessionStore::with_token(gate.issue(&user(), "backend-token").unwrap());

    let claims = gate.require(&store).unwrap();

    assert_eq!(claims.access_token.as_deref(), Some("backend-token"));
    assert_eq!(store.termination_count(), 0);
    assert!(store.load().unwrap().is_some());
}

#[test]
fn test_token_from_other_secret_is_invalid() {
    let token = gate_at(SessionConfig::new("first"), test_clock()).issue(&user(), "t").unwrap();
    let gate = gate_at(SessionConfig::new("second"), test_clock());

    assert!(matches!(gate.validate(&token), Err(SessionError::Invalid { .. })));
}

#[test]
fn test_issuer_and_audience_are_enforced() {
    let stamped = SessionConfig::new("s3cret")
        .with_issuer("checkin-api")
        .with_audience("console");
    let token = gate_at(stamped.clone(), test_clock()).issue(&user(), "t").unwrap();

    assert!(gate_at(stamped, test_clock()).validate(&token).is_ok());

    let other_issuer = SessionConfig::new("s3cret").with_issuer("someone-else");
    assert_eq!(
        gate_at(other_issuer, test_clock()).validate(&token),
        Err(SessionError::IssuerMismatch)
    );

    let other_audience = SessionConfig::new("s3cret").with_audience("mobile");
    assert_eq!(
        gate_at(other_audience, test_clock()).validate(&token),
        Err(SessionError::AudienceMismatch)
    );
}

#[test]
fn test_unstamped_token_fails_issuer_check() {
    let token = gate_at(SessionConfig::new("s3cret"), test_clock()).issue(&user(), "t").unwrap();
    let strict = SessionConfig::new("s3cret").with_issuer("checkin-api");

    assert_eq!(
        gate_at(strict, test_clock()).validate(&token),
        Err(SessionError::IssuerMismatch)
    );
}

#[test]
fn test_base64_key_derivation() {
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    let secret = STANDARD.encode([3u8; 32]);
    let config = SessionConfig::new(secret).with_key_derivation(KeyDerivation::Base64);
    let gate = gate_at(config, test_clock());

    let token = gate.issue(&user(), "t").unwrap();
    assert!(gate.validate(&token).is_ok());
}

#[test]
fn test_file_store_save_load_terminate() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("nested").join("session"));

    assert_eq!(store.load().unwrap(), None);

    store.save("token-value").unwrap();
    assert_eq!(store.load().unwrap().as_deref(), Some("token-value"));

    store.terminate().unwrap();
    assert_eq!(store.load().unwrap(), None);

    // Terminating twice is fine
    store.terminate().unwrap();
}
