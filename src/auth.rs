//! One-time-code authentication.
//!
//! `request` issues a 6-digit code for a known, active user and opens a
//! session; `verify` checks the code within its issuance window and stamps
//! the session as verified. A verified session is honored for 24 hours,
//! after which it is treated as absent even though the row may still exist.

use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use ulid::Ulid;

use crate::db::{session_repo, user_repo};
use crate::error::PlanoError;
use crate::models::User;
use crate::workflow::Actor;

/// How long a verified session stays valid.
pub const SESSION_TTL_HOURS: i64 = 24;
/// How long an issued code can still be verified.
pub const CODE_TTL_MINUTES: i64 = 15;

/// Issue a one-time code for `email` and open a session for it. The email
/// must belong to a known, active user. Returns the code: the CLI is its
/// own delivery channel.
pub fn request_code(conn: &Connection, email: &str, now: DateTime<Utc>) -> Result<String, PlanoError> {
    let user = user_repo::find_by_email(conn, email)?
        .ok_or_else(|| PlanoError::validation(format!("No user registered for {email}")))?;
    if !user.ativo {
        return Err(PlanoError::validation(format!(
            "User {email} is deactivated"
        )));
    }

    let code = format!("{:06}", Ulid::new().random() % 1_000_000);
    session_repo::create_session(
        conn,
        &Ulid::new().to_string(),
        &user.email,
        &code,
        &now.to_rfc3339(),
    )?;
    Ok(code)
}

/// Verify a submitted code against the open session and mark the session as
/// verified. Codes expire after `CODE_TTL_MINUTES`.
pub fn verify_code(
    conn: &Connection,
    email: &str,
    code: &str,
    now: DateTime<Utc>,
) -> Result<User, PlanoError> {
    let session = session_repo::current_session(conn)?.ok_or_else(PlanoError::invalid_code)?;
    if session.email != email || session.code != code {
        return Err(PlanoError::invalid_code());
    }
    let issued = parse_timestamp(&session.issued_at)?;
    if now - issued > Duration::minutes(CODE_TTL_MINUTES) {
        session_repo::clear_sessions(conn)?;
        return Err(PlanoError::invalid_code());
    }

    session_repo::mark_verified(conn, &session.id, &now.to_rfc3339())?;
    current_user(conn, now)
}

/// Resolve the authenticated user behind the current session. Expired
/// sessions are purged on sight; deactivated or deleted users are treated
/// as unauthenticated regardless of session state.
pub fn current_user(conn: &Connection, now: DateTime<Utc>) -> Result<User, PlanoError> {
    let session = session_repo::current_session(conn)?.ok_or_else(PlanoError::not_authenticated)?;
    let verified_at = session
        .verified_at
        .as_deref()
        .ok_or_else(PlanoError::not_authenticated)?;

    let verified = parse_timestamp(verified_at)?;
    if now - verified > Duration::hours(SESSION_TTL_HOURS) {
        session_repo::clear_sessions(conn)?;
        return Err(PlanoError::session_expired());
    }

    let user = user_repo::find_by_email(conn, &session.email)?
        .filter(|u| u.ativo)
        .ok_or_else(PlanoError::not_authenticated)?;
    Ok(user)
}

pub fn logout(conn: &Connection) -> Result<(), PlanoError> {
    session_repo::clear_sessions(conn)
}

pub fn actor_from(user: &User) -> Actor {
    Actor {
        id: user.id.clone(),
        email: user.email.clone(),
        nome: user.nome.clone(),
        is_admin: user.is_admin,
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, PlanoError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PlanoError::database(format!("bad session timestamp {s}: {e}")))
}
