use rusqlite::{params, Connection};

use crate::error::PlanoError;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub email: String,
    pub code: String,
    pub issued_at: String,
    pub verified_at: Option<String>,
}

/// Open a fresh session for an email, replacing any existing one. The CLI
/// holds at most one session, like a browser profile.
pub fn create_session(
    conn: &Connection,
    id: &str,
    email: &str,
    code: &str,
    issued_at: &str,
) -> Result<(), PlanoError> {
    conn.execute("DELETE FROM sessions", [])?;
    conn.execute(
        "INSERT INTO sessions (id, email, code, issued_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, email, code, issued_at],
    )?;
    Ok(())
}

pub fn current_session(conn: &Connection) -> Result<Option<Session>, PlanoError> {
    conn.query_row(
        "SELECT id, email, code, issued_at, verified_at FROM sessions
         ORDER BY issued_at DESC LIMIT 1",
        [],
        |row| {
            Ok(Session {
                id: row.get(0)?,
                email: row.get(1)?,
                code: row.get(2)?,
                issued_at: row.get(3)?,
                verified_at: row.get(4)?,
            })
        },
    )
    .map(Some)
    .or_else(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Ok(None),
        _ => Err(PlanoError::from(e)),
    })
}

pub fn mark_verified(conn: &Connection, id: &str, verified_at: &str) -> Result<(), PlanoError> {
    conn.execute(
        "UPDATE sessions SET verified_at = ?1 WHERE id = ?2",
        params![verified_at, id],
    )?;
    Ok(())
}

pub fn clear_sessions(conn: &Connection) -> Result<(), PlanoError> {
    conn.execute("DELETE FROM sessions", [])?;
    Ok(())
}
