use rusqlite::{params, Connection};

use crate::error::PlanoError;
use crate::models::User;

use super::task_repo;

const USER_COLUMNS: &str = "id, nome, email, setor_id, is_admin, ativo, created_at, updated_at";

pub fn list_users(conn: &Connection) -> Result<Vec<User>, PlanoError> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM usuarios ORDER BY nome"))?;
    let users = stmt
        .query_map([], row_to_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> Result<User, PlanoError> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM usuarios WHERE id = ?1"),
        params![id],
        row_to_user,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => PlanoError::user_not_found(id),
        _ => PlanoError::from(e),
    })
}

/// Uniqueness pre-check read (no database constraint backs this up).
pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<User>, PlanoError> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM usuarios WHERE email = ?1"),
        params![email],
        row_to_user,
    )
    .map(Some)
    .or_else(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Ok(None),
        _ => Err(PlanoError::from(e)),
    })
}

/// Resolve a user by id or email.
pub fn resolve_user(conn: &Connection, reference: &str) -> Result<User, PlanoError> {
    if let Ok(user) = get_user_by_id(conn, reference) {
        return Ok(user);
    }
    find_by_email(conn, reference)?.ok_or_else(|| PlanoError::user_not_found(reference))
}

pub fn create_user(
    conn: &Connection,
    id: &str,
    nome: &str,
    email: &str,
    setor_id: &str,
    is_admin: bool,
    ativo: bool,
) -> Result<User, PlanoError> {
    conn.execute(
        "INSERT INTO usuarios (id, nome, email, setor_id, is_admin, ativo)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id, nome, email, setor_id, is_admin, ativo],
    )?;
    get_user_by_id(conn, id)
}

pub fn update_user(conn: &Connection, user: &User) -> Result<User, PlanoError> {
    let changed = conn.execute(
        "UPDATE usuarios SET nome = ?1, email = ?2, setor_id = ?3, is_admin = ?4,
             ativo = ?5, updated_at = datetime('now')
         WHERE id = ?6",
        params![
            user.nome,
            user.email,
            user.setor_id,
            user.is_admin,
            user.ativo,
            user.id,
        ],
    )?;
    if changed == 0 {
        return Err(PlanoError::user_not_found(&user.id));
    }
    get_user_by_id(conn, &user.id)
}

/// Delete a user. Blocked while any task names them as assignee.
pub fn delete_user(conn: &Connection, id: &str) -> Result<(), PlanoError> {
    let user = get_user_by_id(conn, id)?;
    let tasks = task_repo::count_by_assignee(conn, &user.nome)?;
    if tasks > 0 {
        return Err(PlanoError::dependency(format!(
            "User has {tasks} associated task(s). Reassign them before deleting."
        )));
    }
    conn.execute("DELETE FROM usuarios WHERE id = ?1", params![id])?;
    Ok(())
}

pub fn set_ativo(conn: &Connection, id: &str, ativo: bool) -> Result<User, PlanoError> {
    let changed = conn.execute(
        "UPDATE usuarios SET ativo = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![ativo, id],
    )?;
    if changed == 0 {
        return Err(PlanoError::user_not_found(id));
    }
    get_user_by_id(conn, id)
}

pub fn count_by_setor(conn: &Connection, setor_id: &str) -> Result<i64, PlanoError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM usuarios WHERE setor_id = ?1",
        params![setor_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn user_count(conn: &Connection) -> Result<i64, PlanoError> {
    let count = conn.query_row("SELECT COUNT(*) FROM usuarios", [], |row| row.get(0))?;
    Ok(count)
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        nome: row.get(1)?,
        email: row.get(2)?,
        setor_id: row.get(3)?,
        is_admin: row.get(4)?,
        ativo: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
