use rusqlite::{params, Connection};

use crate::error::PlanoError;
use crate::models::Setor;

use super::{task_repo, user_repo};

const SETOR_COLUMNS: &str = "id, nome, cor, ativo, created_at, updated_at";

pub fn list_setores(conn: &Connection) -> Result<Vec<Setor>, PlanoError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {SETOR_COLUMNS} FROM setores ORDER BY nome"))?;
    let setores = stmt
        .query_map([], row_to_setor)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(setores)
}

pub fn get_setor_by_id(conn: &Connection, id: &str) -> Result<Setor, PlanoError> {
    conn.query_row(
        &format!("SELECT {SETOR_COLUMNS} FROM setores WHERE id = ?1"),
        params![id],
        row_to_setor,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => PlanoError::setor_not_found(id),
        _ => PlanoError::from(e),
    })
}

/// Resolve a setor by id or exact name.
pub fn resolve_setor(conn: &Connection, reference: &str) -> Result<Setor, PlanoError> {
    if let Ok(setor) = get_setor_by_id(conn, reference) {
        return Ok(setor);
    }
    find_by_nome(conn, reference)?.ok_or_else(|| PlanoError::setor_not_found(reference))
}

/// Uniqueness pre-check read (no database constraint backs this up).
pub fn find_by_nome(conn: &Connection, nome: &str) -> Result<Option<Setor>, PlanoError> {
    let setor = conn
        .query_row(
            &format!("SELECT {SETOR_COLUMNS} FROM setores WHERE nome = ?1"),
            params![nome],
            row_to_setor,
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            _ => Err(PlanoError::from(e)),
        })?;
    Ok(setor)
}

pub fn create_setor(
    conn: &Connection,
    id: &str,
    nome: &str,
    cor: &str,
    ativo: bool,
) -> Result<Setor, PlanoError> {
    conn.execute(
        "INSERT INTO setores (id, nome, cor, ativo) VALUES (?1, ?2, ?3, ?4)",
        params![id, nome, cor, ativo],
    )?;
    get_setor_by_id(conn, id)
}

pub fn update_setor(conn: &Connection, setor: &Setor) -> Result<Setor, PlanoError> {
    let changed = conn.execute(
        "UPDATE setores SET nome = ?1, cor = ?2, ativo = ?3, updated_at = datetime('now')
         WHERE id = ?4",
        params![setor.nome, setor.cor, setor.ativo, setor.id],
    )?;
    if changed == 0 {
        return Err(PlanoError::setor_not_found(&setor.id));
    }
    get_setor_by_id(conn, &setor.id)
}

/// Delete a setor. Blocked while any usuario or task still references it.
pub fn delete_setor(conn: &Connection, id: &str) -> Result<(), PlanoError> {
    let usuarios = user_repo::count_by_setor(conn, id)?;
    if usuarios > 0 {
        return Err(PlanoError::dependency(format!(
            "Setor has {usuarios} associated user(s). Reassign them before deleting."
        )));
    }
    let tasks = task_repo::count_by_setor(conn, id)?;
    if tasks > 0 {
        return Err(PlanoError::dependency(format!(
            "Setor has {tasks} associated task(s). Reassign them before deleting."
        )));
    }
    let changed = conn.execute("DELETE FROM setores WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(PlanoError::setor_not_found(id));
    }
    Ok(())
}

pub fn set_ativo(conn: &Connection, id: &str, ativo: bool) -> Result<Setor, PlanoError> {
    let changed = conn.execute(
        "UPDATE setores SET ativo = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![ativo, id],
    )?;
    if changed == 0 {
        return Err(PlanoError::setor_not_found(id));
    }
    get_setor_by_id(conn, id)
}

fn row_to_setor(row: &rusqlite::Row) -> rusqlite::Result<Setor> {
    Ok(Setor {
        id: row.get(0)?,
        nome: row.get(1)?,
        cor: row.get(2)?,
        ativo: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
