use rusqlite::{params, Connection};

use crate::error::PlanoError;
use crate::models::Attachment;

/// Attachments for a task, excluding rows with an invalid URL scheme.
pub fn list_valid_for_task(conn: &Connection, task_id: &str) -> Result<Vec<Attachment>, PlanoError> {
    let mut stmt = conn.prepare(
        "SELECT id, task_id, file_name, file_url FROM task_attachments
         WHERE task_id = ?1 ORDER BY rowid",
    )?;
    let attachments = stmt
        .query_map(params![task_id], row_to_attachment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(attachments
        .into_iter()
        .filter(Attachment::has_valid_url)
        .collect())
}

pub fn get_attachment(conn: &Connection, id: &str) -> Result<Attachment, PlanoError> {
    conn.query_row(
        "SELECT id, task_id, file_name, file_url FROM task_attachments WHERE id = ?1",
        params![id],
        row_to_attachment,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => PlanoError::new(
            crate::error::ErrorCode::NotFound,
            format!("Attachment not found: {id}"),
        ),
        _ => PlanoError::from(e),
    })
}

pub fn add_attachment(
    conn: &Connection,
    id: &str,
    task_id: &str,
    file_name: &str,
    file_url: &str,
) -> Result<Attachment, PlanoError> {
    conn.execute(
        "INSERT INTO task_attachments (id, task_id, file_name, file_url)
         VALUES (?1, ?2, ?3, ?4)",
        params![id, task_id, file_name, file_url],
    )?;
    conn.query_row(
        "SELECT id, task_id, file_name, file_url FROM task_attachments WHERE id = ?1",
        params![id],
        row_to_attachment,
    )
    .map_err(PlanoError::from)
}

/// Replace a task's attachment set in one transaction: the current rows are
/// deleted and the given ones reinserted. An empty set clears the task's
/// attachments.
pub fn set_attachments(
    conn: &Connection,
    task_id: &str,
    items: &[Attachment],
) -> Result<(), PlanoError> {
    conn.execute_batch("BEGIN IMMEDIATE")?;
    let result = (|| -> Result<(), PlanoError> {
        conn.execute(
            "DELETE FROM task_attachments WHERE task_id = ?1",
            params![task_id],
        )?;
        for item in items {
            conn.execute(
                "INSERT INTO task_attachments (id, task_id, file_name, file_url)
                 VALUES (?1, ?2, ?3, ?4)",
                params![item.id, task_id, item.file_name, item.file_url],
            )?;
        }
        Ok(())
    })();
    match result {
        Ok(()) => {
            conn.execute_batch("COMMIT")?;
            Ok(())
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}

pub fn remove_attachment(conn: &Connection, id: &str) -> Result<(), PlanoError> {
    let changed = conn.execute("DELETE FROM task_attachments WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(PlanoError::new(
            crate::error::ErrorCode::NotFound,
            format!("Attachment not found: {id}"),
        ));
    }
    Ok(())
}

fn row_to_attachment(row: &rusqlite::Row) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get(0)?,
        task_id: row.get(1)?,
        file_name: row.get(2)?,
        file_url: row.get(3)?,
    })
}
