use rusqlite::{params, Connection};

use crate::error::PlanoError;
use crate::models::{ConfirmationStatus, Priority, Task, TaskStatus};
use crate::seq_id;
use crate::workflow::{CompletionRequest, CompletionResolution};

const TASK_COLUMNS: &str = "id, sequential_id, title, description, assignee, due_date,
    priority, status, tags, setor_id,
    confirmation_status, confirmation_requested_at, confirmation_requested_by,
    confirmation_notes, confirmation_approved_at, confirmation_approved_by,
    admin_notes, created_at, updated_at";

pub fn create_task(conn: &Connection, task: &Task) -> Result<Task, PlanoError> {
    conn.execute(
        "INSERT INTO tasks (id, sequential_id, title, description, assignee, due_date,
             priority, status, tags, setor_id, confirmation_status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            task.id,
            task.sequential_id,
            task.title,
            task.description,
            task.assignee,
            task.due_date,
            task.priority.as_str(),
            task.status.as_str(),
            serde_json::to_string(&task.tags)?,
            task.setor_id,
            task.confirmation_status.as_str(),
        ],
    )?;
    get_task_by_id(conn, &task.id)
}

pub fn get_task_by_id(conn: &Connection, id: &str) -> Result<Task, PlanoError> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        params![id],
        row_to_task,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => PlanoError::task_not_found(id),
        _ => PlanoError::from(e),
    })
}

/// Resolve a task by opaque id, display id (`ID001`), or id prefix.
pub fn resolve_task(conn: &Connection, reference: &str) -> Result<Task, PlanoError> {
    if let Ok(task) = get_task_by_id(conn, reference) {
        return Ok(task);
    }

    let by_seq = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE sequential_id = ?1"),
            params![reference],
            row_to_task,
        )
        .ok();
    if let Some(task) = by_seq {
        return Ok(task);
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id LIKE ?1"
    ))?;
    let prefix = format!("{reference}%");
    let tasks: Vec<Task> = stmt
        .query_map(params![prefix], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;

    match tasks.len() {
        0 => Err(PlanoError::task_not_found(reference)),
        1 => Ok(tasks.into_iter().next().ok_or_else(|| {
            PlanoError::database("task vanished while resolving reference")
        })?),
        _ => {
            let candidates: Vec<String> = tasks
                .iter()
                .map(|t| format!("{} ({})", t.title, t.display_id()))
                .collect();
            Err(PlanoError::ambiguous_ref(reference, &candidates))
        }
    }
}

/// List tasks, optionally scoped to one setor, in creation order.
pub fn list_tasks(conn: &Connection, setor_id: Option<&str>) -> Result<Vec<Task>, PlanoError> {
    let mut tasks = Vec::new();
    match setor_id {
        Some(sid) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE setor_id = ?1 ORDER BY created_at, id"
            ))?;
            let rows = stmt.query_map(params![sid], row_to_task)?;
            for row in rows {
                tasks.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at, id"
            ))?;
            let rows = stmt.query_map([], row_to_task)?;
            for row in rows {
                tasks.push(row?);
            }
        }
    }
    Ok(tasks)
}

/// Persist an edited task. Full-row single-statement write; confirmation
/// fields are owned by the workflow updates and left untouched here.
pub fn update_task(conn: &Connection, task: &Task) -> Result<Task, PlanoError> {
    let changed = conn.execute(
        "UPDATE tasks SET title = ?1, description = ?2, assignee = ?3, due_date = ?4,
             priority = ?5, status = ?6, tags = ?7, setor_id = ?8,
             updated_at = datetime('now')
         WHERE id = ?9",
        params![
            task.title,
            task.description,
            task.assignee,
            task.due_date,
            task.priority.as_str(),
            task.status.as_str(),
            serde_json::to_string(&task.tags)?,
            task.setor_id,
            task.id,
        ],
    )?;
    if changed == 0 {
        return Err(PlanoError::task_not_found(&task.id));
    }
    get_task_by_id(conn, &task.id)
}

pub fn delete_task(conn: &Connection, id: &str) -> Result<(), PlanoError> {
    let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(PlanoError::task_not_found(id));
    }
    Ok(())
}

pub fn all_sequential_ids(conn: &Connection) -> Result<Vec<String>, PlanoError> {
    let mut stmt =
        conn.prepare("SELECT sequential_id FROM tasks WHERE sequential_id IS NOT NULL")?;
    let ids = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Assign display ids to legacy rows that lack one. Idempotent: rows that
/// already carry an id are never touched.
pub fn backfill_sequential_ids(conn: &Connection) -> Result<usize, PlanoError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM tasks WHERE sequential_id IS NULL ORDER BY created_at, id",
    )?;
    let missing: Vec<String> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    if missing.is_empty() {
        return Ok(0);
    }

    let mut assigned = all_sequential_ids(conn)?;
    conn.execute_batch("BEGIN IMMEDIATE")?;
    let result = (|| -> Result<(), PlanoError> {
        for task_id in &missing {
            let next = seq_id::next_sequential_id(assigned.iter().map(String::as_str));
            conn.execute(
                "UPDATE tasks SET sequential_id = ?1 WHERE id = ?2 AND sequential_id IS NULL",
                params![next, task_id],
            )?;
            assigned.push(next);
        }
        Ok(())
    })();
    match result {
        Ok(()) => {
            conn.execute_batch("COMMIT")?;
            Ok(missing.len())
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}

/// Persist a completion request as one atomic write of all affected fields.
pub fn apply_completion_request(
    conn: &Connection,
    task_id: &str,
    request: &CompletionRequest,
) -> Result<Task, PlanoError> {
    let changed = conn.execute(
        "UPDATE tasks SET confirmation_status = ?1, confirmation_requested_at = ?2,
             confirmation_requested_by = ?3, confirmation_notes = ?4,
             updated_at = datetime('now')
         WHERE id = ?5",
        params![
            request.confirmation_status.as_str(),
            request.requested_at,
            request.requested_by,
            request.notes,
            task_id,
        ],
    )?;
    if changed == 0 {
        return Err(PlanoError::task_not_found(task_id));
    }
    get_task_by_id(conn, task_id)
}

/// Persist an approve/reject resolution as one atomic write of all affected
/// fields (visible status plus confirmation audit columns).
pub fn apply_resolution(
    conn: &Connection,
    task_id: &str,
    resolution: &CompletionResolution,
) -> Result<Task, PlanoError> {
    let changed = conn.execute(
        "UPDATE tasks SET status = ?1, confirmation_status = ?2,
             confirmation_approved_at = ?3, confirmation_approved_by = ?4,
             admin_notes = ?5, updated_at = datetime('now')
         WHERE id = ?6 AND confirmation_status = 'pending'",
        params![
            resolution.status.as_str(),
            resolution.confirmation_status.as_str(),
            resolution.approved_at,
            resolution.approved_by,
            resolution.admin_notes,
            task_id,
        ],
    )?;
    if changed == 0 {
        // Resolved (or deleted) from under us by another admin.
        return Err(PlanoError::no_pending_request(task_id));
    }
    get_task_by_id(conn, task_id)
}

/// All tasks awaiting approval, most recent request first.
pub fn pending_tasks(conn: &Connection) -> Result<Vec<Task>, PlanoError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks
         WHERE confirmation_status = 'pending'
         ORDER BY confirmation_requested_at DESC"
    ))?;
    let tasks = stmt
        .query_map([], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

pub fn pending_count(conn: &Connection) -> Result<i64, PlanoError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE confirmation_status = 'pending'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_by_setor(conn: &Connection, setor_id: &str) -> Result<i64, PlanoError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE setor_id = ?1",
        params![setor_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_by_assignee(conn: &Connection, assignee: &str) -> Result<i64, PlanoError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE assignee = ?1",
        params![assignee],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// KPI counters for the status view.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct TaskCounts {
    pub total: i64,
    pub backlog: i64,
    pub em_andamento: i64,
    pub bloqueado: i64,
    pub concluido: i64,
    /// Priority Alta or Crítica.
    pub alta: i64,
    /// Past due date and not Concluído.
    pub atrasadas: i64,
}

pub fn task_counts(
    conn: &Connection,
    setor_id: Option<&str>,
    today: &str,
) -> Result<TaskCounts, PlanoError> {
    let tasks = list_tasks(conn, setor_id)?;
    let mut counts = TaskCounts::default();
    for task in &tasks {
        counts.total += 1;
        match task.status {
            TaskStatus::Backlog => counts.backlog += 1,
            TaskStatus::EmAndamento => counts.em_andamento += 1,
            TaskStatus::Bloqueado => counts.bloqueado += 1,
            TaskStatus::Concluido => counts.concluido += 1,
        }
        if matches!(task.priority, Priority::Alta | Priority::Critica) {
            counts.alta += 1;
        }
        if task.status != TaskStatus::Concluido {
            if let Some(ref due) = task.due_date {
                if due.as_str() < today {
                    counts.atrasadas += 1;
                }
            }
        }
    }
    Ok(counts)
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let tags_raw: String = row.get(8)?;
    Ok(Task {
        id: row.get(0)?,
        sequential_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        assignee: row.get(4)?,
        due_date: row.get(5)?,
        priority: Priority::from_str(&row.get::<_, String>(6)?).unwrap_or(Priority::Media),
        status: TaskStatus::from_str(&row.get::<_, String>(7)?).unwrap_or(TaskStatus::Backlog),
        tags: serde_json::from_str(&tags_raw).unwrap_or_default(),
        setor_id: row.get(9)?,
        confirmation_status: ConfirmationStatus::from_str(&row.get::<_, String>(10)?)
            .unwrap_or(ConfirmationStatus::None),
        confirmation_requested_at: row.get(11)?,
        confirmation_requested_by: row.get(12)?,
        confirmation_notes: row.get(13)?,
        confirmation_approved_at: row.get(14)?,
        confirmation_approved_by: row.get(15)?,
        admin_notes: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}
