use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde_json::json;
use ulid::Ulid;

use crate::auth;
use crate::cli::commands::{AttachCommands, TaskCommands};
use crate::db::{attachment_repo, connection, setor_repo, task_repo};
use crate::error::PlanoError;
use crate::filter::TaskFilter;
use crate::models::{Attachment, ConfirmationStatus, Priority, Task, TaskStatus, User};
use crate::output;
use crate::seq_id;
use crate::workflow;

pub fn run(cmd: TaskCommands, json_output: bool) -> i32 {
    let result = match cmd {
        TaskCommands::Add {
            title,
            description,
            assignee,
            due,
            priority,
            status,
            tags,
            setor,
        } => run_add(
            &title,
            description.as_deref(),
            assignee.as_deref(),
            due.as_deref(),
            &priority,
            &status,
            tags,
            setor.as_deref(),
            json_output,
        ),
        TaskCommands::List {
            search,
            status,
            priority,
            assignee,
            tags_only,
            setor,
        } => run_list(
            search.as_deref(),
            status.as_deref(),
            priority.as_deref(),
            assignee.as_deref(),
            tags_only,
            setor.as_deref(),
            json_output,
        ),
        TaskCommands::Show { id } => run_show(&id, json_output),
        TaskCommands::Update {
            id,
            title,
            description,
            assignee,
            due,
            priority,
            status,
            tags,
            setor,
        } => run_update(
            &id,
            title.as_deref(),
            description.as_deref(),
            assignee.as_deref(),
            due.as_deref(),
            priority.as_deref(),
            status.as_deref(),
            tags,
            setor.as_deref(),
            json_output,
        ),
        TaskCommands::Delete { id, yes } => run_delete(&id, yes, json_output),
        TaskCommands::RequestCompletion { id, notes } => {
            run_request_completion(&id, notes.as_deref(), json_output)
        }
        TaskCommands::Attach(cmd) => run_attach(cmd, json_output),
    };
    super::finish(result, json_output)
}

#[allow(clippy::too_many_arguments)]
fn run_add(
    title: &str,
    description: Option<&str>,
    assignee: Option<&str>,
    due: Option<&str>,
    priority: &str,
    status: &str,
    tags: Vec<String>,
    setor_flag: Option<&str>,
    json_output: bool,
) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;

    if title.trim().is_empty() {
        return Err(PlanoError::validation("Title is required"));
    }
    let priority = parse_priority(priority)?;
    let status = parse_status(status)?;
    let due_date = due.map(parse_due).transpose()?;

    // Members always create into their own setor; the flag only means
    // something for admins.
    let setor_id = if user.is_admin {
        match setor_flag {
            Some(reference) => setor_repo::resolve_setor(&conn, reference)?.id,
            None => user.setor_id.clone(),
        }
    } else {
        user.setor_id.clone()
    };

    let existing = task_repo::all_sequential_ids(&conn)?;
    let sequential_id = seq_id::next_sequential_id(existing.iter().map(String::as_str));

    let task = Task {
        id: Ulid::new().to_string(),
        sequential_id: Some(sequential_id),
        title: title.to_string(),
        description: description.map(str::to_string),
        assignee: assignee.map(str::to_string),
        due_date,
        priority,
        status,
        tags,
        setor_id,
        confirmation_status: ConfirmationStatus::None,
        confirmation_requested_at: None,
        confirmation_requested_by: None,
        confirmation_notes: None,
        confirmation_approved_at: None,
        confirmation_approved_by: None,
        admin_notes: None,
        created_at: String::new(),
        updated_at: String::new(),
    };
    let task = task_repo::create_task(&conn, &task)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "task": output::json::task_summary(&task)
            })))
            .unwrap()
        );
    } else {
        println!("Added task: {} ({})", task.title, task.display_id());
    }
    Ok(0)
}

fn run_list(
    search: Option<&str>,
    status: Option<&str>,
    priority: Option<&str>,
    assignee: Option<&str>,
    tags_only: bool,
    setor_flag: Option<&str>,
    json_output: bool,
) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;

    task_repo::backfill_sequential_ids(&conn)?;
    let scope = scope_setor(&conn, &user, setor_flag)?;
    let tasks = task_repo::list_tasks(&conn, scope.as_deref())?;

    let filter = build_filter(search, status, priority, assignee, tags_only)?;
    let visible: Vec<&Task> = crate::filter::apply(&tasks, &filter);

    if json_output {
        let tasks_json: Vec<_> = visible
            .iter()
            .map(|t| output::json::task_summary(t))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "tasks": tasks_json
            })))
            .unwrap()
        );
    } else {
        let owned: Vec<Task> = visible.into_iter().cloned().collect();
        output::text::print_task_list(&owned);
    }
    Ok(0)
}

fn run_show(id: &str, json_output: bool) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;
    let task = resolve_visible_task(&conn, &user, id)?;
    let attachments = attachment_repo::list_valid_for_task(&conn, &task.id)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "task": output::json::task_detail(&task, &attachments)
            })))
            .unwrap()
        );
    } else {
        output::text::print_task(&task);
        if !attachments.is_empty() {
            println!("\nAttachments:");
            output::text::print_attachments(&attachments);
        }
    }
    Ok(0)
}

#[allow(clippy::too_many_arguments)]
fn run_update(
    id: &str,
    title: Option<&str>,
    description: Option<&str>,
    assignee: Option<&str>,
    due: Option<&str>,
    priority: Option<&str>,
    status: Option<&str>,
    tags: Vec<String>,
    setor_flag: Option<&str>,
    json_output: bool,
) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;
    let mut task = resolve_visible_task(&conn, &user, id)?;

    if let Some(t) = title {
        if t.trim().is_empty() {
            return Err(PlanoError::validation("Title cannot be empty"));
        }
        task.title = t.to_string();
    }
    if let Some(d) = description {
        task.description = Some(d.to_string());
    }
    if let Some(a) = assignee {
        task.assignee = Some(a.to_string());
    }
    if let Some(d) = due {
        task.due_date = Some(parse_due(d)?);
    }
    if let Some(p) = priority {
        task.priority = parse_priority(p)?;
    }
    if let Some(s) = status {
        task.status = parse_status(s)?;
    }
    if !tags.is_empty() {
        task.tags = tags;
    }
    if let Some(reference) = setor_flag {
        if !user.is_admin {
            return Err(PlanoError::unauthorized("move tasks between setores"));
        }
        task.setor_id = setor_repo::resolve_setor(&conn, reference)?.id;
    }

    let task = task_repo::update_task(&conn, &task)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "task": output::json::task_summary(&task)
            })))
            .unwrap()
        );
    } else {
        println!("Updated task {}", task.display_id());
    }
    Ok(0)
}

fn run_delete(id: &str, yes: bool, json_output: bool) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;
    if !user.is_admin {
        return Err(PlanoError::unauthorized("delete tasks"));
    }
    let task = task_repo::resolve_task(&conn, id)?;
    if !yes {
        return Err(PlanoError::validation(format!(
            "Deleting task {} is permanent; pass --yes to confirm",
            task.display_id()
        )));
    }
    task_repo::delete_task(&conn, &task.id)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "deleted": { "id": task.id, "sequential_id": task.sequential_id }
            })))
            .unwrap()
        );
    } else {
        println!("Deleted task {}", task.display_id());
    }
    Ok(0)
}

fn run_request_completion(
    id: &str,
    notes: Option<&str>,
    json_output: bool,
) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;
    let task = resolve_visible_task(&conn, &user, id)?;

    let actor = auth::actor_from(&user);
    let request = workflow::request_completion(&actor, Utc::now(), notes);
    let task = task_repo::apply_completion_request(&conn, &task.id, &request)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "task": output::json::task_summary(&task),
                "requested_by": task.confirmation_requested_by,
                "requested_at": task.confirmation_requested_at
            })))
            .unwrap()
        );
    } else {
        println!(
            "Completion requested for {} — awaiting admin approval",
            task.display_id()
        );
    }
    Ok(0)
}

fn run_attach(cmd: AttachCommands, json_output: bool) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;

    match cmd {
        AttachCommands::Add { task, name, url } => {
            let task = resolve_visible_task(&conn, &user, &task)?;
            if url.is_empty() {
                return Err(PlanoError::validation("Attachment URL is required"));
            }
            let attachment = attachment_repo::add_attachment(
                &conn,
                &Ulid::new().to_string(),
                &task.id,
                &name,
                &url,
            )?;
            if json_output {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::json::success(json!({
                        "attachment": output::json::attachment_json(&attachment),
                        "valid_url": attachment.has_valid_url()
                    })))
                    .unwrap()
                );
            } else {
                println!("Attached {} to {}", attachment.file_name, task.display_id());
                if !attachment.has_valid_url() {
                    eprintln!("warning: URL scheme is not data:/http:/https:; it will not be listed");
                }
            }
            Ok(0)
        }
        AttachCommands::List { task } => {
            let task = resolve_visible_task(&conn, &user, &task)?;
            let attachments = attachment_repo::list_valid_for_task(&conn, &task.id)?;
            if json_output {
                let list: Vec<_> = attachments
                    .iter()
                    .map(output::json::attachment_json)
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::json::success(json!({
                        "attachments": list
                    })))
                    .unwrap()
                );
            } else if attachments.is_empty() {
                println!("No attachments.");
            } else {
                output::text::print_attachments(&attachments);
            }
            Ok(0)
        }
        AttachCommands::Set { task, files } => {
            let task = resolve_visible_task(&conn, &user, &task)?;
            let mut items = Vec::with_capacity(files.len());
            for spec in &files {
                let (name, url) = spec.split_once('=').ok_or_else(|| {
                    PlanoError::validation(format!("Invalid attachment '{spec}' (expected NAME=URL)"))
                })?;
                if name.is_empty() || url.is_empty() {
                    return Err(PlanoError::validation(format!(
                        "Invalid attachment '{spec}' (expected NAME=URL)"
                    )));
                }
                items.push(Attachment {
                    id: Ulid::new().to_string(),
                    task_id: task.id.clone(),
                    file_name: name.to_string(),
                    file_url: url.to_string(),
                });
            }
            attachment_repo::set_attachments(&conn, &task.id, &items)?;
            let attachments = attachment_repo::list_valid_for_task(&conn, &task.id)?;
            if json_output {
                let list: Vec<_> = attachments
                    .iter()
                    .map(output::json::attachment_json)
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::json::success(json!({
                        "saved": items.len(),
                        "attachments": list
                    })))
                    .unwrap()
                );
            } else {
                println!(
                    "Saved {} attachment(s) on {}",
                    items.len(),
                    task.display_id()
                );
            }
            Ok(0)
        }
        AttachCommands::Remove { attachment_id } => {
            let attachment = attachment_repo::get_attachment(&conn, &attachment_id)?;
            // Same visibility rule as the rest of the attach surface: a
            // member cannot touch attachments of tasks outside their setor.
            resolve_visible_task(&conn, &user, &attachment.task_id)?;
            attachment_repo::remove_attachment(&conn, &attachment.id)?;
            if json_output {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::json::success(json!({
                        "removed": attachment_id
                    })))
                    .unwrap()
                );
            } else {
                println!("Removed attachment {attachment_id}");
            }
            Ok(0)
        }
    }
}

// ─── shared helpers (also used by export) ───────────────────────────

pub(crate) fn parse_status(s: &str) -> Result<TaskStatus, PlanoError> {
    TaskStatus::from_str(s).ok_or_else(|| {
        PlanoError::validation(format!(
            "Invalid status '{s}'. Valid: Backlog, Em andamento, Bloqueado, Concluído"
        ))
    })
}

pub(crate) fn parse_priority(s: &str) -> Result<Priority, PlanoError> {
    Priority::from_str(s).ok_or_else(|| {
        PlanoError::validation(format!(
            "Invalid priority '{s}'. Valid: Baixa, Média, Alta, Crítica"
        ))
    })
}

pub(crate) fn parse_due(s: &str) -> Result<String, PlanoError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| PlanoError::validation(format!("Invalid due date '{s}' (expected YYYY-MM-DD)")))?;
    Ok(s.to_string())
}

pub(crate) fn build_filter(
    search: Option<&str>,
    status: Option<&str>,
    priority: Option<&str>,
    assignee: Option<&str>,
    tags_only: bool,
) -> Result<TaskFilter, PlanoError> {
    Ok(TaskFilter {
        text: search.map(str::to_string),
        status: status.map(parse_status).transpose()?,
        priority: priority.map(parse_priority).transpose()?,
        assignee: assignee.map(str::to_string),
        tags_only,
    })
}

/// Setor scope for reads: members are pinned to their own setor; admins see
/// everything unless they narrow with a flag.
pub(crate) fn scope_setor(
    conn: &Connection,
    user: &User,
    setor_flag: Option<&str>,
) -> Result<Option<String>, PlanoError> {
    if user.is_admin {
        match setor_flag {
            Some(reference) => Ok(Some(setor_repo::resolve_setor(conn, reference)?.id)),
            None => Ok(None),
        }
    } else {
        Ok(Some(user.setor_id.clone()))
    }
}

/// Resolve a task reference, hiding tasks outside a member's setor the same
/// way the backend's row policy would.
pub(crate) fn resolve_visible_task(
    conn: &Connection,
    user: &User,
    reference: &str,
) -> Result<Task, PlanoError> {
    let task = task_repo::resolve_task(conn, reference)?;
    if !user.is_admin && task.setor_id != user.setor_id {
        return Err(PlanoError::task_not_found(reference));
    }
    Ok(task)
}
