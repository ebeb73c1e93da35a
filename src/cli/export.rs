use std::fs;

use chrono::Utc;
use serde_json::json;

use crate::auth;
use crate::cli::commands::ExportCommands;
use crate::cli::task::{build_filter, scope_setor};
use crate::db::{attachment_repo, connection, task_repo};
use crate::error::PlanoError;
use crate::filter;
use crate::models::Task;
use crate::output;

pub fn run(cmd: ExportCommands, json_output: bool) -> i32 {
    let result = match cmd {
        ExportCommands::Json { out } => run_json(&out, json_output),
        ExportCommands::List {
            search,
            status,
            priority,
            assignee,
            tags_only,
            setor,
            out,
        } => run_list(
            search.as_deref(),
            status.as_deref(),
            priority.as_deref(),
            assignee.as_deref(),
            tags_only,
            setor.as_deref(),
            &out,
            json_output,
        ),
    };
    super::finish(result, json_output)
}

/// Full task-collection export as a structured JSON document, attachments
/// included (invalid URLs omitted, as in any rendered list).
fn run_json(out: &str, json_output: bool) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;

    task_repo::backfill_sequential_ids(&conn)?;
    let scope = scope_setor(&conn, &user, None)?;
    let tasks = task_repo::list_tasks(&conn, scope.as_deref())?;

    let mut entries = Vec::with_capacity(tasks.len());
    for task in &tasks {
        let attachments = attachment_repo::list_valid_for_task(&conn, &task.id)?;
        entries.push(output::json::task_detail(task, &attachments));
    }

    let document = json!({
        "exported_at": Utc::now().to_rfc3339(),
        "exported_by": user.email,
        "tasks": entries
    });
    fs::write(out, serde_json::to_string_pretty(&document).unwrap())
        .map_err(|e| PlanoError::database(format!("cannot write {out}: {e}")))?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "path": out,
                "tasks": tasks.len()
            })))
            .unwrap()
        );
    } else {
        println!("Exported {} task(s) to {out}", tasks.len());
    }
    Ok(0)
}

/// Filtered-view export as a tabular text report, sorted by due date
/// ascending with undated tasks last.
#[allow(clippy::too_many_arguments)]
fn run_list(
    search: Option<&str>,
    status: Option<&str>,
    priority: Option<&str>,
    assignee: Option<&str>,
    tags_only: bool,
    setor_flag: Option<&str>,
    out: &str,
    json_output: bool,
) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;

    task_repo::backfill_sequential_ids(&conn)?;
    let scope = scope_setor(&conn, &user, setor_flag)?;
    let tasks = task_repo::list_tasks(&conn, scope.as_deref())?;

    let task_filter = build_filter(search, status, priority, assignee, tags_only)?;
    let mut view: Vec<&Task> = filter::apply(&tasks, &task_filter);
    filter::sort_by_due_date(&mut view);

    let mut report = String::new();
    report.push_str("Lista de Atividades Filtradas\n");
    report.push_str(&format!("Gerado em: {}\n\n", Utc::now().to_rfc3339()));
    report.push_str(&format!(
        "{:<8} {:<40} {:<20} {:<12} {:<10} {:<14} Tags\n",
        "ID", "Título", "Responsável", "Prazo", "Prioridade", "Status"
    ));
    for t in &view {
        report.push_str(&format!(
            "{:<8} {:<40} {:<20} {:<12} {:<10} {:<14} {}\n",
            t.display_id(),
            t.title,
            t.assignee.as_deref().unwrap_or("-"),
            t.due_date.as_deref().unwrap_or("-"),
            t.priority.as_str(),
            t.status.as_str(),
            t.tags.join(", ")
        ));
    }
    fs::write(out, report).map_err(|e| PlanoError::database(format!("cannot write {out}: {e}")))?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "path": out,
                "tasks": view.len()
            })))
            .unwrap()
        );
    } else {
        println!("Exported {} task(s) to {out}", view.len());
    }
    Ok(0)
}
