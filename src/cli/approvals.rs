use std::collections::HashMap;

use chrono::Utc;
use serde_json::json;

use crate::auth;
use crate::cli::commands::ApprovalCommands;
use crate::db::{connection, task_repo, user_repo};
use crate::error::PlanoError;
use crate::output;
use crate::workflow::{self, Resolution};

pub fn run(cmd: ApprovalCommands, json_output: bool) -> i32 {
    let result = match cmd {
        ApprovalCommands::List => run_list(json_output),
        ApprovalCommands::Count => run_count(json_output),
        ApprovalCommands::Approve { id, notes } => {
            run_resolve(&id, Resolution::Approve, notes.as_deref(), json_output)
        }
        ApprovalCommands::Reject { id, notes } => {
            run_resolve(&id, Resolution::Reject, notes.as_deref(), json_output)
        }
    };
    super::finish(result, json_output)
}

fn run_list(json_output: bool) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;
    if !user.is_admin {
        return Err(PlanoError::unauthorized("view the approval queue"));
    }

    let pending = task_repo::pending_tasks(&conn)?;
    let names: HashMap<String, String> = user_repo::list_users(&conn)?
        .into_iter()
        .map(|u| (u.email, u.nome))
        .collect();

    if json_output {
        let entries: Vec<_> = pending
            .iter()
            .map(|t| {
                let nome = workflow::requester_display_name(
                    t.confirmation_requested_by.as_deref(),
                    |email| names.get(email).cloned(),
                );
                output::json::pending_entry(t, &nome)
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "pending": entries,
                "count": pending.len()
            })))
            .unwrap()
        );
    } else if pending.is_empty() {
        println!("No pending completion requests.");
    } else {
        println!("Pending completion requests:");
        for t in &pending {
            let nome = workflow::requester_display_name(
                t.confirmation_requested_by.as_deref(),
                |email| names.get(email).cloned(),
            );
            output::text::print_pending(t, &nome);
        }
    }
    Ok(0)
}

fn run_count(json_output: bool) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;
    if !user.is_admin {
        return Err(PlanoError::unauthorized("view the approval queue"));
    }

    let count = task_repo::pending_count(&conn)?;
    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({ "count": count })))
                .unwrap()
        );
    } else {
        println!("{count} pending completion request(s)");
    }
    Ok(0)
}

fn run_resolve(
    id: &str,
    resolution: Resolution,
    notes: Option<&str>,
    json_output: bool,
) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;

    let task = task_repo::resolve_task(&conn, id)?;
    let actor = auth::actor_from(&user);
    let computed = workflow::resolve_completion(&task, &actor, resolution, Utc::now(), notes)?;
    // The UPDATE re-checks the pending state, so a request resolved by
    // another admin in the meantime surfaces as NO_PENDING_REQUEST instead
    // of being silently overwritten mid-handshake.
    let task = task_repo::apply_resolution(&conn, &task.id, &computed)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "task": output::json::task_summary(&task),
                "admin_notes": task.admin_notes
            })))
            .unwrap()
        );
    } else {
        match resolution {
            Resolution::Approve => {
                println!("Approved {} — status set to Concluído", task.display_id());
            }
            Resolution::Reject => {
                println!(
                    "Rejected {} — status returned to Em andamento",
                    task.display_id()
                );
            }
        }
    }
    Ok(0)
}
