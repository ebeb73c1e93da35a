use chrono::Utc;
use serde_json::json;

use crate::auth;
use crate::db::{connection, task_repo};
use crate::error::PlanoError;
use crate::output;

pub fn run(json_output: bool) -> i32 {
    super::finish(run_inner(json_output), json_output)
}

fn run_inner(json_output: bool) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;

    let scope = if user.is_admin {
        None
    } else {
        Some(user.setor_id.clone())
    };
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let counts = task_repo::task_counts(&conn, scope.as_deref(), &today)?;

    // Badge refresh is best effort: a failure here is logged and suppressed
    // so it never blocks the primary view. Members never query the queue.
    let pending = if user.is_admin {
        match task_repo::pending_count(&conn) {
            Ok(n) => Some(n),
            Err(e) => {
                eprintln!("warning: could not load pending count: {}", e.message);
                None
            }
        }
    } else {
        None
    };

    if json_output {
        let mut data = json!({ "counts": output::json::counts_json(&counts) });
        if let Some(n) = pending {
            data["pending_approvals"] = json!(n);
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(data)).unwrap()
        );
    } else {
        output::text::print_counts(&counts);
        if let Some(n) = pending {
            println!("  pending_approvals={n}");
        }
    }
    Ok(0)
}
