use chrono::Utc;
use serde_json::json;
use ulid::Ulid;

use crate::auth;
use crate::cli::commands::UserCommands;
use crate::db::{connection, setor_repo, user_repo};
use crate::error::PlanoError;
use crate::output;

pub fn run(cmd: UserCommands, json_output: bool) -> i32 {
    let result = run_inner(cmd, json_output);
    super::finish(result, json_output)
}

fn run_inner(cmd: UserCommands, json_output: bool) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let actor = auth::current_user(&conn, Utc::now())?;
    if !actor.is_admin {
        return Err(PlanoError::unauthorized("manage users"));
    }

    match cmd {
        UserCommands::Create {
            nome,
            email,
            setor,
            admin,
        } => {
            if nome.trim().is_empty() || email.trim().is_empty() {
                return Err(PlanoError::validation("Nome and email are required"));
            }
            if user_repo::find_by_email(&conn, &email)?.is_some() {
                return Err(PlanoError::validation(format!(
                    "Email {email} is already registered"
                )));
            }
            let setor = setor_repo::resolve_setor(&conn, &setor)?;
            let user = user_repo::create_user(
                &conn,
                &Ulid::new().to_string(),
                &nome,
                &email,
                &setor.id,
                admin,
                true,
            )?;
            if json_output {
                print_json(json!({ "user": output::json::user_json(&user) }));
            } else {
                println!("Created user {} <{}>", user.nome, user.email);
            }
            Ok(0)
        }
        UserCommands::List => {
            let users = user_repo::list_users(&conn)?;
            if json_output {
                let list: Vec<_> = users.iter().map(output::json::user_json).collect();
                print_json(json!({ "users": list }));
            } else {
                output::text::print_user_list(&users);
            }
            Ok(0)
        }
        UserCommands::Update {
            reference,
            nome,
            email,
            setor,
            admin,
        } => {
            let mut user = user_repo::resolve_user(&conn, &reference)?;
            if let Some(n) = nome {
                if n.trim().is_empty() {
                    return Err(PlanoError::validation("Nome cannot be empty"));
                }
                user.nome = n;
            }
            if let Some(e) = email {
                if let Some(existing) = user_repo::find_by_email(&conn, &e)? {
                    if existing.id != user.id {
                        return Err(PlanoError::validation(format!(
                            "Email {e} is already registered"
                        )));
                    }
                }
                user.email = e;
            }
            if let Some(s) = setor {
                user.setor_id = setor_repo::resolve_setor(&conn, &s)?.id;
            }
            if let Some(a) = admin {
                user.is_admin = a;
            }
            let user = user_repo::update_user(&conn, &user)?;
            if json_output {
                print_json(json!({ "user": output::json::user_json(&user) }));
            } else {
                println!("Updated user {}", user.nome);
            }
            Ok(0)
        }
        UserCommands::Delete { reference, yes } => {
            let user = user_repo::resolve_user(&conn, &reference)?;
            if !yes {
                return Err(PlanoError::validation(format!(
                    "Deleting user {} is permanent; pass --yes to confirm",
                    user.email
                )));
            }
            user_repo::delete_user(&conn, &user.id)?;
            if json_output {
                print_json(json!({ "deleted": user.id }));
            } else {
                println!("Deleted user {}", user.email);
            }
            Ok(0)
        }
        UserCommands::Activate { reference } => toggle(&conn, &reference, true, json_output),
        UserCommands::Deactivate { reference } => toggle(&conn, &reference, false, json_output),
    }
}

fn toggle(
    conn: &rusqlite::Connection,
    reference: &str,
    ativo: bool,
    json_output: bool,
) -> Result<i32, PlanoError> {
    let user = user_repo::resolve_user(conn, reference)?;
    let user = user_repo::set_ativo(conn, &user.id, ativo)?;
    if json_output {
        print_json(json!({ "user": output::json::user_json(&user) }));
    } else {
        let state = if ativo { "activated" } else { "deactivated" };
        println!("User {} {state}", user.email);
    }
    Ok(0)
}

fn print_json(data: serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(&output::json::success(data)).unwrap()
    );
}
