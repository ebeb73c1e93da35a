use chrono::Utc;
use serde_json::json;
use ulid::Ulid;

use crate::auth;
use crate::cli::commands::SetorCommands;
use crate::db::{connection, setor_repo};
use crate::error::PlanoError;
use crate::models::setor::is_valid_hex_color;
use crate::output;

pub fn run(cmd: SetorCommands, json_output: bool) -> i32 {
    let result = run_inner(cmd, json_output);
    super::finish(result, json_output)
}

fn run_inner(cmd: SetorCommands, json_output: bool) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;

    // `setor list` is readable by members (task forms need it); everything
    // else is admin-only.
    if !matches!(cmd, SetorCommands::List) && !user.is_admin {
        return Err(PlanoError::unauthorized("manage setores"));
    }

    match cmd {
        SetorCommands::Create { nome, cor } => {
            if nome.trim().is_empty() {
                return Err(PlanoError::validation("Nome is required"));
            }
            if !is_valid_hex_color(&cor) {
                return Err(PlanoError::validation(format!(
                    "Invalid color '{cor}' (expected #rrggbb)"
                )));
            }
            if setor_repo::find_by_nome(&conn, &nome)?.is_some() {
                return Err(PlanoError::validation(format!(
                    "A setor named '{nome}' already exists"
                )));
            }
            let setor =
                setor_repo::create_setor(&conn, &Ulid::new().to_string(), &nome, &cor, true)?;
            if json_output {
                print_json(json!({ "setor": output::json::setor_json(&setor) }));
            } else {
                println!("Created setor {} ({})", setor.nome, setor.id);
            }
            Ok(0)
        }
        SetorCommands::List => {
            let setores = setor_repo::list_setores(&conn)?;
            if json_output {
                let list: Vec<_> = setores.iter().map(output::json::setor_json).collect();
                print_json(json!({ "setores": list }));
            } else {
                output::text::print_setor_list(&setores);
            }
            Ok(0)
        }
        SetorCommands::Update {
            reference,
            nome,
            cor,
        } => {
            let mut setor = setor_repo::resolve_setor(&conn, &reference)?;
            if let Some(n) = nome {
                if n.trim().is_empty() {
                    return Err(PlanoError::validation("Nome cannot be empty"));
                }
                if let Some(existing) = setor_repo::find_by_nome(&conn, &n)? {
                    if existing.id != setor.id {
                        return Err(PlanoError::validation(format!(
                            "A setor named '{n}' already exists"
                        )));
                    }
                }
                setor.nome = n;
            }
            if let Some(c) = cor {
                if !is_valid_hex_color(&c) {
                    return Err(PlanoError::validation(format!(
                        "Invalid color '{c}' (expected #rrggbb)"
                    )));
                }
                setor.cor = c;
            }
            let setor = setor_repo::update_setor(&conn, &setor)?;
            if json_output {
                print_json(json!({ "setor": output::json::setor_json(&setor) }));
            } else {
                println!("Updated setor {}", setor.nome);
            }
            Ok(0)
        }
        SetorCommands::Delete { reference, yes } => {
            let setor = setor_repo::resolve_setor(&conn, &reference)?;
            if !yes {
                return Err(PlanoError::validation(format!(
                    "Deleting setor '{}' is permanent; pass --yes to confirm",
                    setor.nome
                )));
            }
            setor_repo::delete_setor(&conn, &setor.id)?;
            if json_output {
                print_json(json!({ "deleted": setor.id }));
            } else {
                println!("Deleted setor {}", setor.nome);
            }
            Ok(0)
        }
        SetorCommands::Activate { reference } => toggle(&conn, &reference, true, json_output),
        SetorCommands::Deactivate { reference } => toggle(&conn, &reference, false, json_output),
    }
}

fn toggle(
    conn: &rusqlite::Connection,
    reference: &str,
    ativo: bool,
    json_output: bool,
) -> Result<i32, PlanoError> {
    let setor = setor_repo::resolve_setor(conn, reference)?;
    let setor = setor_repo::set_ativo(conn, &setor.id, ativo)?;
    if json_output {
        print_json(json!({ "setor": output::json::setor_json(&setor) }));
    } else {
        let state = if ativo { "activated" } else { "deactivated" };
        println!("Setor {} {state}", setor.nome);
    }
    Ok(0)
}

fn print_json(data: serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(&output::json::success(data)).unwrap()
    );
}
