use serde_json::json;
use ulid::Ulid;

use crate::db::{connection, setor_repo, user_repo};
use crate::error::PlanoError;
use crate::output;

const BOOTSTRAP_SETOR: &str = "Geral";
const BOOTSTRAP_COR: &str = "#1e40af";

pub fn run(admin_name: Option<&str>, admin_email: Option<&str>, json_output: bool) -> i32 {
    super::finish(run_inner(admin_name, admin_email, json_output), json_output)
}

fn run_inner(
    admin_name: Option<&str>,
    admin_email: Option<&str>,
    json_output: bool,
) -> Result<i32, PlanoError> {
    let (conn, path) = connection::init_db()?;

    let mut seeded_admin = None;
    if let (Some(nome), Some(email)) = (admin_name, admin_email) {
        // Bootstrap is the only unauthenticated write path, and only into an
        // empty user table.
        if user_repo::user_count(&conn)? > 0 {
            return Err(PlanoError::validation(
                "Users already exist; create further users via `plano user create`",
            ));
        }
        let setor = match setor_repo::find_by_nome(&conn, BOOTSTRAP_SETOR)? {
            Some(s) => s,
            None => setor_repo::create_setor(
                &conn,
                &Ulid::new().to_string(),
                BOOTSTRAP_SETOR,
                BOOTSTRAP_COR,
                true,
            )?,
        };
        let user = user_repo::create_user(
            &conn,
            &Ulid::new().to_string(),
            nome,
            email,
            &setor.id,
            true,
            true,
        )?;
        seeded_admin = Some(user);
    }

    if json_output {
        let mut data = json!({ "path": path.to_string_lossy() });
        if let Some(ref user) = seeded_admin {
            data["admin"] = output::json::user_json(user);
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(data)).unwrap()
        );
    } else {
        println!("Initialized plano at {}", path.display());
        if let Some(ref user) = seeded_admin {
            println!("Seeded admin {} <{}>", user.nome, user.email);
        }
    }
    Ok(0)
}
