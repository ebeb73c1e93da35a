use chrono::Utc;
use serde_json::json;

use crate::auth;
use crate::cli::commands::AuthCommands;
use crate::db::connection;
use crate::error::PlanoError;
use crate::output;

pub fn run(cmd: AuthCommands, json_output: bool) -> i32 {
    let result = match cmd {
        AuthCommands::Request { email } => run_request(&email, json_output),
        AuthCommands::Verify { email, code } => run_verify(&email, &code, json_output),
        AuthCommands::Whoami => run_whoami(json_output),
        AuthCommands::Logout => run_logout(json_output),
    };
    super::finish(result, json_output)
}

fn run_request(email: &str, json_output: bool) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let code = auth::request_code(&conn, email, Utc::now())?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "email": email,
                "code": code,
                "expires_in_minutes": auth::CODE_TTL_MINUTES
            })))
            .unwrap()
        );
    } else {
        println!("One-time code for {email}: {code}");
        println!("Confirm with: plano auth verify {email} {code}");
    }
    Ok(0)
}

fn run_verify(email: &str, code: &str, json_output: bool) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::verify_code(&conn, email, code, Utc::now())?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "user": output::json::user_json(&user),
                "session_ttl_hours": auth::SESSION_TTL_HOURS
            })))
            .unwrap()
        );
    } else {
        println!("Logged in as {} <{}>", user.nome, user.email);
    }
    Ok(0)
}

fn run_whoami(json_output: bool) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    let user = auth::current_user(&conn, Utc::now())?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({
                "user": output::json::user_json(&user)
            })))
            .unwrap()
        );
    } else {
        let role = if user.is_admin { "admin" } else { "member" };
        println!("{} <{}> [{role}]", user.nome, user.email);
    }
    Ok(0)
}

fn run_logout(json_output: bool) -> Result<i32, PlanoError> {
    let conn = connection::open_db()?;
    auth::logout(&conn)?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&output::json::success(json!({ "logged_out": true })))
                .unwrap()
        );
    } else {
        println!("Logged out.");
    }
    Ok(0)
}
