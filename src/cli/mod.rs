pub mod approvals;
pub mod auth;
pub mod commands;
pub mod export;
pub mod init;
pub mod setor;
pub mod status;
pub mod task;
pub mod user;

pub use commands::*;

use crate::error::PlanoError;
use crate::output;

/// Shared tail of every command: print the error through the active output
/// surface and turn the result into an exit code.
pub(crate) fn finish(result: Result<i32, PlanoError>, json_output: bool) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            if json_output {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::json::error(&e)).unwrap()
                );
            } else {
                eprintln!("Error: {}", e.message);
            }
            1
        }
    }
}
