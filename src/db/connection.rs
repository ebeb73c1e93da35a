use std::env;
use std::fs;
use std::path::PathBuf;

use rusqlite::Connection;

use crate::error::PlanoError;

use super::migrations;

/// Find the workspace root by walking up from the current directory until a
/// `.plano` directory is found.
pub fn find_root() -> Result<PathBuf, PlanoError> {
    let mut dir = env::current_dir().map_err(|e| PlanoError::database(e.to_string()))?;
    loop {
        if dir.join(".plano").is_dir() {
            return Ok(dir);
        }
        if !dir.pop() {
            return Err(PlanoError::not_initialized());
        }
    }
}

/// Path to the plano database.
pub fn db_path() -> Result<PathBuf, PlanoError> {
    let root = find_root()?;
    Ok(root.join(".plano").join("plano.db"))
}

/// Open a connection to the database. Returns an error if not initialized.
pub fn open_db() -> Result<Connection, PlanoError> {
    let path = db_path()?;
    if !path.exists() {
        return Err(PlanoError::not_initialized());
    }
    let conn = Connection::open(&path)?;
    configure_connection(&conn)?;
    Ok(conn)
}

/// Initialize the database in the current directory: create `.plano/`, the
/// database file, and the schema.
pub fn init_db() -> Result<(Connection, PathBuf), PlanoError> {
    let cwd = env::current_dir().map_err(|e| PlanoError::database(e.to_string()))?;
    let dir = cwd.join(".plano");
    fs::create_dir_all(&dir).map_err(|e| PlanoError::database(e.to_string()))?;
    let path = dir.join("plano.db");
    let conn = Connection::open(&path)?;
    configure_connection(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok((conn, path))
}

fn configure_connection(conn: &Connection) -> Result<(), PlanoError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA busy_timeout=5000;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}
