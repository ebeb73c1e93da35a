use rusqlite::Connection;

use crate::error::PlanoError;

// Uniqueness of setores.nome and usuarios.email is deliberately NOT a
// database constraint; the repositories pre-check with a read before
// insert/update, mirroring the hosted backend this schema descends from.
pub fn run_migrations(conn: &Connection) -> Result<(), PlanoError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS setores (
            id TEXT PRIMARY KEY,
            nome TEXT NOT NULL,
            cor TEXT NOT NULL,
            ativo INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS usuarios (
            id TEXT PRIMARY KEY,
            nome TEXT NOT NULL,
            email TEXT NOT NULL,
            setor_id TEXT NOT NULL REFERENCES setores(id),
            is_admin INTEGER NOT NULL DEFAULT 0,
            ativo INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            sequential_id TEXT,
            title TEXT NOT NULL,
            description TEXT,
            assignee TEXT,
            due_date TEXT,
            priority TEXT NOT NULL DEFAULT 'Média'
                CHECK (priority IN ('Baixa', 'Média', 'Alta', 'Crítica')),
            status TEXT NOT NULL DEFAULT 'Backlog'
                CHECK (status IN ('Backlog', 'Em andamento', 'Bloqueado', 'Concluído')),
            tags TEXT NOT NULL DEFAULT '[]',
            setor_id TEXT NOT NULL REFERENCES setores(id),
            confirmation_status TEXT NOT NULL DEFAULT 'none'
                CHECK (confirmation_status IN ('none', 'pending', 'approved', 'rejected')),
            confirmation_requested_at TEXT,
            confirmation_requested_by TEXT,
            confirmation_notes TEXT,
            confirmation_approved_at TEXT,
            confirmation_approved_by TEXT,
            admin_notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS task_attachments (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            file_name TEXT NOT NULL,
            file_url TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            code TEXT NOT NULL,
            issued_at TEXT NOT NULL,
            verified_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_setor ON tasks(setor_id, status);
        CREATE INDEX IF NOT EXISTS idx_tasks_pending ON tasks(confirmation_requested_at)
            WHERE confirmation_status = 'pending';
        CREATE INDEX IF NOT EXISTS idx_attachments_task ON task_attachments(task_id);
        CREATE INDEX IF NOT EXISTS idx_usuarios_email ON usuarios(email);
        ",
    )?;
    Ok(())
}
