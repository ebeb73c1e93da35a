use serde_json::{json, Value};

use crate::db::task_repo::TaskCounts;
use crate::error::PlanoError;
use crate::models::{Attachment, Setor, Task, User};

pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

pub fn error(err: &PlanoError) -> Value {
    json!({
        "success": false,
        "error": {
            "code": err.code.as_str(),
            "message": err.message
        }
    })
}

pub fn task_summary(t: &Task) -> Value {
    json!({
        "id": t.id,
        "sequential_id": t.sequential_id,
        "title": t.title,
        "assignee": t.assignee,
        "due_date": t.due_date,
        "priority": t.priority.as_str(),
        "status": t.status.as_str(),
        "tags": t.tags,
        "confirmation_status": t.confirmation_status.as_str()
    })
}

pub fn task_detail(t: &Task, attachments: &[Attachment]) -> Value {
    json!({
        "id": t.id,
        "sequential_id": t.sequential_id,
        "title": t.title,
        "description": t.description,
        "assignee": t.assignee,
        "due_date": t.due_date,
        "priority": t.priority.as_str(),
        "status": t.status.as_str(),
        "tags": t.tags,
        "setor_id": t.setor_id,
        "confirmation_status": t.confirmation_status.as_str(),
        "confirmation_requested_at": t.confirmation_requested_at,
        "confirmation_requested_by": t.confirmation_requested_by,
        "confirmation_notes": t.confirmation_notes,
        "confirmation_approved_at": t.confirmation_approved_at,
        "confirmation_approved_by": t.confirmation_approved_by,
        "admin_notes": t.admin_notes,
        "attachments": attachments.iter().map(attachment_json).collect::<Vec<_>>(),
        "created_at": t.created_at,
        "updated_at": t.updated_at
    })
}

pub fn pending_entry(t: &Task, solicitante_nome: &str) -> Value {
    json!({
        "id": t.id,
        "sequential_id": t.sequential_id,
        "title": t.title,
        "status": t.status.as_str(),
        "requested_at": t.confirmation_requested_at,
        "requested_by": t.confirmation_requested_by,
        "solicitante_nome": solicitante_nome,
        "notes": t.confirmation_notes
    })
}

pub fn attachment_json(a: &Attachment) -> Value {
    json!({
        "id": a.id,
        "name": a.file_name,
        "url": a.file_url
    })
}

pub fn setor_json(s: &Setor) -> Value {
    json!({
        "id": s.id,
        "nome": s.nome,
        "cor": s.cor,
        "ativo": s.ativo,
        "created_at": s.created_at
    })
}

pub fn user_json(u: &User) -> Value {
    json!({
        "id": u.id,
        "nome": u.nome,
        "email": u.email,
        "setor_id": u.setor_id,
        "is_admin": u.is_admin,
        "ativo": u.ativo,
        "created_at": u.created_at
    })
}

pub fn counts_json(c: &TaskCounts) -> Value {
    json!({
        "total": c.total,
        "backlog": c.backlog,
        "em_andamento": c.em_andamento,
        "bloqueado": c.bloqueado,
        "concluido": c.concluido,
        "alta": c.alta,
        "atrasadas": c.atrasadas
    })
}
