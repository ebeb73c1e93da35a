use crate::db::task_repo::TaskCounts;
use crate::models::{Attachment, Setor, Task, User};

pub fn print_task(t: &Task) {
    println!("Task: {} ({})", t.title, t.display_id());
    if let Some(ref desc) = t.description {
        println!("  Description: {desc}");
    }
    println!("  Status: {}", t.status.as_str());
    println!("  Priority: {}", t.priority.as_str());
    if let Some(ref assignee) = t.assignee {
        println!("  Assignee: {assignee}");
    }
    if let Some(ref due) = t.due_date {
        println!("  Due: {due}");
    }
    if !t.tags.is_empty() {
        println!("  Tags: {}", t.tags.join(", "));
    }
    println!("  Confirmation: {}", t.confirmation_status.as_str());
    if let Some(ref by) = t.confirmation_requested_by {
        println!("  Requested by: {by}");
    }
    if let Some(ref notes) = t.confirmation_notes {
        println!("  Request notes: {notes}");
    }
    if let Some(ref notes) = t.admin_notes {
        println!("  Admin notes: {notes}");
    }
}

pub fn print_task_list(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("Nenhuma atividade encontrada");
        return;
    }
    for t in tasks {
        let assignee = t.assignee.as_deref().unwrap_or("—");
        let due = t.due_date.as_deref().unwrap_or("—");
        println!(
            "  {} [{}] {} ({}, prazo {}) {}",
            t.display_id(),
            t.status.as_str(),
            t.title,
            assignee,
            due,
            if t.tags.is_empty() {
                String::new()
            } else {
                format!("#{}", t.tags.join(" #"))
            }
        );
    }
}

pub fn print_attachments(attachments: &[Attachment]) {
    for a in attachments {
        println!("  📎 {} ({})", a.file_name, a.id);
    }
}

pub fn print_pending(t: &Task, solicitante_nome: &str) {
    let requested_at = t.confirmation_requested_at.as_deref().unwrap_or("—");
    println!(
        "  {} {} — solicitado por {} em {}",
        t.display_id(),
        t.title,
        solicitante_nome,
        requested_at
    );
    if let Some(ref notes) = t.confirmation_notes {
        println!("    Notas: {notes}");
    }
}

pub fn print_setor_list(setores: &[Setor]) {
    if setores.is_empty() {
        println!("No setores found.");
        return;
    }
    for s in setores {
        let state = if s.ativo { "ativo" } else { "inativo" };
        println!("  {} ({}) [{}] {}", s.nome, s.id, state, s.cor);
    }
}

pub fn print_user_list(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }
    for u in users {
        let role = if u.is_admin { "admin" } else { "member" };
        let state = if u.ativo { "ativo" } else { "inativo" };
        println!("  {} <{}> [{role}] [{state}]", u.nome, u.email);
    }
}

pub fn print_counts(c: &TaskCounts) {
    println!("Total: {}", c.total);
    println!(
        "  backlog={} em_andamento={} bloqueado={} concluido={}",
        c.backlog, c.em_andamento, c.bloqueado, c.concluido
    );
    println!("  alta_prioridade={} atrasadas={}", c.alta, c.atrasadas);
}
