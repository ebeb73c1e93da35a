//! Completion-confirmation state machine.
//!
//! A task reaches `Concluído` through a two-party handshake: a requester
//! files a completion request (`confirmation_status` → `pending`), and an
//! admin approves or rejects it. These functions are pure — they validate
//! the transition and compute the field set to persist; the repository
//! layer writes that set as a single UPDATE.

use chrono::{DateTime, Utc};

use crate::error::PlanoError;
use crate::models::{ConfirmationStatus, Task, TaskStatus};

/// Authenticated identity acting on the workflow.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub email: String,
    pub nome: String,
    pub is_admin: bool,
}

/// Field set persisted when a completion request is filed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub confirmation_status: ConfirmationStatus,
    pub requested_at: String,
    pub requested_by: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Approve,
    Reject,
}

/// Field set persisted when an admin resolves a pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResolution {
    pub status: TaskStatus,
    pub confirmation_status: ConfirmationStatus,
    pub approved_at: String,
    pub approved_by: String,
    pub admin_notes: Option<String>,
}

/// File (or re-file) a completion request. Allowed from any prior
/// confirmation state: re-requesting while `pending` replaces the request
/// metadata, and requesting after `approved`/`rejected` opens a fresh
/// handshake. The task's visible `status` is untouched at this step.
pub fn request_completion(
    actor: &Actor,
    now: DateTime<Utc>,
    notes: Option<&str>,
) -> CompletionRequest {
    CompletionRequest {
        confirmation_status: ConfirmationStatus::Pending,
        requested_at: now.to_rfc3339(),
        requested_by: actor.email.clone(),
        notes: notes.map(str::to_string),
    }
}

/// Resolve a pending request. Admin only — the role check runs before any
/// field is computed, so a rejected caller never mutates anything. Approve
/// forces `status = Concluído`; reject forces `status = Em andamento`
/// regardless of what the status was when the request was filed, and the
/// record of rejection persists until a new request is filed.
pub fn resolve_completion(
    task: &Task,
    actor: &Actor,
    resolution: Resolution,
    now: DateTime<Utc>,
    admin_notes: Option<&str>,
) -> Result<CompletionResolution, PlanoError> {
    if !actor.is_admin {
        return Err(PlanoError::unauthorized(
            "approve or reject completion requests",
        ));
    }
    if task.confirmation_status != ConfirmationStatus::Pending {
        return Err(PlanoError::no_pending_request(task.display_id()));
    }

    let (status, confirmation_status) = match resolution {
        Resolution::Approve => (TaskStatus::Concluido, ConfirmationStatus::Approved),
        Resolution::Reject => (TaskStatus::EmAndamento, ConfirmationStatus::Rejected),
    };

    Ok(CompletionResolution {
        status,
        confirmation_status,
        approved_at: now.to_rfc3339(),
        approved_by: actor.id.clone(),
        admin_notes: admin_notes.map(str::to_string),
    })
}

/// Display name of a pending request's requester: the matching user's name,
/// falling back to the raw requester email, then to a sentinel.
pub fn requester_display_name(
    requested_by: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> String {
    match requested_by {
        Some(email) if !email.is_empty() => lookup(email).unwrap_or_else(|| email.to_string()),
        _ => "Não identificado".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::TimeZone;

    fn actor(is_admin: bool) -> Actor {
        Actor {
            id: "u1".into(),
            email: "ana@example.com".into(),
            nome: "Ana".into(),
            is_admin,
        }
    }

    fn task(status: TaskStatus, confirmation: ConfirmationStatus) -> Task {
        Task {
            id: "t1".into(),
            sequential_id: Some("ID001".into()),
            title: "Revisar relatório".into(),
            description: None,
            assignee: Some("Ana".into()),
            due_date: None,
            priority: Priority::Media,
            status,
            tags: vec![],
            setor_id: "s1".into(),
            confirmation_status: confirmation,
            confirmation_requested_at: None,
            confirmation_requested_by: None,
            confirmation_notes: None,
            confirmation_approved_at: None,
            confirmation_approved_by: None,
            admin_notes: None,
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_request_sets_pending_with_requester() {
        let req = request_completion(&actor(false), now(), Some("terminei"));
        assert_eq!(req.confirmation_status, ConfirmationStatus::Pending);
        assert_eq!(req.requested_by, "ana@example.com");
        assert_eq!(req.notes.as_deref(), Some("terminei"));
    }

    #[test]
    fn test_rerequest_while_pending_replaces_metadata() {
        let first = request_completion(&actor(false), now(), Some("v1"));
        let mut other = actor(false);
        other.email = "bia@example.com".into();
        let second = request_completion(&other, now(), Some("v2"));
        assert_eq!(first.confirmation_status, second.confirmation_status);
        assert_eq!(second.requested_by, "bia@example.com");
        assert_eq!(second.notes.as_deref(), Some("v2"));
    }

    #[test]
    fn test_approve_forces_concluido() {
        let t = task(TaskStatus::Backlog, ConfirmationStatus::Pending);
        let res = resolve_completion(&t, &actor(true), Resolution::Approve, now(), None).unwrap();
        assert_eq!(res.status, TaskStatus::Concluido);
        assert_eq!(res.confirmation_status, ConfirmationStatus::Approved);
        assert_eq!(res.approved_by, "u1");
    }

    #[test]
    fn test_reject_forces_em_andamento_regardless_of_prior_status() {
        for prior in [TaskStatus::Backlog, TaskStatus::Bloqueado, TaskStatus::Concluido] {
            let t = task(prior, ConfirmationStatus::Pending);
            let res =
                resolve_completion(&t, &actor(true), Resolution::Reject, now(), Some("refazer"))
                    .unwrap();
            assert_eq!(res.status, TaskStatus::EmAndamento);
            assert_eq!(res.confirmation_status, ConfirmationStatus::Rejected);
            assert_eq!(res.admin_notes.as_deref(), Some("refazer"));
        }
    }

    #[test]
    fn test_non_admin_cannot_resolve() {
        let t = task(TaskStatus::EmAndamento, ConfirmationStatus::Pending);
        for resolution in [Resolution::Approve, Resolution::Reject] {
            let err = resolve_completion(&t, &actor(false), resolution, now(), None).unwrap_err();
            assert_eq!(err.code, crate::error::ErrorCode::Unauthorized);
        }
    }

    #[test]
    fn test_no_direct_transition_from_none_or_resolved() {
        for confirmation in [
            ConfirmationStatus::None,
            ConfirmationStatus::Approved,
            ConfirmationStatus::Rejected,
        ] {
            let t = task(TaskStatus::EmAndamento, confirmation);
            let err =
                resolve_completion(&t, &actor(true), Resolution::Approve, now(), None).unwrap_err();
            assert_eq!(err.code, crate::error::ErrorCode::NoPendingRequest);
        }
    }

    #[test]
    fn test_requester_display_name_fallbacks() {
        let known = requester_display_name(Some("ana@example.com"), |email| {
            (email == "ana@example.com").then(|| "Ana".to_string())
        });
        assert_eq!(known, "Ana");

        let unknown = requester_display_name(Some("x@y.z"), |_| None);
        assert_eq!(unknown, "x@y.z");

        assert_eq!(requester_display_name(None, |_| None), "Não identificado");
        assert_eq!(requester_display_name(Some(""), |_| None), "Não identificado");
    }
}
