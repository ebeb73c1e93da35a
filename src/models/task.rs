use serde::{Deserialize, Serialize};

/// Visible lifecycle status of a task. Values are stored verbatim (the
/// Portuguese labels double as the wire/storage representation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Backlog,
    #[serde(rename = "Em andamento")]
    EmAndamento,
    Bloqueado,
    #[serde(rename = "Concluído")]
    Concluido,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::EmAndamento => "Em andamento",
            Self::Bloqueado => "Bloqueado",
            Self::Concluido => "Concluído",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Backlog" => Some(Self::Backlog),
            "Em andamento" => Some(Self::EmAndamento),
            "Bloqueado" => Some(Self::Bloqueado),
            "Concluído" => Some(Self::Concluido),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Baixa,
    #[serde(rename = "Média")]
    Media,
    Alta,
    #[serde(rename = "Crítica")]
    Critica,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baixa => "Baixa",
            Self::Media => "Média",
            Self::Alta => "Alta",
            Self::Critica => "Crítica",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Baixa" => Some(Self::Baixa),
            "Média" => Some(Self::Media),
            "Alta" => Some(Self::Alta),
            "Crítica" => Some(Self::Critica),
            _ => None,
        }
    }
}

/// State of the completion-approval handshake. Transitions are governed by
/// `crate::workflow`; nothing else may move a task out of `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    None,
    Pending,
    Approved,
    Rejected,
}

impl ConfirmationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Human-facing display id (`ID001`, ...). `None` only on legacy rows
    /// that have not been backfilled yet.
    pub sequential_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    /// ISO date (YYYY-MM-DD).
    pub due_date: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub tags: Vec<String>,
    pub setor_id: String,
    pub confirmation_status: ConfirmationStatus,
    pub confirmation_requested_at: Option<String>,
    pub confirmation_requested_by: Option<String>,
    pub confirmation_notes: Option<String>,
    pub confirmation_approved_at: Option<String>,
    pub confirmation_approved_by: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    pub fn display_id(&self) -> &str {
        self.sequential_id.as_deref().unwrap_or(&self.id)
    }
}
