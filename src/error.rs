use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotInitialized,
    NotAuthenticated,
    SessionExpired,
    InvalidCode,
    Unauthorized,
    ValidationError,
    NotFound,
    AmbiguousRef,
    NoPendingRequest,
    DependencyError,
    DatabaseError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::InvalidCode => "INVALID_CODE",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::AmbiguousRef => "AMBIGUOUS_REF",
            Self::NoPendingRequest => "NO_PENDING_REQUEST",
            Self::DependencyError => "DEPENDENCY_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct PlanoError {
    pub code: ErrorCode,
    pub message: String,
}

impl PlanoError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_initialized() -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            "plano is not initialized. Run `plano init` first.",
        )
    }

    pub fn not_authenticated() -> Self {
        Self::new(
            ErrorCode::NotAuthenticated,
            "Not authenticated. Run `plano auth request <email>` then `plano auth verify`.",
        )
    }

    pub fn session_expired() -> Self {
        Self::new(
            ErrorCode::SessionExpired,
            "Session expired (more than 24 hours since verification). Log in again.",
        )
    }

    pub fn invalid_code() -> Self {
        Self::new(
            ErrorCode::InvalidCode,
            "Invalid or expired one-time code. Request a new one.",
        )
    }

    pub fn unauthorized(action: &str) -> Self {
        Self::new(
            ErrorCode::Unauthorized,
            format!("Admin role required to {action}"),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn task_not_found(reference: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("Task not found: {reference}"))
    }

    pub fn setor_not_found(reference: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("Setor not found: {reference}"))
    }

    pub fn user_not_found(reference: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("User not found: {reference}"))
    }

    pub fn ambiguous_ref(reference: &str, candidates: &[String]) -> Self {
        Self::new(
            ErrorCode::AmbiguousRef,
            format!(
                "Ambiguous reference '{}'. Candidates: {}",
                reference,
                candidates.join(", ")
            ),
        )
    }

    pub fn no_pending_request(reference: &str) -> Self {
        Self::new(
            ErrorCode::NoPendingRequest,
            format!("Task {reference} has no pending completion request"),
        )
    }

    pub fn dependency(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DependencyError, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl From<rusqlite::Error> for PlanoError {
    fn from(e: rusqlite::Error) -> Self {
        Self::database(e.to_string())
    }
}

impl From<serde_json::Error> for PlanoError {
    fn from(e: serde_json::Error) -> Self {
        Self::database(e.to_string())
    }
}
