//! Error taxonomy for the command and query surfaces.
//!
//! Callers map categories to their own response vocabulary
//! (e.g. invalid input vs. conflict), so the variants stay
//! distinguishable and internal detail is never required to
//! interpret them.

use uuid::Uuid;

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Coarse category of a [`DomainError`], for response mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed command input.
    InvalidInput,
    /// Referenced aggregate does not exist.
    NotFound,
    /// A business rule or state-machine guard rejected the command.
    Conflict,
    /// Everything else; reported generically.
    Internal,
}

/// Errors produced by command validation, handlers, and queries.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Raised during command construction, before any repository access.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// State-machine guard failure, ownership mismatch, or an
    /// approval/availability rule rejecting the command.
    #[error("business rule violated: {0}")]
    RuleViolation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn rule(message: impl Into<String>) -> Self {
        Self::RuleViolation(message.into())
    }

    /// Category used by callers to pick a response class.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput(_) => ErrorCategory::InvalidInput,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::RuleViolation(_) => ErrorCategory::Conflict,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}
