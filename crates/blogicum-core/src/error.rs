//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Absent, or present but hidden from the viewer. The two cases are
    /// deliberately indistinguishable.
    #[error("{entity_type} not found")]
    NotFound { entity_type: &'static str },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Unauthorized access")]
    Unauthorized,
}

impl DomainError {
    pub fn post_not_found() -> Self {
        Self::NotFound { entity_type: "Post" }
    }

    pub fn comment_not_found() -> Self {
        Self::NotFound {
            entity_type: "Comment",
        }
    }

    pub fn category_not_found() -> Self {
        Self::NotFound {
            entity_type: "Category",
        }
    }

    pub fn user_not_found() -> Self {
        Self::NotFound { entity_type: "User" }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
