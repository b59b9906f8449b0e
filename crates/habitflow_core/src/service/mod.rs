//! Core use-case services, one per collection.
//!
//! # Responsibility
//! - Translate typed parameters into document-store calls.
//! - Validate input before any store call.
//! - Own the goal-deletion cascade and the habit-log upsert.
//!
//! # Invariants
//! - Owner-scoped calls take the owner id explicitly; there is no ambient
//!   current user.
//! - Every update restamps `updatedAt`.
//! - Failures propagate to the caller unchanged; nothing is retried.

pub mod goal_service;
pub mod habit_log_service;
pub mod habit_service;
pub mod profile_service;
pub mod swot_service;
pub mod task_service;

use crate::model::validation::ValidationError;
use crate::store::{Collection, DocumentId, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by every service operation.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before any store call.
    Validation(ValidationError),
    /// Target document does not exist.
    NotFound {
        collection: Collection,
        id: DocumentId,
    },
    /// Store-level failure (connectivity, schema, malformed documents).
    Store(StoreError),
    /// Read-back after a successful write did not find the document.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => write!(f, "{collection} not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { collection, id } => Self::NotFound { collection, id },
            other => Self::Store(other),
        }
    }
}
