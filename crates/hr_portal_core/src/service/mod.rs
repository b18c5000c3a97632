//! Portal use-case services.
//!
//! # Responsibility
//! - Turn page intents into state-store reads and writes.
//! - Own validation and workflow rules; never touch rendering.
//!
//! # Invariants
//! - Validation failures never write to the store.
//! - Services reach storage only through [`crate::state::StateStore`].

pub mod approval_service;
pub mod people_service;
pub mod report_service;
pub mod request_service;
pub mod settings_service;

use crate::state::StateError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    State(StateError),
    /// User-facing validation failure; `message` is shown verbatim.
    Validation { field: String, message: String },
    NotFound { kind: &'static str, id: String },
    /// Workflow step not allowed from the record's current status.
    InvalidTransition { id: String, status: String },
}

impl ServiceError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Message suitable for an error toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State(err) => write!(f, "{err}"),
            Self::Validation { field, message } => write!(f, "{message} (field `{field}`)"),
            Self::NotFound { kind, id } => write!(f, "{kind} `{id}` not found"),
            Self::InvalidTransition { id, status } => {
                write!(f, "`{id}` cannot be decided from status `{status}`")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::State(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StateError> for ServiceError {
    fn from(value: StateError) -> Self {
        Self::State(value)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::State(StateError::Serialize(value))
    }
}
