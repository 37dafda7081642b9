use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;

use crate::model::{EntityKind, Id};

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid {entity}: {}", describe(.violations))]
    Validation {
        entity: EntityKind,
        violations: Vec<FieldViolation>,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: Id },

    #[error("{path_id} does not match {}", body_id_label(.body_id))]
    IdMismatch { path_id: Id, body_id: Option<Id> },

    #[error("Association already exists between {tree_name} and {insect_name}")]
    DuplicateAssociation {
        tree_name: String,
        insect_name: String,
    },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

fn describe(violations: &[FieldViolation]) -> String {
    violations.iter().map(|v| v.message.as_str()).join(", ")
}

fn body_id_label(body_id: &Option<Id>) -> String {
    match body_id {
        Some(id) => id.to_string(),
        None => "missing body id".to_string(),
    }
}

impl ServiceError {
    pub fn not_found(entity: EntityKind, id: Id) -> Self {
        ServiceError::NotFound { entity, id }
    }

    /// Human readable detail line used in error envelopes
    pub fn details(&self) -> String {
        match self {
            ServiceError::Validation { violations, .. } => describe(violations),
            ServiceError::NotFound { entity, .. } => format!("{} not found", entity.title()),
            ServiceError::Store(err) => format!("{:#}", err),
            other => other.to_string(),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
