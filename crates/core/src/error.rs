// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared across the crate boundary.
//!
//! Internal components (scheduler, engine) return their own narrow error
//! enums; `ServiceError` is what the composition-root facade maps those
//! onto, so the taxonomy mapping lives in exactly one place.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("missing tenant identity")]
    Unauthenticated,

    #[error("tenant does not own this resource")]
    Forbidden,

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("job is not cancellable")]
    NotCancellable,

    #[error("job failed: {0}")]
    ExecutionFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        ServiceError::NotFound { kind, id: id.into() }
    }
}
