// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps the engine's narrow error enum onto the shared taxonomy exposed
//! at the composition-root facade (spec §7: "errors are mapped onto a
//! shared taxonomy only at the boundary a caller actually sees").

use wfs_core::ServiceError;
use wfs_engine::EngineError;

pub fn map_engine_error(err: EngineError) -> ServiceError {
    match err {
        EngineError::Forbidden => ServiceError::Forbidden,
        EngineError::NotFound { kind, id } => ServiceError::not_found(kind, id),
        EngineError::InvalidArgument(msg) => ServiceError::InvalidArgument(msg),
        EngineError::NotCancellable => ServiceError::NotCancellable,
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
