// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ExecutorError {
    #[error("no executor registered for job type {0}")]
    UnregisteredJobType(String),

    #[error("execution failed: {0}")]
    Failed(String),
}
