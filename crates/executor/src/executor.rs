// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor Registry (C7): the named external collaborator interface
//! through which job types are registered and dispatched.
//!
//! A real tiled-WSI inference pipeline is explicitly out of scope (see
//! spec Non-goals); this crate ships only the trait and a deterministic
//! stand-in ([`crate::SimulatedExecutor`]) used by tests and the daemon's
//! demo wiring.

use crate::context::{ExecutionContext, ProgressReporter};
use crate::error::ExecutorError;
use async_trait::async_trait;

/// Outcome of a successful execution. `result_path` is opaque to the
/// core (see spec §6 `get_job_results`); `None` means the job produced no
/// addressable result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOutcome {
    pub result_path: Option<String>,
}

#[async_trait]
pub trait JobExecutor: Send + Sync {
    async fn execute(&self, ctx: ExecutionContext, progress: ProgressReporter) -> Result<JobOutcome, ExecutorError>;
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
