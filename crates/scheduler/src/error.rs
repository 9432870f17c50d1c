// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Narrow error type for `wfs-scheduler`.
//!
//! Foreground operations (`submit`, `cancel`, `queue_depth`,
//! `running_count`) have no failure modes per design; this enum exists
//! for the dispatch loop's own housekeeping, where an unhandled error is
//! logged and the loop continues rather than propagated.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("execution task for job {job_id} panicked: {reason}")]
    ExecutionPanicked { job_id: String, reason: String },

    #[error("no executor registered for job {job_id}")]
    MissingExecutor { job_id: String },
}
