// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job data model and status lattice.

use crate::ids::{Branch, JobId, TenantId, WorkflowId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Job type tag. New variants require an executor registration (see
/// `wfs-executor`) before they can run — an unregistered type fails the
/// job at dispatch time rather than at submission time, per spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    CellSegmentation,
    TissueMask,
}

crate::simple_display! {
    JobType {
        CellSegmentation => "cell_segmentation",
        TissueMask => "tissue_mask",
    }
}

/// Job execution status.
///
/// Lattice (initial state `Pending`):
/// - `Pending -> Running` (dispatched)
/// - `Pending -> Cancelled` (cancellation while queued)
/// - `Running -> Succeeded` (executor returned normally)
/// - `Running -> Failed` (executor raised, or framework marked so)
///
/// `Succeeded`, `Failed`, and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled)
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "PENDING",
        Running => "RUNNING",
        Succeeded => "SUCCEEDED",
        Failed => "FAILED",
        Cancelled => "CANCELLED",
    }
}

/// Wall-clock timestamps tracked over a job's lifetime. All are
/// milliseconds since the Unix epoch (see `Clock::epoch_ms`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTimestamps {
    pub created_at_ms: u64,
    pub first_progress_at_ms: Option<u64>,
    pub last_progress_at_ms: Option<u64>,
    pub started_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
}

/// A single unit of work inside a [`crate::workflow::Workflow`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub job_type: JobType,
    pub image_path: String,
    pub branch: Branch,
    pub tenant_id: TenantId,
    pub workflow_id: WorkflowId,
    pub depends_on: Vec<JobId>,

    pub status: JobStatus,
    /// 0.0..=1.0
    pub progress: f64,
    pub tiles_processed: u64,
    pub tiles_total: u64,

    pub metadata: HashMap<String, serde_json::Value>,
    pub timestamps: JobTimestamps,

    pub result_path: Option<String>,
    pub error_message: Option<String>,
}

impl Job {
    /// Construct a new job in the initial `Pending` state.
    ///
    /// `branch` must be non-empty; callers validate this at the API
    /// boundary (see `ServiceError::InvalidArgument`) before reaching here.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job_id: JobId,
        workflow_id: WorkflowId,
        tenant_id: TenantId,
        job_type: JobType,
        image_path: String,
        branch: Branch,
        depends_on: Vec<JobId>,
        metadata: HashMap<String, serde_json::Value>,
        created_at_ms: u64,
    ) -> Self {
        Self {
            job_id,
            job_type,
            image_path,
            branch,
            tenant_id,
            workflow_id,
            depends_on,
            status: JobStatus::Pending,
            progress: 0.0,
            tiles_processed: 0,
            tiles_total: 0,
            metadata,
            timestamps: JobTimestamps { created_at_ms, ..Default::default() },
            result_path: None,
            error_message: None,
        }
    }

    /// Elapsed time since first progress was observed, or `None` if the
    /// job never reported progress > 0.
    pub fn elapsed_seconds(&self, now_ms: u64) -> Option<f64> {
        let first = self.timestamps.first_progress_at_ms?;
        Some(now_ms.saturating_sub(first) as f64 / 1000.0)
    }

    /// Estimated remaining time, derived as `elapsed / progress * (1 -
    /// progress)`. Defined only while progress is in the open interval
    /// (0, 1); undefined at the boundaries (no meaningful rate yet, or
    /// already done).
    pub fn estimated_remaining_seconds(&self, now_ms: u64) -> Option<f64> {
        if self.progress <= 0.0 || self.progress >= 1.0 {
            return None;
        }
        let elapsed = self.elapsed_seconds(now_ms)?;
        Some(elapsed / self.progress * (1.0 - self.progress))
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
