// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow: an ordered collection of [`Job`]s submitted together.

use crate::ids::{TenantId, WorkflowId};
use crate::job::{Job, JobStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTimestamps {
    pub created_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
}

/// A DAG of jobs submitted together under one `workflow_id`.
///
/// Retained forever once created (no TTL eviction) so it remains
/// queryable after completion; mutated only by the workflow engine and
/// the callbacks it hands the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub workflow_id: WorkflowId,
    pub name: String,
    pub tenant_id: TenantId,
    pub jobs: Vec<Job>,
    pub status: JobStatus,
    /// mean(job.progress for job in jobs)
    pub progress: f64,
    pub timestamps: WorkflowTimestamps,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Workflow {
    pub fn new(
        workflow_id: WorkflowId,
        name: String,
        tenant_id: TenantId,
        jobs: Vec<Job>,
        metadata: HashMap<String, serde_json::Value>,
        created_at_ms: u64,
    ) -> Self {
        Self {
            workflow_id,
            name,
            tenant_id,
            jobs,
            status: JobStatus::Pending,
            progress: 0.0,
            timestamps: WorkflowTimestamps { created_at_ms, ..Default::default() },
            metadata,
        }
    }

    pub fn jobs_completed(&self) -> usize {
        self.jobs.iter().filter(|j| j.status.is_terminal()).count()
    }

    pub fn jobs_total(&self) -> usize {
        self.jobs.len()
    }

    pub fn active_job_ids(&self) -> Vec<crate::ids::JobId> {
        self.jobs
            .iter()
            .filter(|j| j.status == JobStatus::Running)
            .map(|j| j.job_id.clone())
            .collect()
    }

    /// Recompute `progress` as the mean of constituent job progress.
    ///
    /// A workflow with zero jobs reports zero progress rather than
    /// dividing by zero or panicking.
    pub fn recompute_progress(&mut self) {
        if self.jobs.is_empty() {
            self.progress = 0.0;
            return;
        }
        let total: f64 = self.jobs.iter().map(|j| j.progress).sum();
        self.progress = total / self.jobs.len() as f64;
    }

    /// Terminal aggregate status, or `None` if any job is still
    /// non-terminal. FAILED dominates SUCCEEDED; CANCELLED counts as
    /// non-failure for aggregation.
    pub fn terminal_status(&self) -> Option<JobStatus> {
        if self.jobs.is_empty() || !self.jobs.iter().all(|j| j.status.is_terminal()) {
            return None;
        }
        if self.jobs.iter().any(|j| j.status == JobStatus::Failed) {
            Some(JobStatus::Failed)
        } else {
            Some(JobStatus::Succeeded)
        }
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
