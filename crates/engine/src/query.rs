// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read and cancellation queries (spec §4.5.4 / §6). Every query is
//! scoped to the calling tenant: an unknown id is `NotFound`, but a
//! workflow or job that exists under a different tenant is `Forbidden`.

use crate::engine::WorkflowEngine;
use crate::error::EngineError;
use crate::types::WorkflowView;
use wfs_core::{Clock, Job, JobId, TenantId, WorkflowId};
use wfs_scheduler::CancelOutcome;

impl<C: Clock + 'static> WorkflowEngine<C> {
    pub fn get_workflow(&self, tenant_id: &TenantId, workflow_id: &WorkflowId) -> Result<WorkflowView, EngineError> {
        let wf_arc = self
            .workflows
            .lock()
            .get(workflow_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound { kind: "workflow", id: workflow_id.to_string() })?;
        let wf = wf_arc.lock();
        if &wf.tenant_id != tenant_id {
            return Err(EngineError::Forbidden);
        }
        Ok(WorkflowView::from(&*wf))
    }

    #[must_use]
    pub fn list_workflows_by_tenant(&self, tenant_id: &TenantId) -> Vec<WorkflowView> {
        self.workflows
            .lock()
            .values()
            .filter_map(|wf_arc| {
                let wf = wf_arc.lock();
                (&wf.tenant_id == tenant_id).then(|| WorkflowView::from(&*wf))
            })
            .collect()
    }

    pub fn get_job(&self, tenant_id: &TenantId, job_id: &JobId) -> Result<Job, EngineError> {
        let workflow_id = self
            .job_index
            .lock()
            .get(job_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound { kind: "job", id: job_id.to_string() })?;
        let wf_arc = self
            .workflows
            .lock()
            .get(&workflow_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound { kind: "job", id: job_id.to_string() })?;
        let wf = wf_arc.lock();
        if &wf.tenant_id != tenant_id {
            return Err(EngineError::Forbidden);
        }
        wf.jobs
            .iter()
            .find(|j| &j.job_id == job_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound { kind: "job", id: job_id.to_string() })
    }

    /// Cancel a still-pending job. Mirrors `get_job`'s ownership check
    /// before delegating to the scheduler, which alone decides
    /// cancellability (only a still-queued job qualifies).
    pub fn cancel_job(&self, tenant_id: &TenantId, job_id: &JobId) -> Result<(), EngineError> {
        self.get_job(tenant_id, job_id)?;
        match self.scheduler.cancel(job_id, tenant_id) {
            CancelOutcome::Cancelled => Ok(()),
            CancelOutcome::NotCancellable => Err(EngineError::NotCancellable),
        }
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
