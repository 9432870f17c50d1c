// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridge from scheduler-owned transitions back into the engine-owned
//! `Job`/`Workflow` records. The scheduler never holds a live reference
//! into these records; it calls back through this trait implementation
//! at `submit` time (see spec §5's resolution of "weak reference by ID").

use crate::engine::WorkflowStore;
use wfs_core::{JobId, JobStatus, SharedMetricsSink, TenantId, WorkflowId};
use wfs_scheduler::{AdmissionController, ProgressBus, ProgressEnvelope, TenantRegistry};
use std::sync::Arc;

pub struct EngineJobSink {
    workflows: WorkflowStore,
    bus: Arc<ProgressBus>,
    metrics: SharedMetricsSink,
    tenant_registry: Arc<TenantRegistry>,
    admission: Arc<AdmissionController>,
}

impl EngineJobSink {
    pub fn new(
        workflows: WorkflowStore,
        bus: Arc<ProgressBus>,
        metrics: SharedMetricsSink,
        tenant_registry: Arc<TenantRegistry>,
        admission: Arc<AdmissionController>,
    ) -> Self {
        Self { workflows, bus, metrics, tenant_registry, admission }
    }

    fn workflow_progress_envelope(wf: &wfs_core::Workflow) -> ProgressEnvelope {
        ProgressEnvelope::WorkflowProgress {
            workflow_id: wf.workflow_id.clone(),
            progress: wf.progress,
            status: wf.status,
            jobs_completed: wf.jobs_completed(),
            jobs_total: wf.jobs_total(),
        }
    }

    /// Promote a PENDING workflow to RUNNING once its tenant is admitted,
    /// setting `started_at` the first time this happens (spec §4.5.3).
    fn maybe_start(&self, wf: &mut wfs_core::Workflow, now_ms: u64) {
        if wf.status == JobStatus::Pending && self.admission.is_active(&wf.tenant_id) {
            wf.status = JobStatus::Running;
            if wf.timestamps.started_at_ms.is_none() {
                wf.timestamps.started_at_ms = Some(now_ms);
            }
        }
    }

    fn broadcast_and_meter(&self, tenant_id: &TenantId, wf_id: &WorkflowId, progress: f64, envelope: ProgressEnvelope) {
        self.bus.broadcast(tenant_id, envelope);
        self.metrics.set_workflow_progress(wf_id.as_str(), tenant_id.as_str(), progress);
    }
}

impl wfs_scheduler::JobSink for EngineJobSink {
    fn mark_running(&self, workflow_id: &WorkflowId, job_id: &JobId, started_at_ms: u64) {
        let Some(wf_arc) = self.workflows.lock().get(workflow_id).cloned() else { return };
        let mut wf = wf_arc.lock();
        if let Some(job) = wf.jobs.iter_mut().find(|j| &j.job_id == job_id) {
            job.status = JobStatus::Running;
            job.timestamps.started_at_ms = Some(started_at_ms);
        }
        self.maybe_start(&mut wf, started_at_ms);
        wf.recompute_progress();
        let tenant_id = wf.tenant_id.clone();
        let progress = wf.progress;
        let envelope = Self::workflow_progress_envelope(&wf);
        drop(wf);
        self.broadcast_and_meter(&tenant_id, workflow_id, progress, envelope);
    }

    fn mark_terminal(
        &self,
        workflow_id: &WorkflowId,
        job_id: &JobId,
        status: JobStatus,
        error_message: Option<String>,
        completed_at_ms: u64,
    ) {
        let Some(wf_arc) = self.workflows.lock().get(workflow_id).cloned() else { return };
        let mut wf = wf_arc.lock();
        if let Some(job) = wf.jobs.iter_mut().find(|j| &j.job_id == job_id) {
            job.status = status;
            job.timestamps.completed_at_ms = Some(completed_at_ms);
            job.error_message = error_message;
        }
        wf.recompute_progress();

        if !wf.status.is_terminal() {
            if let Some(terminal) = wf.terminal_status() {
                wf.status = terminal;
                wf.timestamps.completed_at_ms = Some(completed_at_ms);
                self.tenant_registry.remove_workflow(&wf.tenant_id, workflow_id);
            }
        }

        let tenant_id = wf.tenant_id.clone();
        let progress = wf.progress;
        let envelope = Self::workflow_progress_envelope(&wf);
        drop(wf);
        self.broadcast_and_meter(&tenant_id, workflow_id, progress, envelope);
    }
}
