// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service composition root (C8): wires the Tenant Registry, Admission
//! Controller, Progress Bus, Scheduler, and Workflow Engine together in
//! dependency order and exposes the foreground operations named in
//! spec §6. Carries no on-disk state — a restart loses queued and
//! in-flight work, by design (see Non-goals).

use crate::error::map_engine_error;
use crate::subscriber::ChannelSubscriber;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use wfs_core::{JobType, SharedMetricsSink, SystemClock, TenantId};
use wfs_engine::{JobSubmission as EngineJobSubmission, WorkflowEngine, WorkflowSubmission, WorkflowView};
use wfs_executor::JobExecutor;
use wfs_scheduler::{AdmissionController, ProgressBus, ProgressEnvelope, TenantRegistry};

pub use wfs_core::{Job, JobId, ServiceError, WorkflowId};

pub struct Service {
    engine: Arc<WorkflowEngine<SystemClock>>,
    bus: Arc<ProgressBus>,
    admission: Arc<AdmissionController>,
    tenant_registry: Arc<TenantRegistry>,
}

impl Service {
    #[must_use]
    pub fn new(
        scheduler_config: wfs_scheduler::SchedulerConfig,
        max_active_users: usize,
        executors: HashMap<JobType, Arc<dyn JobExecutor>>,
        metrics: SharedMetricsSink,
    ) -> Self {
        let tenant_registry = Arc::new(TenantRegistry::new());
        let admission = Arc::new(AdmissionController::new(max_active_users));
        let bus = Arc::new(ProgressBus::new());

        let engine = WorkflowEngine::new(
            scheduler_config,
            tenant_registry.clone(),
            admission.clone(),
            bus.clone(),
            executors,
            metrics,
            SystemClock,
            Arc::new(wfs_core::UuidIdGen),
        );

        Self { engine, bus, admission, tenant_registry }
    }

    /// Start the scheduler's background dispatch loop. Call once.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        self.engine.start()
    }

    /// Request cooperative shutdown of the dispatch loop.
    pub fn shutdown(&self) {
        self.engine.shutdown();
    }

    pub fn submit_workflow(
        &self,
        tenant_id: TenantId,
        name: String,
        jobs: Vec<EngineJobSubmission>,
    ) -> Result<WorkflowId, ServiceError> {
        let submission = WorkflowSubmission { name, metadata: HashMap::new(), jobs };
        self.engine.create_workflow(tenant_id, submission).map_err(map_engine_error)
    }

    pub fn get_workflow(&self, tenant_id: &TenantId, workflow_id: &WorkflowId) -> Result<WorkflowView, ServiceError> {
        self.engine.get_workflow(tenant_id, workflow_id).map_err(map_engine_error)
    }

    #[must_use]
    pub fn list_workflows(&self, tenant_id: &TenantId) -> Vec<WorkflowView> {
        self.engine.list_workflows_by_tenant(tenant_id)
    }

    pub fn get_job(&self, tenant_id: &TenantId, job_id: &JobId) -> Result<Job, ServiceError> {
        self.engine.get_job(tenant_id, job_id).map_err(map_engine_error)
    }

    /// The result path of a completed job, or `None` if it hasn't
    /// produced one yet (still running, or finished without one).
    pub fn get_job_result(&self, tenant_id: &TenantId, job_id: &JobId) -> Result<Option<String>, ServiceError> {
        self.engine.get_job(tenant_id, job_id).map(|job| job.result_path).map_err(map_engine_error)
    }

    pub fn cancel_job(&self, tenant_id: &TenantId, job_id: &JobId) -> Result<(), ServiceError> {
        self.engine.cancel_job(tenant_id, job_id).map_err(map_engine_error)
    }

    /// Subscribe `tenant_id` to its progress feed, returning the receiving
    /// end of a bounded channel a caller (e.g. a websocket forwarding
    /// task, out of scope here) drains.
    pub fn subscribe(&self, tenant_id: &TenantId) -> mpsc::Receiver<ProgressEnvelope> {
        let (subscriber, rx) = ChannelSubscriber::channel();
        self.bus.subscribe(tenant_id, Arc::new(subscriber));
        rx
    }

    #[must_use]
    pub fn active_tenant_count(&self) -> usize {
        self.admission.active_count()
    }

    #[must_use]
    pub fn tenant_registry(&self) -> &Arc<TenantRegistry> {
        &self.tenant_registry
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
