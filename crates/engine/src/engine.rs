// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow Engine (C5): owns workflow objects, expands submissions into
//! jobs with globally-unique IDs, aggregates progress, and computes
//! terminal state.
//!
//! The engine constructs its own `Scheduler` (C4) internally, wiring a
//! [`crate::sink::EngineJobSink`] as the bridge that writes
//! scheduler-owned fields (status, `started_at`, `completed_at`,
//! `error_message`) back into the engine-owned `Job` record, per the
//! single-writer discipline in the data model.

use crate::sink::EngineJobSink;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use wfs_core::{Clock, IdGen, JobId, JobType, SharedMetricsSink, SystemClock, Workflow, WorkflowId};
use wfs_executor::JobExecutor;
use wfs_scheduler::{AdmissionController, ProgressBus, Scheduler, SchedulerConfig, TenantRegistry};

pub(crate) type WorkflowStore = Arc<Mutex<HashMap<WorkflowId, Arc<Mutex<Workflow>>>>>;

pub struct WorkflowEngine<C: Clock = SystemClock> {
    pub(crate) scheduler: Arc<Scheduler<C>>,
    pub(crate) bus: Arc<ProgressBus>,
    pub(crate) admission: Arc<AdmissionController>,
    pub(crate) tenant_registry: Arc<TenantRegistry>,
    pub(crate) workflows: WorkflowStore,
    pub(crate) job_index: Mutex<HashMap<JobId, WorkflowId>>,
    pub(crate) executors: Arc<HashMap<JobType, Arc<dyn JobExecutor>>>,
    pub(crate) metrics: SharedMetricsSink,
    pub(crate) clock: C,
    pub(crate) id_gen: Arc<dyn IdGen>,
}

impl<C: Clock + 'static> WorkflowEngine<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scheduler_config: SchedulerConfig,
        tenant_registry: Arc<TenantRegistry>,
        admission: Arc<AdmissionController>,
        bus: Arc<ProgressBus>,
        executors: HashMap<JobType, Arc<dyn JobExecutor>>,
        metrics: SharedMetricsSink,
        clock: C,
        id_gen: Arc<dyn IdGen>,
    ) -> Arc<Self> {
        let workflows: WorkflowStore = Arc::new(Mutex::new(HashMap::new()));

        let sink = Arc::new(EngineJobSink::new(
            workflows.clone(),
            bus.clone(),
            metrics.clone(),
            tenant_registry.clone(),
            admission.clone(),
        ));

        let scheduler =
            Scheduler::new(scheduler_config, admission.clone(), tenant_registry.clone(), sink, metrics.clone(), clock.clone());

        Arc::new(Self {
            scheduler,
            bus,
            admission,
            tenant_registry,
            workflows,
            job_index: Mutex::new(HashMap::new()),
            executors: Arc::new(executors),
            metrics,
            clock,
            id_gen,
        })
    }

    /// Start the scheduler's background dispatch loop.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        self.scheduler.start()
    }

    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    #[must_use]
    pub fn scheduler(&self) -> &Arc<Scheduler<C>> {
        &self.scheduler
    }

    #[must_use]
    pub fn progress_bus(&self) -> &Arc<ProgressBus> {
        &self.bus
    }

    #[must_use]
    pub fn tenant_registry(&self) -> &Arc<TenantRegistry> {
        &self.tenant_registry
    }

    #[must_use]
    pub fn admission(&self) -> &Arc<AdmissionController> {
        &self.admission
    }
}
