// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler (C4): per-(tenant,branch) FIFO queues, a global worker cap,
//! dependency-gated dispatch, and cooperative cancellation.
//!
//! The scheduler never holds a live reference into engine-owned `Job`
//! data. It dispatches jobs by value (a lightweight [`ScheduledJob`]
//! copied out at `submit` time) and writes status/timestamp transitions
//! back through the [`JobSink`] callback the engine hands it, keeping
//! the single-writer discipline described for the data model: the
//! scheduler owns status/`started_at`/`completed_at`/`error_message`,
//! the engine owns progress.

use crate::admission::AdmissionController;
use crate::registry::TenantRegistry;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use wfs_core::{Branch, Clock, JobId, JobStatus, JobType, SharedMetricsSink, TenantId, WorkflowId};

/// Global worker cap and dispatch loop tuning, driven by environment
/// configuration in `wfs-daemon` rather than hardcoded.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub max_workers: usize,
    pub dispatch_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { max_workers: 10, dispatch_interval_ms: 100 }
    }
}

/// The minimal record the scheduler needs to dispatch a job, copied out
/// of the engine's `Job` at submit time.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub job_id: JobId,
    pub workflow_id: WorkflowId,
    pub tenant_id: TenantId,
    pub branch: Branch,
    pub job_type: JobType,
}

pub type ExecutorFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;

/// The per-job execution callback the engine registers at `submit` time.
/// Implemented by the engine's job-type dispatch wrapper; the scheduler
/// itself never inspects the job's image/metadata payload.
pub trait JobExecutorFn: Send + Sync {
    fn call(&self, job: ScheduledJob) -> ExecutorFuture;
}

impl<F, Fut> JobExecutorFn for F
where
    F: Fn(ScheduledJob) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), String>> + Send + 'static,
{
    fn call(&self, job: ScheduledJob) -> ExecutorFuture {
        Box::pin(self(job))
    }
}

/// Callback through which the scheduler writes status/timestamp
/// transitions back into the engine's owned `Job` record.
pub trait JobSink: Send + Sync {
    fn mark_running(&self, workflow_id: &WorkflowId, job_id: &JobId, started_at_ms: u64);

    fn mark_terminal(
        &self,
        workflow_id: &WorkflowId,
        job_id: &JobId,
        status: JobStatus,
        error_message: Option<String>,
        completed_at_ms: u64,
    );
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    NotCancellable,
}

struct RunningEntry {
    job: ScheduledJob,
    started_at_ms: u64,
}

#[derive(Default)]
struct SchedulerState {
    queues: HashMap<(TenantId, Branch), VecDeque<ScheduledJob>>,
    pending_owner: HashMap<JobId, (TenantId, Branch)>,
    running: HashMap<JobId, RunningEntry>,
    /// SUCCEEDED or FAILED jobs only. A cancelled job is never inserted
    /// here, so it can never satisfy a dependent's dependency check.
    completed: HashSet<JobId>,
    /// Permanent once set — ids are never removed, so a dependent can
    /// always tell a cancelled dependency apart from one that finished.
    cancelled: HashSet<JobId>,
    dependencies: HashMap<JobId, HashSet<JobId>>,
    executors: HashMap<JobId, Arc<dyn JobExecutorFn>>,
}

pub struct Scheduler<C: Clock = wfs_core::SystemClock> {
    state: Mutex<SchedulerState>,
    semaphore: Arc<Semaphore>,
    admission: Arc<AdmissionController>,
    tenants: Arc<TenantRegistry>,
    sink: Arc<dyn JobSink>,
    metrics: SharedMetricsSink,
    clock: C,
    config: SchedulerConfig,
    shutdown: CancellationToken,
}

impl<C: Clock + 'static> Scheduler<C> {
    pub fn new(
        config: SchedulerConfig,
        admission: Arc<AdmissionController>,
        tenants: Arc<TenantRegistry>,
        sink: Arc<dyn JobSink>,
        metrics: SharedMetricsSink,
        clock: C,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SchedulerState::default()),
            semaphore: Arc::new(Semaphore::new(config.max_workers)),
            admission,
            tenants,
            sink,
            metrics,
            clock,
            config,
            shutdown: CancellationToken::new(),
        })
    }

    /// Register `job` for dispatch. Always succeeds: there is no
    /// capacity rejection at submit time, only at dispatch.
    pub fn submit(
        &self,
        job: ScheduledJob,
        depends_on: Vec<JobId>,
        executor: Arc<dyn JobExecutorFn>,
    ) {
        let key = (job.tenant_id.clone(), job.branch.clone());
        {
            let mut state = self.state.lock();
            state.dependencies.insert(job.job_id.clone(), depends_on.into_iter().collect());
            state.executors.insert(job.job_id.clone(), executor);
            state.pending_owner.insert(job.job_id.clone(), key.clone());
            state.queues.entry(key).or_default().push_back(job.clone());
        }
        self.tenants.add_job(&job.tenant_id, job.job_id.clone());
        self.admission.acquire(&job.tenant_id);
        self.metrics.set_active_users(self.admission.active_count() as i64);
    }

    /// Cancel `job_id` iff it is still PENDING in `tenant`'s own queue.
    /// The actual removal and terminal transition happen on the next
    /// dispatch pass, not synchronously.
    pub fn cancel(&self, job_id: &JobId, tenant: &TenantId) -> CancelOutcome {
        let mut state = self.state.lock();
        match state.pending_owner.get(job_id) {
            Some((owner, _)) if owner == tenant => {
                state.cancelled.insert(job_id.clone());
                CancelOutcome::Cancelled
            }
            _ => CancelOutcome::NotCancellable,
        }
    }

    #[must_use]
    pub fn queue_depth(&self, tenant: Option<&TenantId>, branch: Option<&Branch>) -> usize {
        let state = self.state.lock();
        match (tenant, branch) {
            (Some(t), Some(b)) => state.queues.get(&(t.clone(), b.clone())).map_or(0, VecDeque::len),
            (None, Some(b)) => state.queues.iter().filter(|((_, br), _)| br == b).map(|(_, q)| q.len()).sum(),
            _ => state.queues.values().map(VecDeque::len).sum(),
        }
    }

    #[must_use]
    pub fn running_count(&self) -> usize {
        self.state.lock().running.len()
    }

    /// The tenant registry backing admission/idle tracking, exposed so
    /// `wfs-engine` can register/deregister workflow-level liveness
    /// (job-level liveness is tracked internally by the scheduler) and so
    /// the daemon's periodic metrics tick can read it.
    #[must_use]
    pub fn tenant_registry(&self) -> &Arc<TenantRegistry> {
        &self.tenants
    }

    #[must_use]
    pub fn admission(&self) -> &Arc<AdmissionController> {
        &self.admission
    }

    /// Spawn the background dispatch loop. Cheap to call repeatedly;
    /// intended to be called once from the composition root.
    pub fn start(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = this.shutdown.cancelled() => {
                        info!("scheduler dispatch loop shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(std::time::Duration::from_millis(this.config.dispatch_interval_ms)) => {
                        this.dispatch_pass();
                    }
                }
            }
        })
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Run a single dispatch pass synchronously, without the sleep loop.
    /// Used by tests (with a [`wfs_core::FakeClock`]) to get deterministic
    /// dispatch ticks instead of racing a real timer.
    #[cfg(any(test, feature = "test-support"))]
    pub fn dispatch_once(self: &Arc<Self>) {
        self.dispatch_pass();
    }

    /// One iteration of the scheduler loop: considers every channel once.
    fn dispatch_pass(self: &Arc<Self>) {
        let mut state = self.state.lock();

        let busy: HashSet<(TenantId, Branch)> =
            state.running.values().map(|r| (r.job.tenant_id.clone(), r.job.branch.clone())).collect();

        let mut candidates: Vec<(TenantId, Branch)> = Vec::new();
        for (key, queue) in state.queues.iter() {
            if !queue.is_empty() && !busy.contains(key) {
                candidates.push(key.clone());
            }
        }

        for key in candidates {
            if state.running.len() >= self.config.max_workers {
                break;
            }

            let Some(job) = state.queues.get(&key).and_then(|q| q.front()).cloned() else {
                continue;
            };

            if state.cancelled.contains(&job.job_id) {
                state.queues.get_mut(&key).expect("candidate key present").pop_front();
                state.pending_owner.remove(&job.job_id);
                state.executors.remove(&job.job_id);
                state.dependencies.remove(&job.job_id);
                self.tenants.remove_job(&job.tenant_id, &job.job_id);
                let now = self.clock.epoch_ms();
                self.sink.mark_terminal(&job.workflow_id, &job.job_id, JobStatus::Cancelled, None, now);
                self.metrics.increment_jobs_total(&job.job_type.to_string(), "CANCELLED", job.tenant_id.as_str());
                continue;
            }

            if !self.admission.is_active(&job.tenant_id) {
                continue;
            }

            let deps_satisfied = state.dependencies.get(&job.job_id).map_or(true, |deps| {
                deps.iter().all(|d| state.completed.contains(d) && !state.cancelled.contains(d) && !state.running.contains_key(d))
            });
            if !deps_satisfied {
                continue;
            }

            let Ok(permit) = Arc::clone(&self.semaphore).try_acquire_owned() else {
                continue;
            };

            state.queues.get_mut(&key).expect("candidate key present").pop_front();
            state.pending_owner.remove(&job.job_id);
            let Some(executor) = state.executors.get(&job.job_id).cloned() else {
                warn!(job_id = %job.job_id, "no executor registered, dropping permit");
                continue;
            };

            let started_at_ms = self.clock.epoch_ms();
            state.running.insert(job.job_id.clone(), RunningEntry { job: job.clone(), started_at_ms });
            self.sink.mark_running(&job.workflow_id, &job.job_id, started_at_ms);
            self.metrics.set_queue_depth(job.tenant_id.as_str(), job.branch.as_str(), state.queues.get(&key).map_or(0, VecDeque::len) as i64);
            self.metrics.set_worker_active_jobs(Some(job.tenant_id.as_str()), state.running.len() as i64);
            self.metrics.set_worker_active_jobs(None, state.running.len() as i64);

            let this = Arc::clone(self);
            tokio::spawn(async move { this.run_execution(job, executor, started_at_ms, permit).await });
        }
    }

    /// The execution wrapper of spec §4.4.5: drives one job from RUNNING
    /// to a terminal status, releasing the worker permit on every path.
    async fn run_execution(
        self: Arc<Self>,
        job: ScheduledJob,
        executor: Arc<dyn JobExecutorFn>,
        started_at_ms: u64,
        permit: tokio::sync::OwnedSemaphorePermit,
    ) {
        {
            let mut state = self.state.lock();
            if state.cancelled.contains(&job.job_id) {
                state.running.remove(&job.job_id);
                state.executors.remove(&job.job_id);
                state.dependencies.remove(&job.job_id);
                drop(state);
                self.tenants.remove_job(&job.tenant_id, &job.job_id);
                let now = self.clock.epoch_ms();
                self.sink.mark_terminal(&job.workflow_id, &job.job_id, JobStatus::Cancelled, None, now);
                drop(permit);
                self.release_tenant_if_idle(&job.tenant_id);
                return;
            }
        }

        let outcome = executor.call(job.clone()).await;
        let completed_at_ms = self.clock.epoch_ms();
        let (status, error_message) = match outcome {
            Ok(()) => (JobStatus::Succeeded, None),
            Err(e) => {
                error!(job_id = %job.job_id, error = %e, "job execution failed");
                (JobStatus::Failed, Some(e))
            }
        };

        self.sink.mark_terminal(&job.workflow_id, &job.job_id, status, error_message, completed_at_ms);

        let latency_seconds = completed_at_ms.saturating_sub(started_at_ms) as f64 / 1000.0;
        self.metrics.observe_job_latency(&job.job_type.to_string(), job.branch.as_str(), job.tenant_id.as_str(), &status.to_string(), latency_seconds);
        self.metrics.increment_jobs_total(&job.job_type.to_string(), &status.to_string(), job.tenant_id.as_str());

        drop(permit);

        {
            let mut state = self.state.lock();
            state.running.remove(&job.job_id);
            state.completed.insert(job.job_id.clone());
            state.executors.remove(&job.job_id);
            state.dependencies.remove(&job.job_id);
            self.metrics.set_worker_active_jobs(Some(job.tenant_id.as_str()), state.running.len() as i64);
            self.metrics.set_worker_active_jobs(None, state.running.len() as i64);
        }
        self.tenants.remove_job(&job.tenant_id, &job.job_id);
        self.release_tenant_if_idle(&job.tenant_id);
    }

    fn release_tenant_if_idle(&self, tenant: &TenantId) {
        if self.tenants.is_idle(tenant) {
            if let Some(next) = self.admission.release(tenant) {
                info!(tenant = %next, "tenant activated from admission queue");
            }
            self.metrics.set_active_users(self.admission.active_count() as i64);
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
