// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `create_workflow` (spec §4.5.1): expands a submission into jobs with
//! globally-unique IDs and hands each one to the scheduler behind an
//! executor-dispatch closure.

use crate::engine::{WorkflowEngine, WorkflowStore};
use crate::error::EngineError;
use crate::types::WorkflowSubmission;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use wfs_core::{Branch, Clock, Job, JobId, JobStatus, SharedMetricsSink, TenantId, Workflow, WorkflowId};
use wfs_executor::{ExecutionContext, ExecutorError, JobExecutor, JobOutcome, ProgressReporter};
use wfs_scheduler::{ProgressEnvelope, ScheduledJob};

/// Build the final job ID: a fully-qualified client ID is prefixed with
/// the workflow ID; an omitted one gets a fresh globally-unique ID
/// (never workflow-prefixed, since nothing else could collide with it).
fn assign_job_id(workflow_id: &WorkflowId, client_id: Option<&str>, id_gen: &dyn wfs_core::IdGen) -> JobId {
    match client_id {
        Some(id) => JobId::from(format!("{workflow_id}_{id}")),
        None => JobId::from(id_gen.next()),
    }
}

/// Rewrite a raw `depends_on` entry into a final job ID. If it already
/// matches one of this workflow's just-assigned IDs verbatim (the client
/// passed a fully-qualified dependency), it's left alone; otherwise it's
/// treated as a bare client ID local to this workflow.
fn rewrite_dependency(workflow_id: &WorkflowId, raw: &str, assigned: &HashSet<JobId>) -> JobId {
    let candidate = JobId::from(raw);
    if assigned.contains(&candidate) {
        candidate
    } else {
        JobId::from(format!("{workflow_id}_{raw}"))
    }
}

fn update_workflow_progress_metric(metrics: &SharedMetricsSink, wf: &Workflow) {
    metrics.set_workflow_progress(wf.workflow_id.as_str(), wf.tenant_id.as_str(), wf.progress);
}

/// Progress-report callback wired into one job's executor invocation.
/// Updates the job's progress fields, recomputes the workflow aggregate,
/// and broadcasts both envelopes (spec §4.5.3).
fn build_progress_reporter<C: Clock + 'static>(
    workflows: WorkflowStore,
    bus: Arc<wfs_scheduler::ProgressBus>,
    metrics: SharedMetricsSink,
    admission: Arc<wfs_scheduler::AdmissionController>,
    clock: C,
    workflow_id: WorkflowId,
    job_id: JobId,
) -> ProgressReporter {
    ProgressReporter::new(move |progress, tiles_processed, tiles_total| {
        let Some(wf_arc) = workflows.lock().get(&workflow_id).cloned() else { return };
        let mut wf = wf_arc.lock();
        let now = clock.epoch_ms();
        if let Some(job) = wf.jobs.iter_mut().find(|j| j.job_id == job_id) {
            job.progress = progress;
            job.tiles_processed = tiles_processed;
            job.tiles_total = tiles_total;
            if job.timestamps.first_progress_at_ms.is_none() {
                job.timestamps.first_progress_at_ms = Some(now);
            }
            job.timestamps.last_progress_at_ms = Some(now);
        }
        if wf.status == JobStatus::Pending && admission.is_active(&wf.tenant_id) {
            wf.status = JobStatus::Running;
            if wf.timestamps.started_at_ms.is_none() {
                wf.timestamps.started_at_ms = Some(now);
            }
        }
        wf.recompute_progress();
        let tenant_id = wf.tenant_id.clone();
        let job_envelope = ProgressEnvelope::JobProgress {
            job_id: job_id.clone(),
            workflow_id: workflow_id.clone(),
            progress,
            tiles_processed,
            tiles_total,
        };
        let wf_envelope = ProgressEnvelope::WorkflowProgress {
            workflow_id: workflow_id.clone(),
            progress: wf.progress,
            status: wf.status,
            jobs_completed: wf.jobs_completed(),
            jobs_total: wf.jobs_total(),
        };
        update_workflow_progress_metric(&metrics, &wf);
        drop(wf);
        bus.broadcast(&tenant_id, job_envelope);
        bus.broadcast(&tenant_id, wf_envelope);
    })
}

/// Build the `JobExecutorFn` the scheduler invokes to actually run one
/// job: looks up the registered `JobExecutor` by job type, assembles its
/// `ExecutionContext` from the live workflow record, and writes the
/// result path back on success.
fn build_executor_closure<C: Clock + 'static>(
    workflows: WorkflowStore,
    bus: Arc<wfs_scheduler::ProgressBus>,
    metrics: SharedMetricsSink,
    admission: Arc<wfs_scheduler::AdmissionController>,
    clock: C,
    executors: Arc<HashMap<wfs_core::JobType, Arc<dyn JobExecutor>>>,
) -> impl Fn(ScheduledJob) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), String>> + Send>> + Send + Sync + 'static
{
    move |scheduled: ScheduledJob| {
        let workflows = workflows.clone();
        let bus = bus.clone();
        let metrics = metrics.clone();
        let admission = admission.clone();
        let clock = clock.clone();
        let executors = executors.clone();
        Box::pin(async move {
            let Some(executor) = executors.get(&scheduled.job_type).cloned() else {
                return Err(format!("no executor registered for job type {}", scheduled.job_type));
            };

            let (image_path, metadata, dependency_outcomes) = {
                let Some(wf_arc) = workflows.lock().get(&scheduled.workflow_id).cloned() else {
                    return Err("workflow no longer present".to_string());
                };
                let wf = wf_arc.lock();
                let Some(job) = wf.jobs.iter().find(|j| j.job_id == scheduled.job_id) else {
                    return Err("job no longer present in workflow".to_string());
                };
                let outcomes: HashMap<JobId, JobStatus> = job
                    .depends_on
                    .iter()
                    .filter_map(|dep_id| wf.jobs.iter().find(|j| &j.job_id == dep_id).map(|d| (dep_id.clone(), d.status)))
                    .collect();
                (job.image_path.clone(), job.metadata.clone(), outcomes)
            };

            let ctx = ExecutionContext { job_id: scheduled.job_id.clone(), image_path, metadata, dependency_outcomes };
            let progress = build_progress_reporter(
                workflows.clone(),
                bus,
                metrics,
                admission,
                clock,
                scheduled.workflow_id.clone(),
                scheduled.job_id.clone(),
            );

            let outcome = executor.execute(ctx, progress).await;
            match outcome {
                Ok(JobOutcome { result_path }) => {
                    if let Some(wf_arc) = workflows.lock().get(&scheduled.workflow_id).cloned() {
                        let mut wf = wf_arc.lock();
                        if let Some(job) = wf.jobs.iter_mut().find(|j| j.job_id == scheduled.job_id) {
                            job.result_path = result_path;
                        }
                    }
                    Ok(())
                }
                Err(ExecutorError::Failed(reason)) => Err(reason),
                Err(ExecutorError::UnregisteredJobType(ty)) => Err(format!("unregistered job type: {ty}")),
            }
        })
    }
}

impl<C: Clock + 'static> WorkflowEngine<C> {
    /// Expand `submission` into a workflow of jobs, assign IDs, rewrite
    /// intra-workflow dependencies, and submit every job to the
    /// scheduler. The workflow starts `PENDING`; it becomes `RUNNING`
    /// once its first job actually starts (spec §4.5.3).
    pub fn create_workflow(&self, tenant_id: TenantId, submission: WorkflowSubmission) -> Result<WorkflowId, EngineError> {
        for job in &submission.jobs {
            if job.branch.trim().is_empty() {
                return Err(EngineError::InvalidArgument("branch must not be empty".to_string()));
            }
        }

        let now = self.clock.epoch_ms();
        let workflow_id = WorkflowId::from(self.id_gen.next());

        let assigned_ids: Vec<JobId> =
            submission.jobs.iter().map(|j| assign_job_id(&workflow_id, j.job_id.as_deref(), self.id_gen.as_ref())).collect();
        let assigned_set: HashSet<JobId> = assigned_ids.iter().cloned().collect();

        let jobs: Vec<Job> = submission
            .jobs
            .into_iter()
            .zip(assigned_ids)
            .map(|(submitted, job_id)| {
                let depends_on =
                    submitted.depends_on.iter().map(|raw| rewrite_dependency(&workflow_id, raw, &assigned_set)).collect();
                Job::new(
                    job_id,
                    workflow_id.clone(),
                    tenant_id.clone(),
                    submitted.job_type,
                    submitted.image_path,
                    Branch::from(submitted.branch),
                    depends_on,
                    submitted.metadata,
                    now,
                )
            })
            .collect();

        let workflow = Workflow::new(workflow_id.clone(), submission.name, tenant_id.clone(), jobs, submission.metadata, now);

        self.tenant_registry.add_workflow(&tenant_id, workflow_id.clone());

        let scheduled_jobs: Vec<(ScheduledJob, Vec<JobId>)> = workflow
            .jobs
            .iter()
            .map(|job| {
                (
                    ScheduledJob {
                        job_id: job.job_id.clone(),
                        workflow_id: workflow_id.clone(),
                        tenant_id: tenant_id.clone(),
                        branch: job.branch.clone(),
                        job_type: job.job_type,
                    },
                    job.depends_on.clone(),
                )
            })
            .collect();

        {
            let mut job_index = self.job_index.lock();
            for job in &workflow.jobs {
                job_index.insert(job.job_id.clone(), workflow_id.clone());
            }
        }

        self.workflows.lock().insert(workflow_id.clone(), Arc::new(Mutex::new(workflow)));

        for (scheduled, depends_on) in scheduled_jobs {
            let executor_fn = build_executor_closure(
                self.workflows.clone(),
                self.bus.clone(),
                self.metrics.clone(),
                self.admission.clone(),
                self.clock.clone(),
                self.executors.clone(),
            );
            self.scheduler.submit(scheduled, depends_on, Arc::new(executor_fn));
        }

        Ok(workflow_id)
    }
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
