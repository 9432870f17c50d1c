// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ids::{Branch, JobId};
use crate::job::JobType;
use std::collections::HashMap;

fn job(id: &str, status: JobStatus, progress: f64) -> Job {
    let mut j = Job::new(
        JobId::from(id),
        WorkflowId::from("wf-1"),
        TenantId::from("tenant-a"),
        JobType::CellSegmentation,
        "img".to_string(),
        Branch::from("main"),
        vec![],
        HashMap::new(),
        0,
    );
    j.status = status;
    j.progress = progress;
    j
}

fn workflow(jobs: Vec<Job>) -> Workflow {
    Workflow::new(WorkflowId::from("wf-1"), "wf".to_string(), TenantId::from("tenant-a"), jobs, HashMap::new(), 0)
}

#[test]
fn empty_workflow_has_zero_progress() {
    let mut wf = workflow(vec![]);
    wf.recompute_progress();
    assert_eq!(wf.progress, 0.0);
    assert_eq!(wf.terminal_status(), None);
}

#[test]
fn progress_is_mean_of_job_progress() {
    let mut wf = workflow(vec![
        job("wf-1_a", JobStatus::Running, 0.4),
        job("wf-1_b", JobStatus::Running, 0.8),
    ]);
    wf.recompute_progress();
    assert_eq!(wf.progress, 0.6);
}

#[test]
fn terminal_status_none_while_any_job_non_terminal() {
    let wf = workflow(vec![job("wf-1_a", JobStatus::Succeeded, 1.0), job("wf-1_b", JobStatus::Running, 0.5)]);
    assert_eq!(wf.terminal_status(), None);
}

#[test]
fn failed_dominates_succeeded() {
    let wf = workflow(vec![
        job("wf-1_a", JobStatus::Succeeded, 1.0),
        job("wf-1_b", JobStatus::Failed, 0.3),
    ]);
    assert_eq!(wf.terminal_status(), Some(JobStatus::Failed));
}

#[test]
fn cancelled_counts_as_non_failure() {
    let wf = workflow(vec![
        job("wf-1_a", JobStatus::Succeeded, 1.0),
        job("wf-1_b", JobStatus::Cancelled, 0.0),
    ]);
    assert_eq!(wf.terminal_status(), Some(JobStatus::Succeeded));
}

#[test]
fn jobs_completed_counts_terminal_jobs() {
    let wf = workflow(vec![
        job("wf-1_a", JobStatus::Succeeded, 1.0),
        job("wf-1_b", JobStatus::Running, 0.5),
        job("wf-1_c", JobStatus::Cancelled, 0.0),
    ]);
    assert_eq!(wf.jobs_completed(), 2);
    assert_eq!(wf.jobs_total(), 3);
}
