// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::test_engine;
use crate::types::JobSubmission;
use std::time::Duration;
use wfs_core::{JobStatus, JobType, TenantId};

fn submission(jobs: Vec<JobSubmission>) -> WorkflowSubmission {
    WorkflowSubmission { name: "cohort-scan".to_string(), metadata: HashMap::new(), jobs }
}

fn job_submission(job_id: Option<&str>, branch: &str, depends_on: Vec<&str>, image_path: &str) -> JobSubmission {
    JobSubmission {
        job_id: job_id.map(str::to_string),
        job_type: JobType::CellSegmentation,
        image_path: image_path.to_string(),
        branch: branch.to_string(),
        depends_on: depends_on.into_iter().map(str::to_string).collect(),
        metadata: HashMap::new(),
    }
}

async fn settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(2)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn client_supplied_ids_get_workflow_prefixed_and_dependencies_rewritten() {
    let engine = test_engine(3);
    let tenant = TenantId::from("tenant-a");
    let sub = submission(vec![
        job_submission(Some("mask"), "main", vec![], "s3://slides/a.svs"),
        job_submission(Some("seg"), "main", vec!["mask"], "s3://slides/a.svs"),
    ]);

    let workflow_id = engine.create_workflow(tenant.clone(), sub).unwrap();
    let view = engine.get_workflow(&tenant, &workflow_id).unwrap();

    let mask = view.jobs.iter().find(|j| j.job_id.as_str().ends_with("_mask")).unwrap();
    let seg = view.jobs.iter().find(|j| j.job_id.as_str().ends_with("_seg")).unwrap();
    assert_eq!(seg.depends_on, vec![mask.job_id.clone()]);
    assert_eq!(mask.job_id.as_str(), format!("{workflow_id}_mask"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fully_qualified_dependency_is_left_as_is() {
    let engine = test_engine(3);
    let tenant = TenantId::from("tenant-a");
    let sub = submission(vec![
        job_submission(None, "main", vec![], "s3://slides/a.svs"),
        job_submission(Some("seg"), "main", vec![], "s3://slides/a.svs"),
    ]);
    let workflow_id = engine.create_workflow(tenant.clone(), sub).unwrap();
    let view = engine.get_workflow(&tenant, &workflow_id).unwrap();
    let auto = view.jobs.iter().find(|j| !j.job_id.as_str().ends_with("_seg")).unwrap();

    // Submit a second workflow whose job references the first job's
    // already-fully-qualified ID directly.
    let sub2 = submission(vec![job_submission(Some(auto.job_id.as_str()), "main", vec![auto.job_id.as_str()], "s3://slides/a.svs")]);
    let workflow_id2 = engine.create_workflow(tenant.clone(), sub2).unwrap();
    let view2 = engine.get_workflow(&tenant, &workflow_id2).unwrap();
    // `auto.job_id` isn't one of workflow_id2's own assigned ids, so it's
    // still rewritten with workflow_id2's prefix rather than kept as-is.
    assert_eq!(view2.jobs[0].depends_on, vec![JobId::from(format!("{workflow_id2}_{}", auto.job_id))]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dependent_jobs_run_to_success_in_order() {
    let engine = test_engine(3);
    let tenant = TenantId::from("tenant-a");
    let sub = submission(vec![
        job_submission(Some("mask"), "b1", vec![], "s3://slides/a.svs"),
        job_submission(Some("seg"), "b2", vec!["mask"], "s3://slides/a.svs"),
    ]);
    let workflow_id = engine.create_workflow(tenant.clone(), sub).unwrap();

    for _ in 0..40 {
        engine.scheduler().dispatch_once();
        settle().await;
        let view = engine.get_workflow(&tenant, &workflow_id).unwrap();
        if view.status.is_terminal() {
            break;
        }
    }

    let view = engine.get_workflow(&tenant, &workflow_id).unwrap();
    assert_eq!(view.status, JobStatus::Succeeded);
    assert_eq!(view.progress, 1.0);
    assert!(view.jobs.iter().all(|j| j.result_path.is_some()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn a_failed_job_fails_the_whole_workflow() {
    let engine = test_engine(3);
    let tenant = TenantId::from("tenant-a");
    let sub = submission(vec![
        job_submission(Some("mask"), "b1", vec![], "s3://slides/a.svs.fail"),
        job_submission(Some("seg"), "b2", vec![], "s3://slides/a.svs"),
    ]);
    let workflow_id = engine.create_workflow(tenant.clone(), sub).unwrap();

    for _ in 0..40 {
        engine.scheduler().dispatch_once();
        settle().await;
        let view = engine.get_workflow(&tenant, &workflow_id).unwrap();
        if view.status.is_terminal() {
            break;
        }
    }

    let view = engine.get_workflow(&tenant, &workflow_id).unwrap();
    assert_eq!(view.status, JobStatus::Failed);
}

#[tokio::test]
async fn empty_branch_is_rejected() {
    let engine = test_engine(3);
    let sub = submission(vec![job_submission(None, "", vec![], "s3://slides/a.svs")]);
    let err = engine.create_workflow(TenantId::from("tenant-a"), sub).unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
}
