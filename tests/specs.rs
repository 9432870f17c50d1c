// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios exercising the full `Service` composition root:
//! serial-per-branch dispatch, cross-branch parallelism, the active-user
//! cap, cancellation, and dependency-gated dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use wfs_core::{JobStatus, JobType, NullSink, TenantId};
use wfs_daemon::Service;
use wfs_engine::JobSubmission;
use wfs_executor::{JobExecutor, SimulatedExecutor};
use wfs_scheduler::SchedulerConfig;

fn service(max_active_users: usize) -> Service {
    let mut executors: HashMap<JobType, Arc<dyn JobExecutor>> = HashMap::new();
    executors.insert(JobType::CellSegmentation, Arc::new(SimulatedExecutor::fast()));
    executors.insert(JobType::TissueMask, Arc::new(SimulatedExecutor::fast()));
    Service::new(
        SchedulerConfig { max_workers: 10, dispatch_interval_ms: 5 },
        max_active_users,
        executors,
        Arc::new(NullSink),
    )
}

fn job(branch: &str, image_path: &str, job_id: Option<&str>, depends_on: Vec<&str>) -> JobSubmission {
    JobSubmission {
        job_id: job_id.map(str::to_string),
        job_type: JobType::CellSegmentation,
        image_path: image_path.to_string(),
        branch: branch.to_string(),
        depends_on: depends_on.into_iter().map(str::to_string).collect(),
        metadata: HashMap::new(),
    }
}

async fn wait_for_terminal(service: &Service, tenant: &TenantId, workflow_id: &wfs_core::WorkflowId) -> wfs_core::JobStatus {
    for _ in 0..200 {
        let view = service.get_workflow(tenant, workflow_id).unwrap();
        if view.status.is_terminal() {
            return view.status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("workflow {workflow_id} did not reach a terminal state in time");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn serial_within_a_branch_parallel_across_branches() {
    let svc = service(3);
    let _dispatch = svc.start();
    let tenant = TenantId::from("tenant-a");

    let workflow_id = svc
        .submit_workflow(
            tenant.clone(),
            "cohort".to_string(),
            vec![
                job("b1", "s3://slides/1.svs", Some("b1-j1"), vec![]),
                job("b1", "s3://slides/2.svs", Some("b1-j2"), vec![]),
                job("b2", "s3://slides/3.svs", Some("b2-j1"), vec![]),
            ],
        )
        .unwrap();

    let status = wait_for_terminal(&svc, &tenant, &workflow_id).await;
    assert_eq!(status, JobStatus::Succeeded);
    svc.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dependency_gated_jobs_run_in_order() {
    let svc = service(3);
    let _dispatch = svc.start();
    let tenant = TenantId::from("tenant-a");

    let workflow_id = svc
        .submit_workflow(
            tenant.clone(),
            "cohort".to_string(),
            vec![
                job("b1", "s3://slides/mask.svs", Some("mask"), vec![]),
                job("b2", "s3://slides/seg.svs", Some("seg"), vec!["mask"]),
            ],
        )
        .unwrap();

    let status = wait_for_terminal(&svc, &tenant, &workflow_id).await;
    assert_eq!(status, JobStatus::Succeeded);

    let view = svc.get_workflow(&tenant, &workflow_id).unwrap();
    let mask = view.jobs.iter().find(|j| j.job_id.as_str().ends_with("_mask")).unwrap();
    let seg = view.jobs.iter().find(|j| j.job_id.as_str().ends_with("_seg")).unwrap();
    assert!(mask.timestamps.completed_at_ms.unwrap() <= seg.timestamps.started_at_ms.unwrap());
    svc.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn a_failed_dependency_still_leaves_the_dependent_terminal() {
    let svc = service(3);
    let _dispatch = svc.start();
    let tenant = TenantId::from("tenant-a");

    let workflow_id = svc
        .submit_workflow(
            tenant.clone(),
            "cohort".to_string(),
            vec![
                job("b1", "s3://slides/mask.svs.fail", Some("mask"), vec![]),
                job("b2", "s3://slides/seg.svs", Some("seg"), vec!["mask"]),
            ],
        )
        .unwrap();

    let status = wait_for_terminal(&svc, &tenant, &workflow_id).await;
    assert_eq!(status, JobStatus::Failed);
    svc.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn beyond_the_active_user_cap_tenants_queue_and_eventually_run() {
    let svc = service(1);
    let _dispatch = svc.start();
    let a = TenantId::from("tenant-a");
    let b = TenantId::from("tenant-b");

    let wf_a = svc.submit_workflow(a.clone(), "a".to_string(), vec![job("main", "s3://slides/a.svs", None, vec![])]).unwrap();
    let wf_b = svc.submit_workflow(b.clone(), "b".to_string(), vec![job("main", "s3://slides/b.svs", None, vec![])]).unwrap();

    assert_eq!(wait_for_terminal(&svc, &a, &wf_a).await, JobStatus::Succeeded);
    assert_eq!(wait_for_terminal(&svc, &b, &wf_b).await, JobStatus::Succeeded);
    svc.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancelling_a_pending_job_stops_it_from_starting() {
    let tenant = TenantId::from("tenant-a");

    // Capacity is 1 worker and both jobs share a branch, so the second
    // job is guaranteed to still be queued when we cancel it.
    let svc = Service::new(
        SchedulerConfig { max_workers: 1, dispatch_interval_ms: 500 },
        1,
        {
            let mut executors: HashMap<JobType, Arc<dyn JobExecutor>> = HashMap::new();
            executors.insert(JobType::CellSegmentation, Arc::new(SimulatedExecutor::new(50, Duration::from_millis(20))));
            executors
        },
        Arc::new(NullSink),
    );
    let _dispatch = svc.start();

    let workflow_id = svc
        .submit_workflow(
            tenant.clone(),
            "demo".to_string(),
            vec![
                job("b", "s3://slides/1.svs", Some("j1"), vec![]),
                job("b", "s3://slides/2.svs", Some("j2"), vec![]),
            ],
        )
        .unwrap();

    tokio::time::sleep(Duration::from_millis(600)).await;
    let view = svc.get_workflow(&tenant, &workflow_id).unwrap();
    let j2 = view.jobs.iter().find(|j| j.job_id.as_str().ends_with("_j2")).unwrap();
    assert_eq!(j2.status, JobStatus::Pending);

    svc.cancel_job(&tenant, &j2.job_id).unwrap();

    for _ in 0..80 {
        let view = svc.get_workflow(&tenant, &workflow_id).unwrap();
        let j2 = view.jobs.iter().find(|j| j.job_id.as_str().ends_with("_j2")).unwrap();
        if j2.status == JobStatus::Cancelled {
            svc.shutdown();
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("cancelled job never reached CANCELLED");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn a_running_job_cannot_be_cancelled() {
    let svc = Service::new(
        SchedulerConfig { max_workers: 1, dispatch_interval_ms: 10 },
        1,
        {
            let mut executors: HashMap<JobType, Arc<dyn JobExecutor>> = HashMap::new();
            executors.insert(JobType::CellSegmentation, Arc::new(SimulatedExecutor::new(20, Duration::from_millis(20))));
            executors
        },
        Arc::new(NullSink),
    );
    let _dispatch = svc.start();
    let tenant = TenantId::from("tenant-a");

    let workflow_id =
        svc.submit_workflow(tenant.clone(), "demo".to_string(), vec![job("b", "s3://slides/1.svs", Some("j1"), vec![])]).unwrap();

    let job_id = {
        let mut view = svc.get_workflow(&tenant, &workflow_id).unwrap();
        loop {
            if let Some(j) = view.jobs.iter().find(|j| j.status == JobStatus::Running) {
                break j.job_id.clone();
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            view = svc.get_workflow(&tenant, &workflow_id).unwrap();
        }
    };

    let err = svc.cancel_job(&tenant, &job_id).unwrap_err();
    assert_eq!(err, wfs_core::ServiceError::NotCancellable);
    svc.shutdown();
}
