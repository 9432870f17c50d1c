// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use wfs_core::{JobStatus, NullSink};
use wfs_engine::JobSubmission;
use wfs_executor::SimulatedExecutor;
use wfs_scheduler::SchedulerConfig;

fn test_service(max_active_users: usize) -> Service {
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

fn job(job_type: JobType, image_path: &str) -> EngineJobSubmission {
    EngineJobSubmission {
        job_id: None,
        job_type,
        image_path: image_path.to_string(),
        branch: "main".to_string(),
        depends_on: Vec::new(),
        metadata: HashMap::new(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn a_submitted_workflow_runs_to_completion() {
    let service = test_service(3);
    let _dispatch = service.start();
    let tenant = TenantId::from("tenant-a");

    let workflow_id = service
        .submit_workflow(tenant.clone(), "demo".to_string(), vec![job(JobType::CellSegmentation, "s3://slides/a.svs")])
        .unwrap();

    let mut view = service.get_workflow(&tenant, &workflow_id).unwrap();
    for _ in 0..50 {
        if view.status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        view = service.get_workflow(&tenant, &workflow_id).unwrap();
    }

    assert_eq!(view.status, JobStatus::Succeeded);
    service.shutdown();
}

#[tokio::test]
async fn unknown_workflow_is_not_found() {
    let service = test_service(3);
    let err = service.get_workflow(&TenantId::from("tenant-a"), &WorkflowId::from("ghost")).unwrap_err();
    assert_eq!(err, ServiceError::not_found("workflow", "ghost"));
}

#[tokio::test]
async fn another_tenants_workflow_is_forbidden() {
    let service = test_service(3);
    let owner = TenantId::from("tenant-a");
    let intruder = TenantId::from("tenant-b");
    let workflow_id =
        service.submit_workflow(owner, "demo".to_string(), vec![job(JobType::CellSegmentation, "s3://slides/a.svs")]).unwrap();

    let err = service.get_workflow(&intruder, &workflow_id).unwrap_err();
    assert_eq!(err, ServiceError::Forbidden);
}

#[tokio::test]
async fn subscribers_receive_progress_envelopes() {
    let service = test_service(3);
    let tenant = TenantId::from("tenant-a");
    let mut rx = service.subscribe(&tenant);

    service.bus.broadcast(&tenant, ProgressEnvelope::Ping);
    let received = rx.recv().await.unwrap();
    assert!(matches!(received, ProgressEnvelope::Ping));
}
