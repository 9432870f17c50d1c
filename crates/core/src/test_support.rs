// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders and fixtures shared by the scheduler/engine test suites.

use crate::ids::{Branch, JobId, TenantId, WorkflowId};
use crate::job::{Job, JobStatus, JobType};
use crate::workflow::Workflow;
use std::collections::HashMap;

crate::builder! {
    pub struct JobBuilder => Job {
        into { job_id: JobId = "job-1" }
        into { workflow_id: WorkflowId = "wf-1" }
        into { tenant_id: TenantId = "tenant-a" }
        set { job_type: JobType = JobType::CellSegmentation }
        into { image_path: String = "s3://slides/a.svs" }
        into { branch: Branch = "main" }
        set { depends_on: Vec<JobId> = Vec::new() }
        set { status: JobStatus = JobStatus::Pending }
        set { progress: f64 = 0.0 }
        set { tiles_processed: u64 = 0 }
        set { tiles_total: u64 = 0 }
        set { metadata: HashMap<String, serde_json::Value> = HashMap::new() }
        set { result_path: Option<String> = None }
        set { error_message: Option<String> = None }
        computed { timestamps: crate::job::JobTimestamps = crate::job::JobTimestamps { created_at_ms: 0, ..Default::default() } }
    }
}

crate::builder! {
    pub struct WorkflowBuilder => Workflow {
        into { workflow_id: WorkflowId = "wf-1" }
        into { name: String = "demo" }
        into { tenant_id: TenantId = "tenant-a" }
        set { jobs: Vec<Job> = Vec::new() }
        set { status: JobStatus = JobStatus::Pending }
        set { progress: f64 = 0.0 }
        set { metadata: HashMap<String, serde_json::Value> = HashMap::new() }
        computed { timestamps: crate::workflow::WorkflowTimestamps = Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_builder_applies_overrides() {
        let job = Job::builder().job_id("wf-1_seg").status(JobStatus::Running).progress(0.4).build();
        assert_eq!(job.job_id, JobId::from("wf-1_seg"));
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.progress, 0.4);
    }

    #[test]
    fn workflow_builder_applies_overrides() {
        let wf = Workflow::builder().name("cohort-scan").jobs(vec![Job::builder().build()]).build();
        assert_eq!(wf.name, "cohort-scan");
        assert_eq!(wf.jobs.len(), 1);
    }
}
