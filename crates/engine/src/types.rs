// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response shapes for the engine's external interface (spec §6).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wfs_core::JobType;

#[derive(Debug, Clone, Deserialize)]
pub struct JobSubmission {
    /// Client-supplied ID, scoped to this workflow. `None` gets a fresh
    /// globally-unique ID instead of a workflow-prefixed one.
    pub job_id: Option<String>,
    pub job_type: JobType,
    pub image_path: String,
    pub branch: String,
    /// References into this workflow's client-supplied ids (see
    /// `create_workflow`'s prefix-rewriting).
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSubmission {
    pub name: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub jobs: Vec<JobSubmission>,
}

/// Read-only snapshot returned to callers, distinct from the internal
/// `wfs_core::Workflow` so the wire shape can evolve independently of
/// the owned record.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowView {
    pub workflow_id: String,
    pub name: String,
    pub tenant_id: String,
    pub status: wfs_core::JobStatus,
    pub progress: f64,
    pub jobs: Vec<wfs_core::Job>,
}

impl From<&wfs_core::Workflow> for WorkflowView {
    fn from(wf: &wfs_core::Workflow) -> Self {
        Self {
            workflow_id: wf.workflow_id.to_string(),
            name: wf.name.clone(),
            tenant_id: wf.tenant_id.to_string(),
            status: wf.status,
            progress: wf.progress,
            jobs: wf.jobs.clone(),
        }
    }
}
