// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tenant Registry (C1): tracks, per tenant, the set of live workflow and
//! job identifiers, and reports idleness when both are empty.
//!
//! Total and idempotent: removing an entry that was never added is a
//! silent no-op rather than an error.

use parking_lot::Mutex;
use std::collections::HashMap;
use wfs_core::{JobId, TenantId, TenantRecord, WorkflowId};

#[derive(Debug, Default)]
pub struct TenantRegistry {
    tenants: Mutex<HashMap<TenantId, TenantRecord>>,
}

impl TenantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_workflow(&self, tenant: &TenantId, workflow_id: WorkflowId) {
        self.tenants.lock().entry(tenant.clone()).or_default().active_workflows.insert(workflow_id);
    }

    pub fn remove_workflow(&self, tenant: &TenantId, workflow_id: &WorkflowId) {
        if let Some(record) = self.tenants.lock().get_mut(tenant) {
            record.active_workflows.remove(workflow_id);
        }
    }

    pub fn add_job(&self, tenant: &TenantId, job_id: JobId) {
        self.tenants.lock().entry(tenant.clone()).or_default().active_jobs.insert(job_id);
    }

    pub fn remove_job(&self, tenant: &TenantId, job_id: &JobId) {
        if let Some(record) = self.tenants.lock().get_mut(tenant) {
            record.active_jobs.remove(job_id);
        }
    }

    #[must_use]
    pub fn is_idle(&self, tenant: &TenantId) -> bool {
        self.tenants.lock().get(tenant).map(TenantRecord::is_idle).unwrap_or(true)
    }

    #[must_use]
    pub fn workflow_count(&self, tenant: &TenantId) -> usize {
        self.tenants.lock().get(tenant).map(|r| r.active_workflows.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn job_count(&self, tenant: &TenantId) -> usize {
        self.tenants.lock().get(tenant).map(|r| r.active_jobs.len()).unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
