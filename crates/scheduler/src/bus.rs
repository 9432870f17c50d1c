// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress Bus (C3): per-tenant fan-out of typed progress envelopes.
//!
//! A subscriber is a capability, not a concrete transport: its only
//! contract is a fallible, non-blocking `try_send`. The production
//! implementation (in `wfs-daemon`) wraps a bounded `tokio::sync::mpsc`
//! sender feeding a websocket-forwarding task; tests use an in-memory
//! recorder.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use wfs_core::{JobId, JobStatus, TenantId, WorkflowId};

#[derive(Debug, thiserror::Error)]
#[error("subscriber channel closed or full")]
pub struct SendError;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEnvelope {
    JobProgress {
        job_id: JobId,
        workflow_id: WorkflowId,
        progress: f64,
        tiles_processed: u64,
        tiles_total: u64,
    },
    WorkflowProgress {
        workflow_id: WorkflowId,
        progress: f64,
        status: JobStatus,
        jobs_completed: usize,
        jobs_total: usize,
    },
    Ping,
    Pong,
}

/// A push endpoint subscribed to one tenant's progress feed.
pub trait Subscriber: Send + Sync {
    fn try_send(&self, envelope: &ProgressEnvelope) -> Result<(), SendError>;

    /// Stable identity for this subscriber instance, used to remove it on
    /// `unsubscribe` or after a failed delivery (e.g. the address backing
    /// its channel sender).
    fn id(&self) -> usize;
}

#[derive(Default)]
pub struct ProgressBus {
    subscribers: Mutex<HashMap<TenantId, Vec<Arc<dyn Subscriber>>>>,
}

impl ProgressBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, tenant: &TenantId, subscriber: Arc<dyn Subscriber>) {
        self.subscribers.lock().entry(tenant.clone()).or_default().push(subscriber);
    }

    pub fn unsubscribe(&self, tenant: &TenantId, subscriber_id: usize) {
        if let Some(subs) = self.subscribers.lock().get_mut(tenant) {
            subs.retain(|s| s.id() != subscriber_id);
        }
    }

    /// Deliver `envelope` to every current subscriber of `tenant`.
    /// Best-effort: a failed delivery drops that subscriber, it is never
    /// retried or buffered.
    pub fn broadcast(&self, tenant: &TenantId, envelope: ProgressEnvelope) {
        let mut subscribers = self.subscribers.lock();
        let Some(subs) = subscribers.get_mut(tenant) else { return };
        subs.retain(|s| s.try_send(&envelope).is_ok());
    }

    #[must_use]
    pub fn subscriber_count(&self, tenant: &TenantId) -> usize {
        self.subscribers.lock().get(tenant).map_or(0, Vec::len)
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
