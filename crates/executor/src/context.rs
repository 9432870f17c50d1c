// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inputs handed to a [`crate::JobExecutor`] and the progress callback it
//! reports through.

use std::collections::HashMap;
use std::sync::Arc;
use wfs_core::{JobId, JobStatus};

/// Everything an executor needs to run one job, plus the resolved
/// terminal status of every dependency (so the executor *may*
/// short-circuit on an upstream `Failed` result — the scheduler itself
/// does not gate on outcome, only on terminality, per spec).
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub job_id: JobId,
    pub image_path: String,
    pub metadata: HashMap<String, serde_json::Value>,
    pub dependency_outcomes: HashMap<JobId, JobStatus>,
}

impl ExecutionContext {
    #[must_use]
    pub fn any_dependency_failed(&self) -> bool {
        self.dependency_outcomes.values().any(|s| *s == JobStatus::Failed)
    }
}

/// Cheap, `Clone`-able callback back into the engine for progress
/// reporting. The engine uses each call to update the job's progress
/// fields, recompute workflow aggregate progress, and emit a
/// `job_progress` event on the progress bus.
#[derive(Clone)]
pub struct ProgressReporter {
    report: Arc<dyn Fn(f64, u64, u64) + Send + Sync>,
}

impl ProgressReporter {
    pub fn new(report: impl Fn(f64, u64, u64) + Send + Sync + 'static) -> Self {
        Self { report: Arc::new(report) }
    }

    /// Report `progress` in `[0.0, 1.0]` and tile counters. Callers should
    /// keep `progress` monotonically non-decreasing; the engine does not
    /// re-validate this (see spec invariant "monotonic progress").
    pub fn report(&self, progress: f64, tiles_processed: u64, tiles_total: u64) {
        (self.report)(progress, tiles_processed, tiles_total);
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ProgressReporter {
    /// A reporter that discards every call, for tests that don't assert
    /// on progress.
    pub fn noop() -> Self {
        Self::new(|_, _, _| {})
    }
}
