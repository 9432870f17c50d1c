// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures for the engine's own test suite and for `wfs-daemon`'s
//! integration tests.

use crate::WorkflowEngine;
use std::collections::HashMap;
use std::sync::Arc;
use wfs_core::{FakeClock, JobType, NullSink, SequentialIdGen};
use wfs_executor::{JobExecutor, SimulatedExecutor};
use wfs_scheduler::{AdmissionController, ProgressBus, SchedulerConfig, TenantRegistry};

/// A `WorkflowEngine<FakeClock>` wired with a [`SimulatedExecutor::fast`]
/// for every known job type, a `NullSink` metrics backend, and a
/// deterministic ID generator, suitable for driving with
/// `engine.scheduler().dispatch_once()`.
pub fn test_engine(max_active_tenants: usize) -> Arc<WorkflowEngine<FakeClock>> {
    let mut executors: HashMap<JobType, Arc<dyn JobExecutor>> = HashMap::new();
    executors.insert(JobType::CellSegmentation, Arc::new(SimulatedExecutor::fast()));
    executors.insert(JobType::TissueMask, Arc::new(SimulatedExecutor::fast()));

    WorkflowEngine::new(
        SchedulerConfig { max_workers: 10, dispatch_interval_ms: 100 },
        Arc::new(TenantRegistry::new()),
        Arc::new(AdmissionController::new(max_active_tenants)),
        Arc::new(ProgressBus::new()),
        executors,
        Arc::new(NullSink),
        FakeClock::new(),
        Arc::new(SequentialIdGen::new("wf")),
    )
}
