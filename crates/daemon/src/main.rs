// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binary entry point: wires a [`wfs_daemon::Service`] with the demo
//! [`SimulatedExecutor`] registrations and runs its dispatch loop until
//! interrupted. Carries no listener of its own (see Non-goals) — a real
//! deployment fronts this with whatever transport it needs and talks to
//! `Service` directly.

use std::collections::HashMap;
use std::sync::Arc;
use wfs_core::{JobType, NullSink};
use wfs_daemon::{config, Service};
use wfs_executor::{JobExecutor, SimulatedExecutor};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::new(config::log_filter())).init();

    let mut executors: HashMap<JobType, Arc<dyn JobExecutor>> = HashMap::new();
    executors.insert(JobType::CellSegmentation, Arc::new(SimulatedExecutor::default()));
    executors.insert(JobType::TissueMask, Arc::new(SimulatedExecutor::default()));

    let service = Service::new(config::scheduler_config(), config::max_active_users(), executors, Arc::new(NullSink));

    let dispatch = service.start();
    tracing::info!("workflow scheduler started");

    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to install shutdown signal handler");
    }

    tracing::info!("shutting down");
    service.shutdown();
    let _ = dispatch.await;
}
