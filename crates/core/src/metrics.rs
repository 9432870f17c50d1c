// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metrics emission (ambient observability, not a query backend).
//!
//! The scheduler's own in-memory state is the source of truth for
//! anything a caller queries (`queue_depth`, `running_count`, ...); these
//! series are a side effect emitted alongside state changes, never read
//! back.

use std::sync::Arc;

/// Sink for the named metric series of the system. Implementations must
/// be cheap to call from inside short lock-held sections, so no I/O.
pub trait MetricsSink: Send + Sync {
    fn set_queue_depth(&self, tenant_id: &str, branch: &str, depth: i64);
    fn set_worker_active_jobs(&self, tenant_id: Option<&str>, count: i64);
    fn observe_job_latency(&self, job_type: &str, branch: &str, tenant_id: &str, status: &str, seconds: f64);
    fn increment_jobs_total(&self, job_type: &str, status: &str, tenant_id: &str);
    fn set_active_users(&self, count: i64);
    fn set_workflow_progress(&self, workflow_id: &str, tenant_id: &str, progress: f64);
}

/// No-op sink, the default when no backend is configured and in tests
/// that don't care about metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn set_queue_depth(&self, _tenant_id: &str, _branch: &str, _depth: i64) {}
    fn set_worker_active_jobs(&self, _tenant_id: Option<&str>, _count: i64) {}
    fn observe_job_latency(&self, _job_type: &str, _branch: &str, _tenant_id: &str, _status: &str, _seconds: f64) {}
    fn increment_jobs_total(&self, _job_type: &str, _status: &str, _tenant_id: &str) {}
    fn set_active_users(&self, _count: i64) {}
    fn set_workflow_progress(&self, _workflow_id: &str, _tenant_id: &str, _progress: f64) {}
}

/// Prometheus-backed sink. Registers its own [`prometheus::Registry`];
/// callers own exposing that registry behind an HTTP `/metrics` handler
/// (out of scope here — see spec §6).
pub struct PrometheusSink {
    queue_depth: prometheus::GaugeVec,
    worker_active_jobs: prometheus::GaugeVec,
    job_latency_seconds: prometheus::HistogramVec,
    jobs_total: prometheus::CounterVec,
    active_users: prometheus::Gauge,
    workflow_progress: prometheus::GaugeVec,
    registry: prometheus::Registry,
}

impl PrometheusSink {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = prometheus::Registry::new();

        let queue_depth = prometheus::GaugeVec::new(
            prometheus::Opts::new("queue_depth", "Number of jobs waiting in queue"),
            &["tenant_id", "branch"],
        )?;
        let worker_active_jobs = prometheus::GaugeVec::new(
            prometheus::Opts::new("worker_active_jobs", "Number of currently running jobs"),
            &["tenant_id"],
        )?;
        let job_latency_seconds = prometheus::HistogramVec::new(
            prometheus::HistogramOpts::new("job_latency_seconds", "Job execution latency in seconds")
                .buckets(vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
            &["job_type", "branch", "tenant_id", "status"],
        )?;
        let jobs_total = prometheus::CounterVec::new(
            prometheus::Opts::new("jobs_total", "Total number of jobs processed"),
            &["job_type", "status", "tenant_id"],
        )?;
        let active_users =
            prometheus::Gauge::new("active_users", "Number of currently active users")?;
        let workflow_progress = prometheus::GaugeVec::new(
            prometheus::Opts::new("workflow_progress", "Workflow completion progress (0.0 to 1.0)"),
            &["workflow_id", "tenant_id"],
        )?;

        registry.register(Box::new(queue_depth.clone()))?;
        registry.register(Box::new(worker_active_jobs.clone()))?;
        registry.register(Box::new(job_latency_seconds.clone()))?;
        registry.register(Box::new(jobs_total.clone()))?;
        registry.register(Box::new(active_users.clone()))?;
        registry.register(Box::new(workflow_progress.clone()))?;

        Ok(Self {
            queue_depth,
            worker_active_jobs,
            job_latency_seconds,
            jobs_total,
            active_users,
            workflow_progress,
            registry,
        })
    }

    /// The backing registry, for an (out-of-scope) `/metrics` HTTP handler.
    pub fn registry(&self) -> &prometheus::Registry {
        &self.registry
    }
}

impl MetricsSink for PrometheusSink {
    fn set_queue_depth(&self, tenant_id: &str, branch: &str, depth: i64) {
        self.queue_depth.with_label_values(&[tenant_id, branch]).set(depth as f64);
    }

    fn set_worker_active_jobs(&self, tenant_id: Option<&str>, count: i64) {
        let label = tenant_id.unwrap_or("global");
        self.worker_active_jobs.with_label_values(&[label]).set(count as f64);
    }

    fn observe_job_latency(&self, job_type: &str, branch: &str, tenant_id: &str, status: &str, seconds: f64) {
        self.job_latency_seconds.with_label_values(&[job_type, branch, tenant_id, status]).observe(seconds);
    }

    fn increment_jobs_total(&self, job_type: &str, status: &str, tenant_id: &str) {
        self.jobs_total.with_label_values(&[job_type, status, tenant_id]).inc();
    }

    fn set_active_users(&self, count: i64) {
        self.active_users.set(count as f64);
    }

    fn set_workflow_progress(&self, workflow_id: &str, tenant_id: &str, progress: f64) {
        self.workflow_progress.with_label_values(&[workflow_id, tenant_id]).set(progress);
    }
}

pub type SharedMetricsSink = Arc<dyn MetricsSink>;

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
