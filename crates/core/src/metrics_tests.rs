// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn null_sink_accepts_all_calls_without_panicking() {
    let sink = NullSink;
    sink.set_queue_depth("t1", "main", 3);
    sink.set_worker_active_jobs(Some("t1"), 1);
    sink.observe_job_latency("cell_segmentation", "main", "t1", "SUCCEEDED", 1.5);
    sink.increment_jobs_total("cell_segmentation", "SUCCEEDED", "t1");
    sink.set_active_users(2);
    sink.set_workflow_progress("wf-1", "t1", 0.5);
}

#[test]
fn prometheus_sink_records_observations() {
    let sink = PrometheusSink::new().unwrap();
    sink.set_queue_depth("t1", "main", 4);
    sink.increment_jobs_total("tissue_mask", "SUCCEEDED", "t1");

    let families = sink.registry().gather();
    let names: Vec<_> = families.iter().map(|f| f.name()).collect();
    assert!(names.contains(&"queue_depth"));
    assert!(names.contains(&"jobs_total"));
}
