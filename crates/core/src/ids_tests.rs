// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn job_id_display() {
    let id = JobId::from("wf-1_seg".to_string());
    assert_eq!(id.to_string(), "wf-1_seg");
}

#[test]
fn job_id_equality_and_hash() {
    let a = JobId::from("job-1");
    let b = JobId::from("job-1");
    let c = JobId::from("job-2");
    assert_eq!(a, b);
    assert_ne!(a, c);

    let mut set = std::collections::HashSet::new();
    set.insert(a.clone());
    assert!(set.contains("job-1"));
}

#[test]
fn job_id_serde_roundtrip() {
    let id = JobId::from("job-xyz");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"job-xyz\"");
    let parsed: JobId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn uuid_id_gen_produces_distinct_values() {
    let gen = UuidIdGen;
    let a = gen.next();
    let b = gen.next();
    assert_ne!(a, b);
}

#[test]
fn sequential_id_gen_is_deterministic_in_tests() {
    let gen = SequentialIdGen::new("job");
    assert_eq!(gen.next(), "job-0");
    assert_eq!(gen.next(), "job-1");
}
