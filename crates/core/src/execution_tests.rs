// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn workflow_execution_display() {
    let exec = WorkflowExecution::new("order-17", RunId::from_string("run-abc"));
    assert_eq!(exec.to_string(), "order-17/run-abc");
}

#[test]
fn string_newtypes_compare_with_str() {
    let id = ActivityId::new("5");
    assert_eq!(id, "5");
    assert_eq!(id.as_str(), "5");
    assert!(!id.is_empty());
    assert!(TimerId::default().is_empty());
}

#[test]
fn string_newtype_serde_is_transparent() {
    let tl = TaskList::new("orders");
    let json = serde_json::to_string(&tl).unwrap();
    assert_eq!(json, "\"orders\"");
    let parsed: TaskList = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, tl);
}

#[test]
fn execution_serde_roundtrip() {
    let exec = WorkflowExecution::new("wf", RunId::from_string("run-1"));
    let json = serde_json::to_string(&exec).unwrap();
    let parsed: WorkflowExecution = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, exec);
}
