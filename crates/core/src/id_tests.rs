// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::execution::{RunId, TaskToken};

#[test]
fn idbuf_roundtrip() {
    let buf = IdBuf::new("run-abc123");
    assert_eq!(buf.as_str(), "run-abc123");
    assert!(!buf.is_empty());
    assert!(IdBuf::empty().is_empty());
}

#[test]
fn idbuf_fits_uuid_run_ids() {
    let uuid = "0191e2a4-7d7e-7b7a-b7e1-3f9f8c2d1a0b";
    let buf = IdBuf::new(uuid);
    assert_eq!(buf.as_str(), uuid);
}

#[test]
fn generated_ids_carry_prefix() {
    let run = RunId::new();
    assert!(run.as_str().starts_with("run-"));
    assert_eq!(run.as_str().len(), 23);

    let token = TaskToken::new();
    assert!(token.as_str().starts_with("ttk-"));
}

#[test]
fn from_string_accepts_foreign_formats() {
    let run = RunId::from_string("0191e2a4-7d7e-7b7a-b7e1-3f9f8c2d1a0b");
    assert_eq!(run.suffix(), run.as_str());
    assert_eq!(run.short(8), "0191e2a4");
}

#[test]
fn id_serde_is_transparent() {
    let run = RunId::from_string("run-xyz");
    let json = serde_json::to_string(&run).unwrap();
    assert_eq!(json, "\"run-xyz\"");
    let parsed: RunId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, run);
}

#[test]
fn short_truncates() {
    assert_eq!(short("abcdef", 3), "abc");
    assert_eq!(short("ab", 3), "ab");
}

#[test]
fn seq_id_gen_is_monotonic() {
    let gen = SeqIdGen::new();
    assert_eq!(gen.next_id(), "1");
    assert_eq!(gen.next_id(), "2");

    // Clones share the counter.
    let clone = gen.clone();
    assert_eq!(clone.next_id(), "3");
    assert_eq!(gen.peek(), 4);
}

#[test]
fn uuid_id_gen_is_unique() {
    let gen = UuidIdGen;
    assert_ne!(gen.next_id(), gen.next_id());
}
