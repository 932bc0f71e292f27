// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::dispatcher::Dispatcher;
use crate::future::future;
use parking_lot::Mutex;
use std::sync::Arc;

#[test]
fn earliest_registered_branch_wins_ties() {
    let dispatcher = Dispatcher::new();
    let (sa, fa) = future::<&'static str>();
    let (sb, fb) = future::<&'static str>();

    // Both are ready before the select is ever polled.
    sa.settle("a");
    sb.settle("b");

    let out = Arc::new(Mutex::new(None));
    let result = out.clone();
    dispatcher.spawn(async move {
        let select = Select::new().add(fa).add(fb);
        *result.lock() = Some(select.await);
    });
    dispatcher.run_until_all_blocked().unwrap();
    assert_eq!(*out.lock(), Some((0, "a")));
}

#[test]
fn pending_select_resumes_on_any_branch() {
    let dispatcher = Dispatcher::new();
    let (_sa, fa) = future::<u32>();
    let (sb, fb) = future::<u32>();

    let out = Arc::new(Mutex::new(None));
    let result = out.clone();
    dispatcher.spawn(async move {
        let select = Select::new().add(fa).add(fb);
        *result.lock() = Some(select.await);
    });
    dispatcher.run_until_all_blocked().unwrap();
    assert!(out.lock().is_none());

    sb.settle(5);
    dispatcher.run_until_all_blocked().unwrap();
    assert_eq!(*out.lock(), Some((1, 5)));
}
