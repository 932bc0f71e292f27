// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::dispatcher::Dispatcher;

#[test]
fn cancel_cascades_to_children() {
    let root = CancelScope::root();
    let child = root.child();
    let grandchild = child.child();

    root.cancel();
    assert!(root.is_canceled());
    assert!(child.is_canceled());
    assert!(grandchild.is_canceled());
}

#[test]
fn child_cancel_does_not_escape() {
    let root = CancelScope::root();
    let child = root.child();
    child.cancel();
    assert!(child.is_canceled());
    assert!(!root.is_canceled());
}

#[test]
fn child_of_canceled_scope_starts_canceled() {
    let root = CancelScope::root();
    root.cancel();
    assert!(root.child().is_canceled());
}

#[test]
fn canceled_future_wakes_parked_coroutine() {
    let dispatcher = Dispatcher::new();
    let scope = CancelScope::root();
    let observed = std::sync::Arc::new(parking_lot::Mutex::new(false));

    let wait = scope.clone();
    let flag = observed.clone();
    dispatcher.spawn(async move {
        wait.canceled().await;
        *flag.lock() = true;
    });
    dispatcher.run_until_all_blocked().unwrap();
    assert!(!*observed.lock());

    scope.cancel();
    dispatcher.run_until_all_blocked().unwrap();
    assert!(*observed.lock());
}

#[test]
fn cancel_is_idempotent() {
    let scope = CancelScope::root();
    scope.cancel();
    scope.cancel();
    assert!(scope.is_canceled());
}
