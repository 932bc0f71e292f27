// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::dispatcher::Dispatcher;

#[test]
fn values_flow_fifo() {
    let chan = WfChannel::bounded(4);
    chan.try_send(1).unwrap();
    chan.try_send(2).unwrap();
    assert_eq!(chan.try_recv(), Some(1));
    assert_eq!(chan.try_recv(), Some(2));
    assert_eq!(chan.try_recv(), None);
}

#[test]
fn receiver_parks_until_send() {
    let dispatcher = Dispatcher::new();
    let chan = WfChannel::bounded(1);
    let out = Arc::new(Mutex::new(None));

    let rx = chan.clone();
    let result = out.clone();
    dispatcher.spawn(async move {
        *result.lock() = rx.recv().await;
    });
    dispatcher.run_until_all_blocked().unwrap();
    assert!(out.lock().is_none());

    chan.try_send("hello").unwrap();
    dispatcher.run_until_all_blocked().unwrap();
    assert_eq!(*out.lock(), Some("hello"));
}

#[test]
fn sender_parks_on_full_buffer() {
    let dispatcher = Dispatcher::new();
    let chan = WfChannel::bounded(1);
    chan.try_send(0).unwrap();

    let tx = chan.clone();
    let sent = Arc::new(Mutex::new(false));
    let flag = sent.clone();
    dispatcher.spawn(async move {
        tx.send(1).await.ok();
        *flag.lock() = true;
    });
    dispatcher.run_until_all_blocked().unwrap();
    assert!(!*sent.lock());

    // Draining one value unblocks the parked sender.
    assert_eq!(chan.try_recv(), Some(0));
    dispatcher.run_until_all_blocked().unwrap();
    assert!(*sent.lock());
    assert_eq!(chan.try_recv(), Some(1));
}

#[test]
fn close_resolves_parked_receivers_with_none() {
    let dispatcher = Dispatcher::new();
    let chan = WfChannel::<u32>::bounded(1);
    let out = Arc::new(Mutex::new(Some(99)));

    let rx = chan.clone();
    let result = out.clone();
    dispatcher.spawn(async move {
        *result.lock() = rx.recv().await;
    });
    dispatcher.run_until_all_blocked().unwrap();

    chan.close();
    dispatcher.run_until_all_blocked().unwrap();
    assert_eq!(*out.lock(), None);
}

#[test]
fn close_fails_parked_senders() {
    let dispatcher = Dispatcher::new();
    let chan = WfChannel::bounded(1);
    chan.try_send(0).unwrap();

    let tx = chan.clone();
    let result = Arc::new(Mutex::new(None));
    let out = result.clone();
    dispatcher.spawn(async move {
        *out.lock() = Some(tx.send(1).await);
    });
    dispatcher.run_until_all_blocked().unwrap();

    chan.close();
    dispatcher.run_until_all_blocked().unwrap();
    assert_eq!(*result.lock(), Some(Err(ChannelClosed)));
}

#[test]
fn drained_values_survive_close() {
    let chan = WfChannel::bounded(2);
    chan.try_send(1).unwrap();
    chan.close();
    assert!(chan.try_send(2).is_err());
    assert_eq!(chan.try_recv(), Some(1));
    assert!(chan.is_closed());
}
