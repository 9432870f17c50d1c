// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A channel-backed [`Subscriber`] — the production shape named in
//! `wfs-scheduler`'s doc comment: a bounded `mpsc` sender feeding
//! whatever forwarding task owns the other end (a websocket handler, in
//! a full deployment; out of scope here, see Non-goals).

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use wfs_scheduler::{ProgressEnvelope, SendError, Subscriber};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

pub struct ChannelSubscriber {
    id: usize,
    tx: mpsc::Sender<ProgressEnvelope>,
}

impl ChannelSubscriber {
    /// Bounded at 64 envelopes; a subscriber that can't keep up is
    /// dropped by the bus rather than allowed to backpressure it.
    pub fn channel() -> (Self, mpsc::Receiver<ProgressEnvelope>) {
        let (tx, rx) = mpsc::channel(64);
        (Self { id: NEXT_ID.fetch_add(1, Ordering::Relaxed), tx }, rx)
    }
}

impl Subscriber for ChannelSubscriber {
    fn try_send(&self, envelope: &ProgressEnvelope) -> Result<(), SendError> {
        self.tx.try_send(envelope.clone()).map_err(|_| SendError)
    }

    fn id(&self) -> usize {
        self.id
    }
}

#[cfg(test)]
#[path = "subscriber_tests.rs"]
mod tests;
