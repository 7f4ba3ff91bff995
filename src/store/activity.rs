// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Per-store bookkeeping for in-flight operations
//!
//! - [`Activity`] counts running operations (the `loading` flag) and hands out
//!   request epochs so that a response which has been superseded is dropped
//!   instead of overwriting fresher state.
//! - [`KeyedLocks`] serializes mutations that target the same resource.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// In-flight counter plus monotonic request epoch
#[derive(Debug, Default)]
pub struct Activity {
    in_flight: AtomicUsize,
    epoch: AtomicU64,
}

impl Activity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an operation as running until the guard is dropped
    pub fn start(&self) -> ActivityGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        ActivityGuard {
            in_flight: &self.in_flight,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Take a ticket for a new request; every older ticket becomes stale
    pub fn next_ticket(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether no request has started since `ticket` was issued
    pub fn is_current(&self, ticket: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == ticket
    }

    /// Make every outstanding ticket stale
    pub fn invalidate(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

/// Decrements the in-flight counter on drop, including when the owning future
/// is cancelled
#[derive(Debug)]
pub struct ActivityGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// One async mutex per resource key
///
/// Entries are pruned once nobody holds or waits on them.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of keys currently tracked
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}
