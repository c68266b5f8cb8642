// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A small TTL cache driven by [`outpost_core::Clock`] so expiry is
//! deterministically testable with `FakeClock`, instead of racing real time.

use outpost_core::Clock;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

struct Entry<V> {
    value: V,
    expires_at_ms: u64,
}

pub struct TtlCache<K, V, C: Clock> {
    clock: C,
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V, C: Clock> TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(clock: C, ttl: Duration) -> Self {
        Self { clock, ttl, entries: Mutex::new(HashMap::new()) }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.epoch_ms();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at_ms > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let expires_at_ms = self.clock.epoch_ms() + self.ttl.as_millis() as u64;
        self.entries.lock().insert(key, Entry { value, expires_at_ms });
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.lock().remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
