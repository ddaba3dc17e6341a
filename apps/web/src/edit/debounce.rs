//! Debounced commits: values are staged per key and only released after `delay` of
//! inactivity on that key. Restaging a key resets its timer; the last staged value wins.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::Clock;

struct Pending<V> {
    value: V,
    deadline: Instant,
}

pub struct Debouncer<K, V> {
    delay: Duration,
    clock: Arc<dyn Clock>,
    pending: BTreeMap<K, Pending<V>>,
}

impl<K: Ord + Clone, V: Clone> Debouncer<K, V> {
    pub fn new(delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            delay,
            clock,
            pending: BTreeMap::new(),
        }
    }

    /// Stages `value` for `key`, replacing any earlier value and re-arming the timer.
    pub fn stage(&mut self, key: K, value: V) {
        let deadline = self.clock.now() + self.delay;
        self.pending.insert(key, Pending { value, deadline });
    }

    /// Removes and returns every entry whose timer has expired, in key order.
    pub fn take_due(&mut self) -> Vec<(K, V)> {
        let now = self.clock.now();
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(k, _)| k.clone())
            .collect();

        due.into_iter()
            .filter_map(|k| self.pending.remove(&k).map(|p| (k, p.value)))
            .collect()
    }

    /// Removes and returns everything staged, regardless of timers.
    pub fn drain(&mut self) -> Vec<(K, V)> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(k, p)| (k, p.value))
            .collect()
    }

    /// Rewrites every staged key through `f`; keys mapped to `None` are discarded.
    /// Timers are preserved.
    pub fn remap_keys<F>(&mut self, mut f: F)
    where
        F: FnMut(&K) -> Option<K>,
    {
        self.pending = std::mem::take(&mut self.pending)
            .into_iter()
            .filter_map(|(k, p)| f(&k).map(|nk| (nk, p)))
            .collect();
    }

    pub fn discard_all(&mut self) {
        self.pending.clear();
    }

    /// Staged values without consuming them.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        self.pending
            .iter()
            .map(|(k, p)| (k.clone(), p.value.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
