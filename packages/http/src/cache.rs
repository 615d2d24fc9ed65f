use std::collections::{HashMap, VecDeque};

use serde_json::Value;

/// Bounded response cache with least-recently-used eviction.
///
/// Entries are keyed by request URL and stamped with their fetch time.
#[derive(Debug)]
pub(crate) struct ResponseCache {
    capacity: usize,
    entries: HashMap<String, (u64, Value)>,
    order: VecDeque<String>,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// A hit counts as a use. Stale entries are left for the caller to
    /// overwrite.
    pub fn get(&mut self, key: &str, now: u64, ttl: u64) -> Option<Value> {
        let (fetched, value) = self.entries.get(key)?;
        if now.saturating_sub(*fetched) > ttl {
            return None;
        }
        let value = value.clone();
        self.touch(key);
        Some(value)
    }

    pub fn insert(&mut self, key: String, now: u64, value: Value) {
        if self.entries.insert(key.clone(), (now, value)).is_some() {
            self.touch(&key);
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                log::debug!("Evicting cached response {}", evicted);
                self.entries.remove(&evicted);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}
