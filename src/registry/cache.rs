//! Latest-value cache for late-subscriber replay.

use crate::types::Payload;
use std::collections::HashMap;

/// Event name -> last payload emitted for it.
///
/// `Some(None)` from [`LatestValueCache::get`] means the event was emitted
/// without data, which is different from never having been emitted.
#[derive(Debug, Default)]
pub struct LatestValueCache {
    values: HashMap<String, Option<Payload>>,
}

impl LatestValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the cached value for `event_name`.
    pub fn record(&mut self, event_name: &str, payload: Option<Payload>) {
        match self.values.get_mut(event_name) {
            Some(slot) => *slot = payload,
            None => {
                self.values.insert(event_name.to_string(), payload);
            }
        }
    }

    pub fn get(&self, event_name: &str) -> Option<&Option<Payload>> {
        self.values.get(event_name)
    }

    pub fn contains(&self, event_name: &str) -> bool {
        self.values.contains_key(event_name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
