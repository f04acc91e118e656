//! Registry of subscribers keyed by event name.

use super::Subscriber;
use crate::types::SubscriberId;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Event name -> subscribers, ordered by id.
///
/// A name's entry is created by its first subscriber and survives after its
/// last subscriber is removed; only [`SubscriberRegistry::clear`] drops it.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    events: HashMap<String, BTreeMap<SubscriberId, Arc<Subscriber>>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, subscriber: Arc<Subscriber>) {
        self.events
            .entry(subscriber.event_name().to_string())
            .or_default()
            .insert(subscriber.id(), subscriber);
    }

    /// Remove one subscriber. Returns false if it was not registered.
    pub fn remove(&mut self, event_name: &str, id: SubscriberId) -> bool {
        self.events
            .get_mut(event_name)
            .map(|set| set.remove(&id).is_some())
            .unwrap_or(false)
    }

    /// Whether `event_name` has ever been subscribed since the last clear.
    pub fn contains(&self, event_name: &str) -> bool {
        self.events.contains_key(event_name)
    }

    /// Copy of the current subscriber set, or `None` for an unknown name.
    pub fn snapshot(&self, event_name: &str) -> Option<Vec<Arc<Subscriber>>> {
        self.events
            .get(event_name)
            .map(|set| set.values().cloned().collect())
    }

    pub fn count(&self, event_name: &str) -> usize {
        self.events.get(event_name).map_or(0, |set| set.len())
    }

    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.events.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExecutionContext;

    fn make_subscriber(id: u64, event_name: &str) -> Arc<Subscriber> {
        Arc::new(Subscriber::new::<i32, _>(
            SubscriberId(id),
            event_name,
            ExecutionContext::Main,
            |_| {},
        ))
    }

    #[test]
    fn test_insert_and_snapshot() {
        let mut registry = SubscriberRegistry::new();
        registry.insert(make_subscriber(2, "a"));
        registry.insert(make_subscriber(1, "a"));
        registry.insert(make_subscriber(3, "b"));

        let ids: Vec<_> = registry
            .snapshot("a")
            .unwrap()
            .iter()
            .map(|s| s.id())
            .collect();
        assert_eq!(ids, vec![SubscriberId(1), SubscriberId(2)]);
        assert_eq!(registry.count("b"), 1);
        assert!(registry.snapshot("c").is_none());
        assert_eq!(registry.event_names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_identical_fields_are_distinct() {
        let mut registry = SubscriberRegistry::new();
        registry.insert(make_subscriber(1, "a"));
        registry.insert(make_subscriber(2, "a"));
        assert_eq!(registry.count("a"), 2);

        assert!(registry.remove("a", SubscriberId(1)));
        assert_eq!(registry.count("a"), 1);
        assert_eq!(registry.snapshot("a").unwrap()[0].id(), SubscriberId(2));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = SubscriberRegistry::new();
        registry.insert(make_subscriber(1, "a"));

        assert!(registry.remove("a", SubscriberId(1)));
        assert!(!registry.remove("a", SubscriberId(1)));
        assert!(!registry.remove("missing", SubscriberId(1)));

        // The entry outlives its last subscriber.
        assert!(registry.contains("a"));
        assert_eq!(registry.snapshot("a").unwrap().len(), 0);
    }

    #[test]
    fn test_clear() {
        let mut registry = SubscriberRegistry::new();
        registry.insert(make_subscriber(1, "a"));
        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.contains("a"));
    }
}
