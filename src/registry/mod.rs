//! Subscriber bookkeeping.
//!
//! Two plain maps live here, both guarded by the hub's single state lock:
//! - the subscriber registry (event name -> subscribers)
//! - the latest-value cache (event name -> last emitted payload)
//!
//! Neither type locks internally; the hub holds its mutex only for the
//! snapshot/insert/remove itself and never while a callback runs.

mod cache;
mod subscriber;
mod subscribers;

pub use cache::LatestValueCache;
pub use subscriber::Subscriber;
pub use subscribers::SubscriberRegistry;
