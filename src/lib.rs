//! # Event Hub
//!
//! An in-process publish/subscribe hub. Producers emit named events with an
//! optional payload; consumers register typed callbacks by event name.
//!
//! ## Core Concepts
//!
//! - **Subscribers**: typed callbacks keyed by event name, run on the serial
//!   `Main` context or on a pool worker
//! - **Latest-value cache**: the last payload per event name, replayed to late
//!   subscribers on request
//! - **Narrowing**: each payload is checked against the subscriber's declared
//!   type; a mismatch is logged and skips only that subscriber
//! - **Lifecycle binding**: subscriptions that end when an external owner
//!   reports its stop transition
//!
//! ## Example
//!
//! ```ignore
//! use event_hub::{EventHub, ExecutionContext, LifecycleEvent, LifecycleRegistry, SubscribeOptions};
//!
//! let hub = EventHub::new()?;
//!
//! // Manual disposal
//! let subscription = hub.on("counter", SubscribeOptions::new(), |n: Option<&u32>| {
//!     println!("counter is now {:?}", n);
//! });
//! hub.emit("counter", 1u32);
//! subscription.dispose();
//!
//! // Bound to a lifecycle owner, replaying the cached value
//! let screen = LifecycleRegistry::new();
//! hub.on_bound(
//!     "counter",
//!     SubscribeOptions::new().cached().on(ExecutionContext::Background),
//!     &screen,
//!     |n: Option<&u32>| println!("screen sees {:?}", n),
//! );
//! screen.handle_event(LifecycleEvent::Stop);
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod hub;
pub mod lifecycle;
pub mod logger;
pub mod registry;
pub mod types;

// Re-exports
pub use config::HubConfig;
pub use error::{HubError, Result};
pub use hub::{EventHub, Subscription, WeakEventHub};
pub use lifecycle::{Lifecycle, LifecycleEvent, LifecycleObserver, LifecycleRegistry};
pub use logger::{HubLogger, MemoryLogger, TracingLogger};
pub use registry::{LatestValueCache, Subscriber, SubscriberRegistry};
pub use types::*;
