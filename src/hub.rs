//! The event hub façade.

use crate::config::HubConfig;
use crate::dispatch::{DispatchToken, Dispatcher};
use crate::error::Result;
use crate::lifecycle::{Lifecycle, LifecycleBinding};
use crate::logger::{HubLogger, LoggerSlot, TracingLogger};
use crate::registry::{LatestValueCache, Subscriber, SubscriberRegistry};
use crate::types::{Payload, SubscribeOptions, SubscriberId};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Mutable state shared by every handle. One lock guards all of it.
struct HubState {
    registry: SubscriberRegistry,
    cache: LatestValueCache,
    /// Token captured by newly scheduled emissions.
    token: DispatchToken,
}

pub(crate) struct HubInner {
    state: Mutex<HubState>,
    dispatcher: Dispatcher,
    logger: Arc<LoggerSlot>,
    next_id: AtomicU64,
}

impl HubInner {
    fn remove_subscriber(&self, event_name: &str, id: SubscriberId) -> bool {
        self.state.lock().registry.remove(event_name, id)
    }

    /// Body of one emission task, run on a pool worker.
    fn run_emission(&self, event_name: &str, payload: Option<Payload>, token: &DispatchToken) {
        if token.is_cancelled() {
            return;
        }

        let subscribers = match self.state.lock().registry.snapshot(event_name) {
            Some(subscribers) => subscribers,
            None => return,
        };

        self.logger.log(|| {
            format!(
                "Schedule event '{}' emission with '{}' to {} subscribers",
                event_name,
                describe(payload.as_ref()),
                subscribers.len()
            )
        });

        for subscriber in &subscribers {
            if token.is_cancelled() {
                self.logger
                    .log(|| format!("Emission of '{}' cancelled by reset", event_name));
                return;
            }
            self.dispatcher.deliver(subscriber, payload.as_ref(), token);
        }
    }
}

impl Drop for HubInner {
    fn drop(&mut self) {
        self.state.get_mut().token.cancel();
        self.dispatcher.shutdown();
    }
}

fn describe(payload: Option<&Payload>) -> &'static str {
    payload.map_or("no data", Payload::type_name)
}

/// In-process publish/subscribe hub.
///
/// Cheap to clone; clones share one registry, cache and set of dispatch
/// threads. Build one at startup and hand it to whatever needs it. When the
/// last handle is dropped the hub shuts down.
///
/// Subscribers are owned by the hub, so a callback holding an `EventHub`
/// keeps the hub alive forever. Callbacks that need the hub should capture
/// [`EventHub::downgrade`] instead and upgrade it on each call.
///
/// # Example
///
/// ```ignore
/// let hub = EventHub::new()?;
///
/// let subscription = hub.on("user.login", SubscribeOptions::new().cached(), |user: Option<&String>| {
///     println!("logged in: {:?}", user);
/// });
///
/// hub.emit("user.login", String::from("ada"));
/// subscription.dispose();
/// ```
#[derive(Clone)]
pub struct EventHub {
    inner: Arc<HubInner>,
}

impl EventHub {
    /// Create a hub with the default config and the tracing logger.
    pub fn new() -> Result<Self> {
        Self::with_config(HubConfig::default())
    }

    pub fn with_config(config: HubConfig) -> Result<Self> {
        let logger = Arc::new(LoggerSlot::new(Some(Arc::new(TracingLogger::new()))));
        let dispatcher = Dispatcher::spawn(&config, Arc::clone(&logger))?;

        Ok(Self {
            inner: Arc::new(HubInner {
                state: Mutex::new(HubState {
                    registry: SubscriberRegistry::new(),
                    cache: LatestValueCache::new(),
                    token: DispatchToken::new(),
                }),
                dispatcher,
                logger,
                next_id: AtomicU64::new(1),
            }),
        })
    }

    /// Non-owning handle to this hub.
    pub fn downgrade(&self) -> WeakEventHub {
        WeakEventHub {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Replace the logger. `None` disables diagnostics.
    pub fn set_logger(&self, logger: Option<Arc<dyn HubLogger>>) {
        self.inner.logger.set(logger);
    }

    pub fn logger(&self) -> Option<Arc<dyn HubLogger>> {
        self.inner.logger.get()
    }

    // --- Emitting ---

    /// Emit `event_name` carrying `data`.
    pub fn emit<T: Any + Send + Sync>(&self, event_name: &str, data: T) {
        self.emit_payload(event_name, Some(Payload::new(data)));
    }

    /// Emit `event_name` without data.
    pub fn emit_empty(&self, event_name: &str) {
        self.emit_payload(event_name, None);
    }

    /// Emit a pre-built payload (or none).
    ///
    /// The cache is updated before returning, even when nobody listens.
    /// Delivery happens later on the worker pool; failures are logged, never
    /// reported back here.
    pub fn emit_payload(&self, event_name: &str, data: Option<Payload>) {
        let inner = &self.inner;
        if inner.dispatcher.is_shut_down() {
            inner
                .logger
                .log(|| format!("Event hub is shut down, dropping '{}' emission", event_name));
            return;
        }

        let (token, has_subscribers) = {
            let mut state = inner.state.lock();
            state.cache.record(event_name, data.clone());
            (state.token.clone(), state.registry.contains(event_name))
        };

        if !has_subscribers {
            inner.logger.log(|| {
                format!("There is no available subscriber for {} event!", event_name)
            });
            return;
        }

        let hub = Arc::downgrade(inner);
        let event = event_name.to_string();
        let job = Box::new(move || {
            if let Some(hub) = hub.upgrade() {
                hub.run_emission(&event, data, &token);
            }
        });

        if let Err(err) = inner.dispatcher.schedule(job) {
            inner.logger.log_error(
                || format!("Could not schedule emission of '{}'", event_name),
                Some(&err),
            );
        }
    }

    // --- Subscribing ---

    /// Subscribe to `event_name`, disposing manually through the returned
    /// handle.
    ///
    /// With `options.receive_cached`, the latest cached value (if any) is
    /// delivered on the calling thread before this returns.
    pub fn on<T, F>(
        &self,
        event_name: &str,
        options: SubscribeOptions,
        receiver: F,
    ) -> Subscription
    where
        T: Any + Send + Sync,
        F: Fn(Option<&T>) + Send + Sync + 'static,
    {
        let subscription = self.register::<T, F>(event_name, options, receiver);
        self.inner
            .logger
            .log(|| format!("New event subscriber for {} is set", event_name));
        subscription
    }

    /// Subscribe to `event_name` until `lifecycle` reports its terminal
    /// transition.
    ///
    /// No handle is returned; only the lifecycle or [`EventHub::dispose_all`]
    /// ends this subscription.
    pub fn on_bound<T, F>(
        &self,
        event_name: &str,
        options: SubscribeOptions,
        lifecycle: &dyn Lifecycle,
        receiver: F,
    ) where
        T: Any + Send + Sync,
        F: Fn(Option<&T>) + Send + Sync + 'static,
    {
        let subscription = self.register::<T, F>(event_name, options, receiver);
        LifecycleBinding::attach(subscription, lifecycle);
        self.inner.logger.log(|| {
            format!(
                "New lifecycle-bound event subscriber for {} is set",
                event_name
            )
        });
    }

    fn register<T, F>(
        &self,
        event_name: &str,
        options: SubscribeOptions,
        receiver: F,
    ) -> Subscription
    where
        T: Any + Send + Sync,
        F: Fn(Option<&T>) + Send + Sync + 'static,
    {
        let inner = &self.inner;
        let id = SubscriberId(inner.next_id.fetch_add(1, Ordering::SeqCst));
        let subscriber = Arc::new(Subscriber::new::<T, F>(
            id,
            event_name,
            options.context,
            receiver,
        ));

        let cached = {
            let mut state = inner.state.lock();
            state.registry.insert(Arc::clone(&subscriber));
            if options.receive_cached {
                state.cache.get(event_name).cloned()
            } else {
                None
            }
        };

        if let Some(payload) = cached {
            match subscriber.deliver(payload.as_ref()) {
                Ok(()) => inner
                    .logger
                    .log(|| format!("Received latest data for '{}'", event_name)),
                Err(err) => inner.logger.delivery_failed(event_name, &err),
            }
        }

        Subscription {
            hub: Arc::downgrade(inner),
            event_name: event_name.to_string(),
            id,
            disposed: AtomicBool::new(false),
        }
    }

    // --- Teardown ---

    /// Clear every subscriber and cached value and cancel pending deliveries.
    ///
    /// The hub stays usable: emissions scheduled before the reset never start,
    /// emissions after it are delivered normally.
    pub fn dispose_all(&self) {
        {
            let mut state = self.inner.state.lock();
            state.registry.clear();
            state.cache.clear();
            state.token.cancel();
            state.token = DispatchToken::new();
        }
        self.inner.logger.log(|| "Disposed all subscribers".to_string());
    }

    /// Stop the dispatch threads for good.
    ///
    /// Pending deliveries are cancelled and later emissions are dropped.
    /// Called from a subscriber callback, the threads are closed but not
    /// joined.
    pub fn shutdown(&self) {
        self.inner.state.lock().token.cancel();
        self.inner.dispatcher.shutdown();
        self.inner.logger.log(|| "Event hub shut down".to_string());
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.dispatcher.is_shut_down()
    }

    // --- Introspection ---

    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.inner.state.lock().registry.count(event_name)
    }

    /// Every event name with a registry entry, sorted.
    pub fn event_names(&self) -> Vec<String> {
        self.inner.state.lock().registry.event_names()
    }

    /// Whether a value (possibly empty) is cached for `event_name`.
    pub fn has_cached(&self, event_name: &str) -> bool {
        self.inner.state.lock().cache.contains(event_name)
    }
}

/// Weak reference to an [`EventHub`], safe to capture in subscriber callbacks.
#[derive(Clone, Debug)]
pub struct WeakEventHub {
    inner: Weak<HubInner>,
}

impl WeakEventHub {
    /// The hub, unless every `EventHub` handle has been dropped.
    pub fn upgrade(&self) -> Option<EventHub> {
        self.inner.upgrade().map(|inner| EventHub { inner })
    }
}

/// Handle that removes one subscriber from the hub.
///
/// Dropping the handle does not unsubscribe; call [`Subscription::dispose`].
pub struct Subscription {
    hub: Weak<HubInner>,
    event_name: String,
    id: SubscriberId,
    disposed: AtomicBool,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Remove the subscriber. Calling it again does nothing.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(hub) = self.hub.upgrade() {
            hub.remove_subscriber(&self.event_name, self.id);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub(crate) fn log(&self, describe: impl FnOnce() -> String) {
        if let Some(hub) = self.hub.upgrade() {
            hub.logger.log(describe);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event_name", &self.event_name)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
