//! Lifecycle-bound subscriptions.
//!
//! The hub does not know any UI framework. A host adapts its own lifecycle
//! owner to [`Lifecycle`]; the hub attaches an observer that disposes the
//! subscription the first time the owner reports [`LifecycleEvent::Stop`].
//! [`LifecycleRegistry`] is a ready-made owner for hosts without one.

use crate::hub::Subscription;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Transitions a lifecycle owner reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Create,
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
}

impl LifecycleEvent {
    /// The transition that ends a bound subscription.
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleEvent::Stop)
    }
}

/// Receives transitions from a [`Lifecycle`].
pub trait LifecycleObserver: Send + Sync {
    fn on_state_changed(&self, source: &dyn Lifecycle, event: LifecycleEvent);
}

/// An observable lifecycle owner.
pub trait Lifecycle: Send + Sync {
    fn add_observer(&self, observer: Arc<dyn LifecycleObserver>);

    /// Detach `observer`. Detaching an unknown observer does nothing.
    fn remove_observer(&self, observer: &Arc<dyn LifecycleObserver>);
}

fn same_observer(a: &Arc<dyn LifecycleObserver>, b: &Arc<dyn LifecycleObserver>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Simple lifecycle owner: keeps observers and fans transitions out to them.
///
/// Observers are notified outside the lock, so they may detach themselves
/// (or attach others) from inside `on_state_changed`.
#[derive(Default)]
pub struct LifecycleRegistry {
    observers: Mutex<Vec<Arc<dyn LifecycleObserver>>>,
}

impl LifecycleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a transition to every attached observer.
    pub fn handle_event(&self, event: LifecycleEvent) {
        let observers = self.observers.lock().clone();
        for observer in observers {
            observer.on_state_changed(self, event);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }
}

impl Lifecycle for LifecycleRegistry {
    fn add_observer(&self, observer: Arc<dyn LifecycleObserver>) {
        let mut observers = self.observers.lock();
        if !observers.iter().any(|o| same_observer(o, &observer)) {
            observers.push(observer);
        }
    }

    fn remove_observer(&self, observer: &Arc<dyn LifecycleObserver>) {
        self.observers.lock().retain(|o| !same_observer(o, observer));
    }
}

/// Observer that disposes one subscription on the terminal transition.
///
/// Holds no reference to the lifecycle owner; it only reacts to the
/// notifications it is handed.
pub(crate) struct LifecycleBinding {
    subscription: Subscription,
    this: Weak<LifecycleBinding>,
    fired: AtomicBool,
}

impl LifecycleBinding {
    /// Attach a binding for `subscription` to `lifecycle`.
    pub(crate) fn attach(subscription: Subscription, lifecycle: &dyn Lifecycle) {
        let binding = Arc::new_cyclic(|this| LifecycleBinding {
            subscription,
            this: this.clone(),
            fired: AtomicBool::new(false),
        });
        lifecycle.add_observer(binding);
    }
}

impl LifecycleObserver for LifecycleBinding {
    fn on_state_changed(&self, source: &dyn Lifecycle, event: LifecycleEvent) {
        if !event.is_terminal() || self.fired.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(this) = self.this.upgrade() {
            let observer: Arc<dyn LifecycleObserver> = this;
            source.remove_observer(&observer);
        }

        self.subscription.dispose();
        self.subscription.log(|| {
            format!(
                "Automatically disposing listener for {}",
                self.subscription.event_name()
            )
        });
    }
}
