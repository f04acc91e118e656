//! Core types for the event hub.

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Unique identifier for a subscriber.
///
/// Identity is allocated per registration, so two subscribers with identical
/// fields stay distinct and can be removed independently.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriberId(pub u64);

impl fmt::Debug for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriberId({})", self.0)
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a subscriber's callback runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    /// The single serial context, ordered against other `Main` deliveries.
    #[default]
    Main,
    /// Whichever pool worker is running the emission.
    Background,
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionContext::Main => write!(f, "main"),
            ExecutionContext::Background => write!(f, "background"),
        }
    }
}

/// Type-erased data attached to an emission.
///
/// Cloning is cheap; every subscriber of an emission sees the same value.
#[derive(Clone)]
pub struct Payload {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Payload {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Name of the concrete type the payload was built from.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        Any::type_id(&*self.value)
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Narrow the payload to `T`, or `None` on a type mismatch.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload<{}>", self.type_name)
    }
}

/// Options shared by both subscribe forms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Replay the latest cached payload immediately on subscribe.
    pub receive_cached: bool,
    /// Where the callback runs for live emissions.
    pub context: ExecutionContext,
}

impl SubscribeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(mut self) -> Self {
        self.receive_cached = true;
        self
    }

    pub fn on(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn background(self) -> Self {
        self.on(ExecutionContext::Background)
    }
}
