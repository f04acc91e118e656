//! Subscriber record and the typed narrowing step.

use crate::error::{HubError, Result};
use crate::types::{ExecutionContext, Payload, SubscriberId};
use std::any::{Any, TypeId};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

type Receiver = dyn Fn(Option<&Payload>) + Send + Sync;

/// A registered callback for one event name.
///
/// The declared payload type is captured when the subscriber is built; the
/// erased receiver only ever sees payloads that passed [`Subscriber::narrow`].
pub struct Subscriber {
    id: SubscriberId,
    event_name: String,
    context: ExecutionContext,
    expects: TypeId,
    expects_name: &'static str,
    receiver: Box<Receiver>,
}

impl Subscriber {
    pub fn new<T, F>(
        id: SubscriberId,
        event_name: impl Into<String>,
        context: ExecutionContext,
        callback: F,
    ) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(Option<&T>) + Send + Sync + 'static,
    {
        let receiver = move |payload: Option<&Payload>| match payload {
            None => callback(None),
            Some(payload) => {
                if let Some(value) = payload.downcast_ref::<T>() {
                    callback(Some(value));
                }
            }
        };

        Self {
            id,
            event_name: event_name.into(),
            context,
            expects: TypeId::of::<T>(),
            expects_name: std::any::type_name::<T>(),
            receiver: Box::new(receiver),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    /// Name of the declared payload type.
    pub fn expects(&self) -> &'static str {
        self.expects_name
    }

    /// Check that `payload` can be narrowed to the declared type.
    ///
    /// An absent payload always passes.
    pub fn narrow(&self, payload: Option<&Payload>) -> Result<()> {
        match payload {
            Some(payload) if payload.type_id() != self.expects => Err(HubError::TypeMismatch {
                event: self.event_name.clone(),
                expected: self.expects_name,
                actual: payload.type_name(),
            }),
            _ => Ok(()),
        }
    }

    /// Narrow and invoke the callback on the current thread.
    ///
    /// A panic inside the callback is caught and returned as
    /// [`HubError::CallbackPanicked`].
    pub fn deliver(&self, payload: Option<&Payload>) -> Result<()> {
        self.narrow(payload)?;
        panic::catch_unwind(AssertUnwindSafe(|| (self.receiver)(payload))).map_err(|cause| {
            HubError::CallbackPanicked {
                event: self.event_name.clone(),
                message: panic_message(cause.as_ref()),
            }
        })
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("event_name", &self.event_name)
            .field("context", &self.context)
            .field("expects", &self.expects_name)
            .finish()
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> String {
    if let Some(message) = cause.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
