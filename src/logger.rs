//! Pluggable diagnostics for the hub.
//!
//! The hub never formats a message unless a logger is installed, so a hub
//! built with `set_logger(None)` pays nothing for diagnostics.

use crate::error::HubError;
use parking_lot::{Mutex, RwLock};
use std::error::Error;
use std::sync::Arc;

/// Sink for hub diagnostics.
pub trait HubLogger: Send + Sync {
    /// Informational line.
    fn log(&self, description: &str);

    /// Error line, with the underlying cause when there is one.
    fn log_error(&self, description: &str, cause: Option<&(dyn Error + 'static)>);
}

/// Default logger: forwards to `tracing` under the `event_hub` target.
#[derive(Clone, Debug)]
pub struct TracingLogger {
    tag: &'static str,
}

impl TracingLogger {
    pub const DEFAULT_TAG: &'static str = "EventHub";

    pub fn new() -> Self {
        Self::with_tag(Self::DEFAULT_TAG)
    }

    pub fn with_tag(tag: &'static str) -> Self {
        Self { tag }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl HubLogger for TracingLogger {
    fn log(&self, description: &str) {
        tracing::debug!(target: "event_hub", tag = self.tag, "{}", description);
    }

    fn log_error(&self, description: &str, cause: Option<&(dyn Error + 'static)>) {
        match cause {
            Some(cause) => {
                tracing::error!(target: "event_hub", tag = self.tag, error = %cause, "{}", description)
            }
            None => tracing::error!(target: "event_hub", tag = self.tag, "{}", description),
        }
    }
}

/// Logger that keeps every line in memory.
///
/// A supported sink for hosts that surface hub diagnostics themselves, for
/// instance in a debug panel or in their own test assertions. Informational
/// lines and error lines are kept apart; an error line carries its cause
/// after a colon. Nothing is ever evicted, so long-running hosts should
/// drain it with [`MemoryLogger::take`].
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    pub fn has_line(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }

    pub fn has_error(&self, needle: &str) -> bool {
        self.errors.lock().iter().any(|line| line.contains(needle))
    }

    /// Remove and return everything recorded so far as `(lines, errors)`.
    pub fn take(&self) -> (Vec<String>, Vec<String>) {
        let lines = std::mem::take(&mut *self.lines.lock());
        let errors = std::mem::take(&mut *self.errors.lock());
        (lines, errors)
    }
}

impl HubLogger for MemoryLogger {
    fn log(&self, description: &str) {
        self.lines.lock().push(description.to_string());
    }

    fn log_error(&self, description: &str, cause: Option<&(dyn Error + 'static)>) {
        let line = match cause {
            Some(cause) => format!("{}: {}", description, cause),
            None => description.to_string(),
        };
        self.errors.lock().push(line);
    }
}

/// Swappable logger reference shared by the hub and its dispatcher.
///
/// Messages are built lazily and the lock is released before the logger
/// runs, so a logger may call back into the hub.
#[derive(Default)]
pub(crate) struct LoggerSlot {
    logger: RwLock<Option<Arc<dyn HubLogger>>>,
}

impl LoggerSlot {
    pub(crate) fn new(logger: Option<Arc<dyn HubLogger>>) -> Self {
        Self {
            logger: RwLock::new(logger),
        }
    }

    pub(crate) fn set(&self, logger: Option<Arc<dyn HubLogger>>) {
        *self.logger.write() = logger;
    }

    pub(crate) fn get(&self) -> Option<Arc<dyn HubLogger>> {
        self.logger.read().clone()
    }

    pub(crate) fn log(&self, describe: impl FnOnce() -> String) {
        if let Some(logger) = self.get() {
            logger.log(&describe());
        }
    }

    pub(crate) fn log_error(
        &self,
        describe: impl FnOnce() -> String,
        cause: Option<&(dyn Error + 'static)>,
    ) {
        if let Some(logger) = self.get() {
            logger.log_error(&describe(), cause);
        }
    }

    /// Log a failed delivery to one subscriber.
    pub(crate) fn delivery_failed(&self, event_name: &str, err: &HubError) {
        match err {
            HubError::TypeMismatch { .. } => self.log_error(|| err.to_string(), None),
            _ => self.log_error(
                || format!("Unknown failure while delivering '{}'", event_name),
                Some(err),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tag() {
        assert_eq!(TracingLogger::default().tag(), "EventHub");
        assert_eq!(TracingLogger::with_tag("Custom").tag(), "Custom");
    }

    #[test]
    fn test_logs_without_subscriber_installed() {
        // No global subscriber: events are discarded, nothing panics.
        let logger = TracingLogger::new();
        logger.log("hello");
        logger.log_error("failed", Some(&HubError::ShutDown));
        logger.log_error("failed", None);
    }

    #[test]
    fn test_empty_slot_is_inert() {
        let slot = LoggerSlot::default();
        slot.log(|| panic!("message must not be built without a logger"));
        slot.delivery_failed("x", &HubError::ShutDown);
    }

    #[test]
    fn test_swap_logger() {
        let first = Arc::new(MemoryLogger::new());
        let second = Arc::new(MemoryLogger::new());
        let slot = LoggerSlot::new(Some(first.clone()));

        slot.log(|| "one".to_string());
        slot.set(Some(second.clone()));
        slot.log(|| "two".to_string());
        slot.set(None);
        slot.log(|| "three".to_string());

        assert_eq!(first.lines(), vec!["one".to_string()]);
        assert_eq!(second.lines(), vec!["two".to_string()]);
    }

    #[test]
    fn test_delivery_failure_classification() {
        let logger = Arc::new(MemoryLogger::new());
        let slot = LoggerSlot::new(Some(logger.clone()));

        slot.delivery_failed(
            "n",
            &HubError::TypeMismatch {
                event: "n".to_string(),
                expected: "i32",
                actual: "alloc::string::String",
            },
        );
        slot.delivery_failed(
            "n",
            &HubError::CallbackPanicked {
                event: "n".to_string(),
                message: "boom".to_string(),
            },
        );

        let errors = logger.errors();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("expects i32"));
        assert!(errors[1].starts_with("Unknown failure while delivering 'n'"));
        assert!(errors[1].contains("boom"));
    }

    #[test]
    fn test_memory_logger_take_drains() {
        let logger = MemoryLogger::new();
        logger.log("started");
        logger.log_error("failed", Some(&HubError::ShutDown));

        let (lines, errors) = logger.take();
        assert_eq!(lines, vec!["started".to_string()]);
        assert_eq!(errors, vec!["failed: Event hub is shut down".to_string()]);
        assert!(logger.lines().is_empty());
        assert!(logger.errors().is_empty());
    }
}
