//! Per-subscriber delivery: narrowing, context routing, failure containment.

use super::{DispatchToken, Job, SerialContext, WorkerPool};
use crate::config::HubConfig;
use crate::error::{HubError, Result};
use crate::logger::LoggerSlot;
use crate::registry::Subscriber;
use crate::types::{ExecutionContext, Payload};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Owns the dispatch threads and delivers one payload to one subscriber.
pub struct Dispatcher {
    pool: WorkerPool,
    serial: SerialContext,
    logger: Arc<LoggerSlot>,
    log_deliveries: bool,
    shut_down: AtomicBool,
}

impl Dispatcher {
    pub(crate) fn spawn(config: &HubConfig, logger: Arc<LoggerSlot>) -> Result<Self> {
        config.validate()?;

        let names = (0..config.background_workers)
            .map(|i| format!("{}-{}", config.worker_thread_prefix, i));
        let pool = WorkerPool::spawn(names)?;
        let serial = SerialContext::spawn(&config.main_thread_name)?;

        Ok(Self {
            pool,
            serial,
            logger,
            log_deliveries: config.log_deliveries,
            shut_down: AtomicBool::new(false),
        })
    }

    /// Queue an emission task on the worker pool.
    pub fn schedule(&self, job: Job) -> Result<()> {
        if self.is_shut_down() {
            return Err(HubError::ShutDown);
        }
        self.pool.submit(job)
    }

    /// Deliver `payload` to `subscriber`.
    ///
    /// Never fails outward: mismatches, panics and an unavailable main
    /// context are logged and the caller moves on to the next subscriber.
    pub fn deliver(
        &self,
        subscriber: &Arc<Subscriber>,
        payload: Option<&Payload>,
        token: &DispatchToken,
    ) {
        if let Err(err) = self.try_deliver(subscriber, payload, token) {
            self.logger.delivery_failed(subscriber.event_name(), &err);
        }
    }

    fn try_deliver(
        &self,
        subscriber: &Arc<Subscriber>,
        payload: Option<&Payload>,
        token: &DispatchToken,
    ) -> Result<()> {
        subscriber.narrow(payload)?;

        match subscriber.context() {
            ExecutionContext::Main => {
                let target = Arc::clone(subscriber);
                let payload = payload.cloned();
                let token = token.clone();
                let logger = Arc::clone(&self.logger);
                let log_deliveries = self.log_deliveries;

                self.serial
                    .call(move || {
                        if token.is_cancelled() {
                            return Ok(());
                        }
                        if log_deliveries {
                            logger.log(|| {
                                format!(
                                    "Subscriber received event '{}' on main thread",
                                    target.event_name()
                                )
                            });
                        }
                        target.deliver(payload.as_ref())
                    })
                    .unwrap_or_else(|| {
                        Err(HubError::MainContextUnavailable(
                            subscriber.event_name().to_string(),
                        ))
                    })
            }
            ExecutionContext::Background => {
                if self.log_deliveries {
                    self.logger.log(|| {
                        format!(
                            "Subscriber received event '{}' on background thread",
                            subscriber.event_name()
                        )
                    });
                }
                subscriber.deliver(payload)
            }
        }
    }

    /// Whether the calling thread is one of the dispatch threads.
    pub fn owns_current_thread(&self) -> bool {
        self.pool.owns_current_thread() || self.serial.is_current()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Close both queues and wait for the threads to finish.
    ///
    /// Queued work still drains. Threads are only joined when called from
    /// outside the hub: a worker or the serial thread cannot wait on its peers
    /// without risking a worker blocked on a reply from the serial thread.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }

        let join = !self.owns_current_thread();
        self.pool.close();
        if join {
            self.pool.join();
        }
        self.serial.close();
        if join {
            self.serial.join();
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
