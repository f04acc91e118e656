//! The serial context that `Main` deliveries are marshalled onto.

use super::WorkerPool;
use crate::error::Result;
use crossbeam_channel::bounded;

/// A single dedicated thread running jobs in submission order.
///
/// Stands in for a UI thread: everything routed to `Main` is ordered against
/// everything else routed to `Main`.
pub struct SerialContext {
    pool: WorkerPool,
}

impl SerialContext {
    pub fn spawn(thread_name: &str) -> Result<Self> {
        let pool = WorkerPool::spawn(std::iter::once(thread_name.to_string()))?;
        Ok(Self { pool })
    }

    pub fn is_current(&self) -> bool {
        self.pool.owns_current_thread()
    }

    /// Run `f` on the serial thread and wait for its result.
    ///
    /// Runs inline when already on the serial thread. Returns `None` if the
    /// context is closed or the job died before answering.
    pub fn call<R, F>(&self, f: F) -> Option<R>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        if self.is_current() {
            return Some(f());
        }

        let (reply_tx, reply_rx) = bounded(1);
        self.pool
            .submit(Box::new(move || {
                let _ = reply_tx.send(f());
            }))
            .ok()?;
        reply_rx.recv().ok()
    }

    pub fn close(&self) {
        self.pool.close();
    }

    pub fn join(&self) {
        self.pool.join();
    }
}
