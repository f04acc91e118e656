//! Fixed-size thread pool fed by a crossbeam queue.

use crate::error::{HubError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle, ThreadId};

/// Unit of work run by a pool thread.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Named worker threads draining one shared FIFO queue.
pub struct WorkerPool {
    sender: Mutex<Option<Sender<Job>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    thread_ids: Vec<ThreadId>,
}

impl WorkerPool {
    /// Spawn one thread per name.
    pub fn spawn<I>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let (sender, receiver) = unbounded::<Job>();
        let mut handles = Vec::new();

        for name in names {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(name)
                .spawn(move || worker_loop(receiver))?;
            handles.push(handle);
        }

        if handles.is_empty() {
            return Err(HubError::InvalidConfig(
                "worker pool needs at least one thread".to_string(),
            ));
        }

        let thread_ids = handles.iter().map(|h| h.thread().id()).collect();

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            handles: Mutex::new(handles),
            thread_ids,
        })
    }

    pub fn size(&self) -> usize {
        self.thread_ids.len()
    }

    /// Queue a job. Fails with [`HubError::ShutDown`] once the pool is closed.
    pub fn submit(&self, job: Job) -> Result<()> {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => sender.send(job).map_err(|_| HubError::ShutDown),
            None => Err(HubError::ShutDown),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Whether the calling thread belongs to this pool.
    pub fn owns_current_thread(&self) -> bool {
        let current = thread::current().id();
        self.thread_ids.contains(&current)
    }

    /// Stop accepting jobs. Already queued jobs still run.
    pub fn close(&self) {
        self.sender.lock().take();
    }

    /// Wait for every thread to drain the queue and exit.
    ///
    /// The calling thread is skipped if it belongs to the pool.
    pub fn join(&self) {
        let current = thread::current().id();
        let handles: Vec<_> = self.handles.lock().drain(..).collect();
        for handle in handles {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                tracing::error!(target: "event_hub", "dispatch thread exited with a panic");
            }
        }
    }
}

fn worker_loop(receiver: Receiver<Job>) {
    while let Ok(job) = receiver.recv() {
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::error!(target: "event_hub", "dispatch job panicked");
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close();
    }
}
