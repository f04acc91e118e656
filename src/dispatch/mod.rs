//! Delivery machinery.
//!
//! - [`WorkerPool`]: fixed set of threads running emission tasks
//! - [`SerialContext`]: the single thread that runs `Main` deliveries
//! - [`DispatchToken`]: cancel flag shared by every scheduled task
//! - [`Dispatcher`]: per-subscriber narrowing, routing and failure containment

mod dispatcher;
mod pool;
mod serial;
mod token;

pub use dispatcher::Dispatcher;
pub use pool::{Job, WorkerPool};
pub use serial::SerialContext;
pub use token::DispatchToken;
