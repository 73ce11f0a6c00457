#![deny(missing_docs)]

//! A bounded-concurrency task-dispatch queue.
//!
//! This library provides [`DispatchQueue`], a fixed-size pool of worker
//! threads fed by a shared FIFO queue. Closures dispatched from any
//! thread are executed in submission order, and dropping the queue
//! shuts the pool down cleanly: every accepted task runs exactly once
//! and every worker thread is joined before the drop returns.

mod error;
mod queue;

pub use error::{DispatchError, Result};
pub use queue::DispatchQueue;
