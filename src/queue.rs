use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;

use log::{debug, error};

use crate::{DispatchError, Result};

/// A unit of deferred work. Owned by the queue from enqueue until a
/// worker pops it, then by that worker for the duration of execution.
type Task = Box<dyn FnOnce() + Send + 'static>;

/// A fixed-size worker pool fed by a FIFO task queue.
///
/// Tasks dispatched from any thread are executed in submission order.
/// With more than one worker, dequeue order is FIFO but completion
/// order is not: two consecutive tasks may run concurrently on
/// different workers.
///
/// Dropping the queue is the shutdown protocol: remaining tasks are
/// drained, then every worker thread is joined. After the drop
/// returns, no task is in flight and no worker is running.
///
/// A `DispatchQueue` is not `Clone`. Producers on other threads share
/// one instance by reference or behind an `Arc`. When sharing via
/// `Arc`, the last clone must be dropped from outside the pool:
/// dropping it inside a task would make a worker try to join itself.
pub struct DispatchQueue {
    shared: Arc<Shared>,
    workers: Vec<thread::JoinHandle<()>>,
}

/// State shared between the owning handle and the worker threads.
struct Shared {
    /// One mutex domain guards both the task queue and the shutdown
    /// flag; it is held only for queue manipulation, never while a
    /// task executes.
    state: Mutex<State>,
    /// Signaled once per dispatch, broadcast on shutdown.
    task_ready: Condvar,
}

struct State {
    tasks: VecDeque<Task>,
    /// One-way flag: set at the start of shutdown, never reset.
    quit: bool,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        // Tasks run outside the lock and worker panics are caught, so
        // a poisoned mutex is unreachable.
        self.state.lock().expect("dispatch queue state poisoned")
    }
}

impl DispatchQueue {
    /// Creates a pool of `workers` threads, each immediately waiting
    /// for tasks.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NoWorkers`] if `workers` is zero — a
    /// zero-width pool would accept tasks but never run them — and
    /// [`DispatchError::Io`] if a worker thread cannot be spawned.
    pub fn new(workers: u32) -> Result<DispatchQueue> {
        if workers == 0 {
            return Err(DispatchError::NoWorkers);
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                tasks: VecDeque::new(),
                quit: false,
            }),
            task_ready: Condvar::new(),
        });

        // Handles are pushed as they spawn so that a failure partway
        // through drops the queue and joins the workers already running.
        let mut queue = DispatchQueue {
            shared: Arc::clone(&shared),
            workers: Vec::with_capacity(workers as usize),
        };

        for id in 0..workers {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("dispatch-worker-{id}"))
                .spawn(move || worker_loop(&shared, id))?;
            queue.workers.push(handle);
        }

        Ok(queue)
    }

    /// Enqueues a task for execution by one of the pool's workers.
    ///
    /// Callable from any thread, including a worker thread — the lock
    /// is never held while a task runs, so re-entrant dispatch cannot
    /// deadlock. Wakes at most one idle worker.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ShutDown`] if shutdown has begun.
    /// Callers cannot outlive the owning handle, so this guard is
    /// unreachable in ordinary use; it exists so that no task can
    /// slip into the queue once the drain has started.
    pub fn dispatch<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.lock_state();
        if state.quit {
            return Err(DispatchError::ShutDown);
        }
        state.tasks.push_back(Box::new(task));

        // Unlock before notifying, so the woken worker doesn't
        // immediately block on the lock we still hold.
        drop(state);
        self.shared.task_ready.notify_one();

        Ok(())
    }
}

impl Drop for DispatchQueue {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock_state();
            state.quit = true;
        }
        // Every worker must observe shutdown independently; a single
        // notification would leave the rest waiting forever.
        self.shared.task_ready.notify_all();

        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("dispatch-worker").to_owned();
            if handle.join().is_err() {
                error!("{name} panicked outside a task");
            }
        }
    }
}

/// The loop run by each worker thread.
///
/// Waits until a task is queued or shutdown is signaled, pops one task,
/// runs it outside the lock, and repeats. Queued tasks are drained
/// before shutdown is honored, so every task accepted by `dispatch`
/// runs exactly once. A panicking task is logged and the worker
/// continues; a task fault never shrinks the pool.
fn worker_loop(shared: &Shared, id: u32) {
    let mut state = shared.lock_state();

    loop {
        while state.tasks.is_empty() && !state.quit {
            state = shared
                .task_ready
                .wait(state)
                .expect("dispatch queue state poisoned");
        }

        match state.tasks.pop_front() {
            Some(task) => {
                drop(state);
                debug!("Worker {id} executing task");
                if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                    error!("Worker {id} task panicked, continuing");
                }
                state = shared.lock_state();
            }
            // Empty queue here means quit was observed: drain is done.
            None => {
                debug!("Worker {id}: shutdown observed, exiting");
                return;
            }
        }
    }
}
