use crate::error::{BoardError, BoardResult};
use futures::{future::join_all, FutureExt};
use std::{
    any::Any,
    fmt,
    future::Future,
    panic::AssertUnwindSafe,
    sync::{Mutex, PoisonError},
};
use tracing::{debug, warn};

/// Why a task did not produce its own result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    Error(String),
    Panicked(String),
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskFailure::Error(s) => write!(f, "{}", s),
            TaskFailure::Panicked(s) => write!(f, "Task panicked: {}", s),
        }
    }
}

/// Concurrency-limited map over a batch of items.
///
/// A fixed set of worker loops pulls items from a shared queue in input order, so at
/// most `limit` tasks are in flight. Results land in the slot of their input index.
#[derive(Debug, Clone, Copy)]
pub struct BoundedExecutor {
    limit: usize,
}

impl BoundedExecutor {
    pub fn new(limit: usize) -> BoardResult<Self> {
        match limit {
            0 => Err(BoardError::InvalidConcurrency),
            limit => Ok(BoundedExecutor { limit }),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run `task` on every item and return the results in input order.
    ///
    /// A task that errors or panics does not stop the batch: `recover` turns the
    /// failure into the value stored in that item's slot.
    pub async fn run<T, R, E, F, Fut, G>(&self, items: Vec<T>, task: F, recover: G) -> Vec<R>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: fmt::Display,
        G: Fn(TaskFailure) -> R,
    {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }

        let queue = Mutex::new(items.into_iter().enumerate());
        let slots: Mutex<Vec<Option<R>>> = Mutex::new((0..total).map(|_| None).collect());
        let n_workers = self.limit.min(total);
        debug!("Running {total} tasks on {n_workers} workers");

        let workers = (0..n_workers).map(|_| {
            let (queue, slots, task, recover) = (&queue, &slots, &task, &recover);
            async move {
                loop {
                    // Lock scoped so it is never held across an await
                    let next = queue.lock().unwrap_or_else(PoisonError::into_inner).next();
                    let Some((index, item)) = next else {
                        break;
                    };

                    let outcome = AssertUnwindSafe(async { task(item).await })
                        .catch_unwind()
                        .await;
                    let result = match outcome {
                        Ok(Ok(result)) => result,
                        Ok(Err(e)) => {
                            warn!("Task {index} failed: {e}");
                            recover(TaskFailure::Error(e.to_string()))
                        }
                        Err(payload) => {
                            let message = panic_message(payload.as_ref());
                            warn!("Task {index} panicked: {message}");
                            recover(TaskFailure::Panicked(message))
                        }
                    };

                    slots.lock().unwrap_or_else(PoisonError::into_inner)[index] = Some(result);
                }
            }
        });
        join_all(workers).await;

        // Every slot is filled once the queue is drained
        slots
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .flatten()
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
