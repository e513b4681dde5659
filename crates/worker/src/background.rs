//! Detached work that outlives the request that started it.
//!
//! Stale-while-revalidate refreshes and late network-first write-throughs run
//! here. Nothing that returns a response ever joins these tasks; a host may
//! [`Background::drain`] them before shutting down.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinSet;

#[derive(Clone, Default)]
pub struct Background {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl Background {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a task without waiting for it. Must be called inside a tokio runtime.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }

    /// Tasks spawned and not yet reaped (finished tasks may still be counted).
    pub fn len(&self) -> usize {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait for every task spawned so far, including tasks they spawn.
    pub async fn drain(&self) {
        loop {
            let mut batch = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
            if batch.is_empty() {
                return;
            }
            while let Some(result) = batch.join_next().await {
                if let Err(err) = result {
                    tracing::warn!(error = %err, "background task ended abnormally");
                }
            }
        }
    }
}

impl std::fmt::Debug for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Background").field("tasks", &self.len()).finish()
    }
}
