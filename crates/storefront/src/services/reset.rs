//! Cancellable delayed callbacks.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A callback that runs once after a delay.
///
/// Dropping the handle aborts the task, so a reset that belongs to a flow
/// never outlives the flow.
#[derive(Debug)]
pub struct ScheduledReset {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledReset {
    /// Spawn `task` to run after `delay`.
    pub fn spawn<F>(delay: Duration, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Let go of the task without aborting it.
    ///
    /// The task calls this on its own handle once it has done its work.
    pub fn disarm(mut self) {
        self.handle = None;
    }

    /// Whether the task has finished or been aborted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for ScheduledReset {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
