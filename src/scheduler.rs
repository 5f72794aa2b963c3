//! Periodic task scheduling for the engine's background work.
//!
//! The engine registers small tasks (time sampling, here; flushes and
//! compaction checks elsewhere) that run on a fixed cadence until shutdown.
//! Each task gets its own tokio timer loop; failures are logged and the loop
//! keeps going, so one bad round never kills the cadence.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::Result;

/// Per-run context handed to a periodic task.
pub struct TaskContext {
    /// How many times this task has fired, starting at 1.
    pub run: u64,
    /// Signalled when the scheduler is shutting down; long-running rounds
    /// should poll it.
    pub shutdown: broadcast::Receiver<()>,
}

/// A task that runs on a fixed period until the scheduler shuts down.
#[async_trait::async_trait]
pub trait PeriodicTask: Send + Sync {
    /// Task name, used in log events.
    fn name(&self) -> &'static str;

    /// Time between runs.
    fn period(&self) -> Duration;

    /// One run of the task.
    async fn run(&self, ctx: TaskContext) -> Result<()>;
}

/// Runs registered [`PeriodicTask`]s until [`shutdown`](Self::shutdown).
pub struct TaskScheduler {
    handles: Mutex<Vec<JoinHandle<()>>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            handles: Mutex::new(Vec::new()),
            shutdown_tx,
        }
    }

    /// Starts a timer loop for the task. The first run happens one full
    /// period after registration.
    pub fn register(&self, task: Arc<dyn PeriodicTask>) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(task.period());
            // The first interval tick completes immediately; consume it so
            // registration does not trigger an instant run.
            ticker.tick().await;
            let mut run = 0u64;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        run += 1;
                        let ctx = TaskContext {
                            run,
                            shutdown: shutdown_rx.resubscribe(),
                        };
                        if let Err(error) = task.run(ctx).await {
                            tracing::error!(task = task.name(), %error, "periodic task failed");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::debug!(task = task.name(), "periodic task stopping");
                        break;
                    }
                }
            }
        });
        self.handles.lock().unwrap().push(handle);
    }

    /// Stops every task loop and waits for them to finish.
    pub async fn shutdown(self) -> Result<()> {
        self.shutdown_tx.send(()).ok();
        let handles: Vec<_> = self.handles.lock().unwrap().drain(..).collect();
        for handle in handles {
            handle.await?;
        }
        Ok(())
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}
