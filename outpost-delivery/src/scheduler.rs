//! Interval-driven scheduling of delivery worker runs.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use outpost_common::Signal;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::DeliveryWorker;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Drives the [`DeliveryWorker`] on a fixed interval with at most one
/// run active at a time.
///
/// The in-flight guard is an atomic owned by the scheduler: a tick that
/// fires while the previous run is still executing is skipped entirely,
/// not queued. The guarantee is process-local only; no store-level
/// lease is taken.
#[derive(Debug)]
pub struct Scheduler {
    worker: Arc<DeliveryWorker>,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl Scheduler {
    #[must_use]
    pub fn new(worker: Arc<DeliveryWorker>, interval: Duration) -> Self {
        Self {
            worker,
            interval,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a worker run is currently in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start a worker run unless one is already active.
    ///
    /// Returns `false` when the tick was skipped because the previous
    /// run had not completed.
    pub fn trigger(&self) -> bool {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Previous delivery run still active, skipping tick");
            return false;
        }

        let worker = Arc::clone(&self.worker);
        let running = Arc::clone(&self.running);

        tokio::spawn(async move {
            match worker.run_tick().await {
                Ok(summary) if summary.selected > 0 => {
                    info!(
                        selected = summary.selected,
                        sent = summary.sent,
                        deferred = summary.deferred,
                        failed = summary.failed,
                        "Delivery tick complete"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "Delivery tick aborted");
                }
            }
            running.store(false, Ordering::SeqCst);
        });

        true
    }

    /// Run the scheduler until a shutdown signal arrives.
    ///
    /// The first interval tick fires after one full period, not
    /// immediately. On shutdown any in-flight run is given a grace
    /// period to finish; an unfinished run's messages are simply picked
    /// up again after restart, since nothing marks them outside the
    /// normal state transitions.
    pub async fn serve(&self, mut shutdown: broadcast::Receiver<Signal>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Delivery scheduler starting"
        );

        let mut timer = tokio::time::interval(self.interval);
        // Consume the immediate first tick.
        timer.tick().await;

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    self.trigger();
                }
                sig = shutdown.recv() => {
                    match sig {
                        Ok(Signal::Shutdown) => {
                            info!("Delivery scheduler received shutdown signal");
                        }
                        Err(e) => {
                            error!(error = %e, "Shutdown channel error");
                        }
                    }
                    self.drain().await;
                    break;
                }
            }
        }

        info!("Delivery scheduler stopped");
    }

    /// Wait (bounded) for the in-flight run to complete.
    async fn drain(&self) {
        let start = tokio::time::Instant::now();

        while self.is_running() {
            if start.elapsed() >= SHUTDOWN_GRACE {
                debug!("Shutdown grace period exceeded with a run still in flight");
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
