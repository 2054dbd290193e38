//! Daily time trigger for background jobs.
//!
//! Stands in for the external scheduler: a background thread that fires
//! each registered job once per UTC day. Job failures are logged and never
//! affect sibling jobs.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{error, info};

/// A named daily job.
pub type JobHandler = Box<dyn Fn() -> Result<(), String> + Send + Sync>;

/// Registry of daily jobs plus the trigger loop.
pub struct DailyTrigger {
    jobs: Vec<(String, JobHandler)>,
}

impl DailyTrigger {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    pub fn register<F>(&mut self, name: impl Into<String>, job: F)
    where
        F: Fn() -> Result<(), String> + Send + Sync + 'static,
    {
        self.jobs.push((name.into(), Box::new(job)));
    }

    /// Run every registered job once. Failures are isolated per job.
    /// Returns the number of failed jobs.
    pub fn run_once(&self) -> usize {
        let mut failed = 0;
        for (name, job) in &self.jobs {
            match job() {
                Ok(()) => info!(job = %name, "daily job completed"),
                Err(err) => {
                    failed += 1;
                    error!(job = %name, error = %err, "daily job failed");
                }
            }
        }
        failed
    }

    /// Spawn the trigger loop: jobs fire immediately on start, then once
    /// per UTC day change.
    pub fn spawn(self, poll_interval: Duration) -> DailyTriggerHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let join = thread::Builder::new()
            .name("daily-trigger".to_string())
            .spawn(move || {
                info!("daily trigger started");
                let mut last_run: Option<NaiveDate> = None;

                loop {
                    let today = Utc::now().date_naive();
                    if last_run != Some(today) {
                        self.run_once();
                        last_run = Some(today);
                    }

                    // Sleep that doubles as the shutdown listener.
                    match shutdown_rx.recv_timeout(poll_interval) {
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                        Err(mpsc::RecvTimeoutError::Timeout) => {}
                    }
                }

                info!("daily trigger stopped");
            })
            .expect("failed to spawn daily trigger thread");

        DailyTriggerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }
}

impl Default for DailyTrigger {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to stop a running trigger loop.
pub struct DailyTriggerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl DailyTriggerHandle {
    /// Request graceful shutdown and wait for the loop to exit.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
