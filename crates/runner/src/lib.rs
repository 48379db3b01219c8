//! A concurrent application runner that manages long-running processes with graceful shutdown.
//!
//! The runner orchestrates named app processes and cleanup functions, providing:
//! - Concurrent execution of multiple processes
//! - Graceful shutdown on SIGTERM/SIGINT
//! - Shutdown when any process ends, with the failing process named in the logs
//! - Configurable cleanup timeout
//! - Cleanup execution regardless of process outcome
//!
//! # Example
//!
//! ```no_run
//! use cirrus_runner::Runner;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = Runner::new()
//!         .with_app_process(|ctx| async move {
//!             loop {
//!                 tokio::select! {
//!                     _ = ctx.cancelled() => {
//!                         tracing::info!("Process stopping gracefully");
//!                         break;
//!                     }
//!                     _ = tokio::time::sleep(Duration::from_secs(1)) => {
//!                         tracing::info!("Process working...");
//!                     }
//!                 }
//!             }
//!             Ok(())
//!         })
//!         .with_closer(|| async move {
//!             tracing::info!("Cleaning up resources");
//!             Ok(())
//!         })
//!         .with_closer_timeout(Duration::from_secs(5));
//!
//!     runner.run().await;
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Type alias for an app process function.
/// Takes a cancellation token and returns a future that resolves to Result<(), anyhow::Error>
pub type AppProcess =
    Box<dyn FnOnce(CancellationToken) -> Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send>> + Send>;

/// Type alias for a closer function.
/// Returns a future that resolves to Result<(), anyhow::Error>
pub type Closer = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send>> + Send>;

/// A concurrent application runner that manages long-running processes with graceful shutdown.
///
/// The `Runner` orchestrates named app processes and cleanup functions:
/// - App processes run concurrently; the first one to end, successfully or
///   not, cancels the shared token and brings the others down
/// - Closers execute afterward, regardless of process outcome
/// - Signal handling (SIGTERM/SIGINT) implements graceful shutdown
pub struct Runner {
    processes: Vec<(String, AppProcess)>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
    cancellation_token: CancellationToken,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Creates a new Runner with default configuration.
    ///
    /// Default settings:
    /// - Closer timeout: 10 seconds
    /// - No app processes or closers
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: Duration::from_secs(10),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Adds a named app process to the runner.
    ///
    /// The name appears in lifecycle logs, so a failing process can be told
    /// apart from its siblings.
    pub fn with_named_process(mut self, name: impl Into<String>, process: AppProcess) -> Self {
        self.processes.push((name.into(), process));
        self
    }

    /// Adds an app process with an autogenerated name.
    ///
    /// # Arguments
    ///
    /// * `process` - A function that takes a CancellationToken and returns a Future
    pub fn with_app_process<F, Fut>(self, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        let name = format!("process_{}", self.processes.len());
        self.with_named_process(name, Box::new(|token| Box::pin(process(token))))
    }

    /// Adds a closer to the runner.
    ///
    /// Closers are executed after all app processes have stopped,
    /// regardless of whether they stopped due to error or cancellation.
    /// All closers will attempt to execute even if some fail.
    ///
    /// # Arguments
    ///
    /// * `closer` - A function that returns a Future for cleanup
    pub fn with_closer<F, Fut>(mut self, closer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.closers.push(Box::new(|| Box::pin(closer())));
        self
    }

    /// Sets the timeout for executing closers.
    ///
    /// Default is 10 seconds.
    pub fn with_closer_timeout(mut self, timeout: Duration) -> Self {
        self.closer_timeout = timeout;
        self
    }

    /// Sets a custom cancellation token.
    ///
    /// This allows external control over process cancellation.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Runs all app processes and waits for completion or shutdown signal,
    /// then exits the process.
    ///
    /// This method:
    /// 1. Spawns all app processes concurrently
    /// 2. Monitors for SIGTERM/SIGINT signals
    /// 3. Cancels all processes when a signal is received or any process ends
    /// 4. Executes all closers with the configured timeout
    /// 5. Exits with code 0, or 1 if any process failed
    pub async fn run(self) {
        std::process::exit(self.execute().await);
    }

    async fn execute(self) -> i32 {
        let token = self.cancellation_token;
        let mut join_set = JoinSet::new();

        // Spawn all app processes
        for (name, process) in self.processes {
            let process_token = token.clone();
            join_set.spawn(async move {
                let result = process(process_token).await;
                (name, result)
            });
        }

        // Spawn signal handler
        let signal_token = token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received shutdown signal");
                    signal_token.cancel();
                }
                Err(err) => {
                    tracing::error!("Error setting up signal handler: {}", err);
                }
            }
        });

        // Also handle SIGTERM on Unix systems
        #[cfg(unix)]
        {
            let sigterm_token = token.clone();
            tokio::spawn(async move {
                use tokio::signal::unix::{signal, SignalKind};
                let mut sigterm = signal(SignalKind::terminate())
                    .expect("Failed to set up SIGTERM handler");
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
                sigterm_token.cancel();
            });
        }

        // Drain processes. Any process ending, for any reason, takes the
        // whole application down; the remaining processes observe the
        // cancelled token and return.
        let mut first_error: Option<anyhow::Error> = None;
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((name, Ok(()))) => {
                    tracing::info!(process = %name, "App process completed");
                }
                Ok((name, Err(err))) => {
                    tracing::error!(process = %name, "App process failed: {:#}", err);
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
                Err(err) => {
                    tracing::error!("App process panicked: {}", err);
                    if first_error.is_none() {
                        first_error = Some(anyhow::anyhow!("app process panicked: {}", err));
                    }
                }
            }
            token.cancel();
        }

        // Execute closers with timeout
        if !self.closers.is_empty() {
            tracing::info!("Running closers with timeout of {:?}", self.closer_timeout);

            let closer_result =
                tokio::time::timeout(self.closer_timeout, Self::run_closers(self.closers)).await;

            match closer_result {
                Ok(_) => {
                    tracing::info!("All closers completed");
                }
                Err(_) => {
                    tracing::error!("Closers timed out after {:?}", self.closer_timeout);
                }
            }
        }

        match first_error {
            Some(err) => {
                tracing::error!("Application exiting with error: {:#}", err);
                1
            }
            None => {
                tracing::info!("Application exiting normally");
                0
            }
        }
    }

    /// Runs all closers concurrently.
    async fn run_closers(closers: Vec<Closer>) {
        let mut closer_set = JoinSet::new();

        for closer in closers {
            closer_set.spawn(async move { closer().await });
        }

        while let Some(result) = closer_set.join_next().await {
            match result {
                Ok(Ok(())) => {
                    tracing::debug!("Closer completed successfully");
                }
                Ok(Err(err)) => {
                    tracing::error!("Closer error: {:#}", err);
                }
                Err(err) => {
                    tracing::error!("Closer panicked: {}", err);
                }
            }
        }
    }
}
