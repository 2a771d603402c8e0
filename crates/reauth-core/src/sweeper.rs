//! Periodic cache sweeper

use std::sync::Arc;

use reauth_db::SessionRepository;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::authority::SessionAuthority;

/// Handle to the background sweep task.
///
/// The task wakes every `cache_residency` and runs
/// [`SessionAuthority::sweep_cache`]. Dropping the handle cancels the task;
/// call [`stop`](Self::stop) to also wait for it to finish.
#[derive(Debug)]
pub struct CacheSweeper {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl CacheSweeper {
    /// Spawn the sweep task on the current runtime
    pub fn start<R>(authority: Arc<SessionAuthority<R>>) -> Self
    where
        R: SessionRepository + 'static,
    {
        let cancel = CancellationToken::new();
        let interval = authority.config().cache_residency;
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "Session cache sweeper started");
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        let report = authority.sweep_cache().await;
                        debug!(removed = report.total(), "Sweep pass complete");
                    }
                }
            }
            info!("Session cache sweeper stopped");
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Whether the task is still running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the task and wait for it to exit
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Session cache sweeper exited abnormally");
            }
        }
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
