//! Background loop that keeps a search store in sync with the navigator.
//!
//! [`LiveHandle`] controls the loop spawned by
//! [`SearchQuerySync::start_live`](crate::SearchQuerySync::start_live).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use crate::navigation::Location;
use crate::search::SearchQuerySync;

/// Handle for controlling the live query loop.
///
/// Call [`shutdown`](LiveHandle::shutdown) to stop the loop and wait for it.
/// Dropping every clone of the handle also stops the loop, without waiting.
///
/// `Clone` is cheap: all fields are `Arc`-wrapped or channel handles.
#[derive(Clone)]
pub struct LiveHandle {
    /// Sends `true` to signal the loop to stop.
    pub(crate) shutdown_tx: watch::Sender<bool>,
    /// Set to `true` once the mount-time probe and first refresh finished.
    pub(crate) mounted: Arc<AtomicBool>,
    /// The spawned background task. Wrapped in `Option` so it can be
    /// taken and awaited exactly once by [`shutdown`](LiveHandle::shutdown).
    pub(crate) task: Arc<tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>>,
}

impl LiveHandle {
    pub(crate) fn spawn(store: SearchQuerySync, location_rx: watch::Receiver<Location>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mounted = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run_query_loop(
            store,
            location_rx,
            Arc::clone(&mounted),
            shutdown_rx,
        ));
        Self {
            shutdown_tx,
            mounted,
            task: Arc::new(tokio::sync::Mutex::new(Some(task))),
        }
    }

    /// Returns `true` once the store has mounted: the salary bound probe
    /// and the first refresh have completed.
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Signal the loop to stop and wait for it to exit.
    ///
    /// Refreshes already started keep running to completion; only the
    /// reaction to further query changes stops. Calling `shutdown` more
    /// than once is safe.
    pub async fn shutdown(&self) {
        // The receiver is gone if the loop already exited.
        let _ = self.shutdown_tx.send(true);

        let task = self.task.lock().await.take();
        if let Some(join_handle) = task
            && let Err(e) = join_handle.await
        {
            tracing::error!(error = %e, "live query loop panicked");
        }
    }
}

/// Mount the store, then start a refresh for every query change.
///
/// Exits when shutdown is signalled, when every [`LiveHandle`] is dropped,
/// or when the navigator drops its sender.
async fn run_query_loop(
    store: SearchQuerySync,
    mut location_rx: watch::Receiver<Location>,
    mounted: Arc<AtomicBool>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    // The mount refresh covers whatever location is current now.
    drop(location_rx.borrow_and_update());

    tokio::select! {
        _ = store.mount() => {
            mounted.store(true, Ordering::Release);
            tracing::debug!("live loop: mounted");
        }
        _ = shutdown_rx.changed() => return,
    }

    loop {
        tokio::select! {
            changed = location_rx.changed() => {
                if changed.is_err() {
                    tracing::info!("live loop: navigator closed, stopping");
                    return;
                }
                let path = location_rx.borrow_and_update().full_path();
                tracing::debug!(path = %path, "live loop: query changed");
                let store = store.clone();
                tokio::spawn(async move {
                    store.refresh().await;
                });
            }
            _ = shutdown_rx.changed() => {
                tracing::debug!("live loop: shutdown");
                return;
            }
        }
    }
}
