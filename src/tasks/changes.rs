//! Change Listener Task
//!
//! Drains an in-process feed of data-change notifications into the
//! invalidation dispatcher.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::invalidation::{DataChange, InvalidationDispatcher};

/// Spawns a task that dispatches every change received on `changes`.
///
/// The task ends once every sender has been dropped, so shutting down the
/// producer stops the listener.
pub fn spawn_change_listener(
    dispatcher: InvalidationDispatcher,
    mut changes: mpsc::Receiver<DataChange>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting change listener");

        let mut dispatched: u64 = 0;
        while let Some(change) = changes.recv().await {
            debug!(resource = %change.resource, "change notification received");
            dispatcher.dispatch(&change).await;
            dispatched += 1;
        }

        info!(dispatched, "Change feed closed, listener stopped");
    })
}
