//! Persistence service — background flush of dirty storage keys.
//!
//! DESIGN
//! ======
//! A background task flushes dirty keys, then sleeps `FLUSH_INTERVAL_MS`
//! before the next cycle. Documents are serialized under the store lock and
//! written to the key/value backend on the blocking pool, so request
//! handlers never wait on disk I/O.
//!
//! The task stops when its shutdown channel fires or its sender is dropped,
//! after one last flush, so the caller can await the handle instead of
//! cancelling a write halfway.
//!
//! ERROR HANDLING
//! ==============
//! Dirty flags are cleared only after a successful write of the exact
//! revision that was serialized. A failed write keeps the flag set and the
//! next cycle retries; a key touched again mid-write stays dirty.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::kv::KeyValueStore;
use crate::state::AppState;
use crate::store::DirtyDocument;

/// Spawn the background persistence task. Sending on (or dropping) the
/// paired sender of `shutdown` ends the loop; await the handle to wait for it.
pub fn spawn_persistence_task(state: AppState, mut shutdown: oneshot::Receiver<()>) -> JoinHandle<()> {
    let flush_interval_ms = state.config.flush_interval_ms;
    info!(flush_interval_ms, "store persistence flush configured");
    tokio::spawn(async move {
        loop {
            flush_all_dirty(&state).await;
            tokio::select! {
                () = tokio::time::sleep(Duration::from_millis(flush_interval_ms)) => {}
                _ = &mut shutdown => {
                    flush_all_dirty(&state).await;
                    break;
                }
            }
        }
        info!("store persistence stopped");
    })
}

/// Flush every dirty key once. Returns how many keys were written.
pub async fn flush_all_dirty(state: &AppState) -> usize {
    // PHASE: SNAPSHOT DIRTY DOCUMENTS
    // WHY: serialize under the lock, then perform I/O lock-free.
    let docs = {
        let store = state.store.read().await;
        if !store.is_dirty() {
            return 0;
        }
        match store.snapshot_dirty() {
            Ok(docs) => docs,
            Err(e) => {
                error!(error = %e, "store snapshot failed");
                return 0;
            }
        }
    };

    // PHASE: WRITE + ACK
    // WHY: if a write fails we intentionally keep the dirty flag for retry.
    let mut written = 0;
    for doc in docs {
        let key = doc.key;
        let revision = doc.revision;
        match write_document(Arc::clone(&state.kv), doc).await {
            Ok(()) => {
                state.store.write().await.ack_flushed(key, revision);
                written += 1;
            }
            Err(e) => {
                error!(error = %e, key, "persistence flush failed");
            }
        }
    }

    if written > 0 {
        debug!(written, "store flushed");
    }
    written
}

async fn write_document(kv: Arc<dyn KeyValueStore>, doc: DirtyDocument) -> Result<(), String> {
    tokio::task::spawn_blocking(move || kv.set(doc.key, &doc.body))
        .await
        .map_err(|e| format!("flush task panicked: {e}"))?
        .map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
