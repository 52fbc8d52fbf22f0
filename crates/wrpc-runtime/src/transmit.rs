//! Concurrent delivery of deferred results on indexed sub-streams.

use std::sync::OnceLock;
use std::thread;

use tracing::{debug, trace, warn};
use wrpc_codec::PendingWrite;
use wrpc_transport::IndexWrite;

use crate::error::{InvokeError, Result};

/// Run every pending write against `w.index(write.index)`.
///
/// All sub-streams are derived before any write starts; an indexing failure
/// aborts with nothing written. The writes then run on one scoped thread
/// each and are joined before returning. When several fail only the first
/// recorded failure is returned.
pub fn transmit(w: &dyn IndexWrite, pending: Vec<PendingWrite>) -> Result<()> {
    let mut tasks = Vec::with_capacity(pending.len());
    for PendingWrite { index, write } in pending {
        trace!(index, "indexing result writer");
        let sub = w
            .index(index)
            .map_err(|source| InvokeError::Index { index, source })?;
        tasks.push((index, sub, write));
    }

    debug!(count = tasks.len(), "writing deferred results");
    let failure = OnceLock::new();
    thread::scope(|s| {
        for (index, sub, write) in tasks {
            let failure = &failure;
            s.spawn(move || {
                trace!(index, "writing deferred result");
                if let Err(source) = write.run(sub) {
                    warn!(index, error = %source, "deferred result write failed");
                    // Later failures are dropped.
                    let _ = failure.set(InvokeError::Deferred { index, source });
                }
            });
        }
    });

    match failure.into_inner() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
