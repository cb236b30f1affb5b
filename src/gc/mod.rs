//! Garbage collector - stop-the-world mark and sweep
//!
//! Design: Runs synchronously inside the call that triggers it:
//! 1. Mark: breadth-first from the root set, marks everything reachable
//! 2. Sweep: single pass over the registry, reclaims everything unmarked
//! 3. Threshold: allocation-triggered cycles re-tune the next trigger
//!
//! No allocation happens during a cycle and neither phase can fail.

mod mark;
mod roots;
mod sweep;
mod threshold;

#[cfg(test)]
mod tests;

pub use roots::RootSet;
pub use threshold::{Clock, ManualClock, SystemClock, Threshold};

pub(crate) use sweep::destroy;

use std::time::{Duration, Instant};

use crate::heap::Heap;
use crate::logging::{debug, log_gc_complete, log_gc_mark, log_gc_start, log_gc_sweep, warn};

/// Cycles slower than this are reported
const SLOW_COLLECTION: Duration = Duration::from_millis(10);

/// Result of one collection cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionReport {
    /// Objects found reachable
    pub marked: usize,
    pub reclaimed: usize,
    pub bytes_reclaimed: usize,
    /// Foreign pointers handed to the finalizer
    pub finalized: usize,
    pub duration: Duration,
}

/// Cumulative collector statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcStats {
    pub collections_run: usize,
    pub objects_reclaimed: usize,
    pub bytes_reclaimed: usize,
    pub finalizers_run: usize,
    pub last_marked: usize,
    /// Current allocation trigger in bytes
    pub threshold: usize,
}

impl Heap {
    /// Run a full mark and sweep cycle
    ///
    /// Safe to call at any time, including with no objects or no roots.
    pub fn collect(&mut self) -> CollectionReport {
        if self.registry.is_empty() {
            debug!("Nothing to collect");
            return CollectionReport::default();
        }

        let start = Instant::now();
        log_gc_start(self.registry.len(), self.roots.len());

        let marked = mark::mark(&mut self.allocator, &self.roots);
        log_gc_mark(marked);

        let outcome = sweep::sweep(&mut self.allocator, &mut self.registry, &mut self.finalizer);
        log_gc_sweep(outcome.reclaimed, outcome.bytes, outcome.finalized);

        let duration = start.elapsed();
        self.gc_stats.collections_run += 1;
        self.gc_stats.objects_reclaimed += outcome.reclaimed;
        self.gc_stats.bytes_reclaimed += outcome.bytes;
        self.gc_stats.finalizers_run += outcome.finalized;
        self.gc_stats.last_marked = marked;

        log_gc_complete(duration.as_micros() as u64, outcome.reclaimed, self.registry.len());
        if duration > SLOW_COLLECTION {
            warn!(
                duration_ms = duration.as_millis() as u64,
                live_objects = self.registry.len(),
                "GC collection took significant time"
            );
        }

        CollectionReport {
            marked,
            reclaimed: outcome.reclaimed,
            bytes_reclaimed: outcome.bytes,
            finalized: outcome.finalized,
            duration,
        }
    }

    /// Collect if arena usage is over the threshold, then re-tune it
    pub(crate) fn maybe_collect(&mut self) {
        let bytes_in_use = self.allocator.bytes_in_use();
        if !self.threshold.exceeded_by(bytes_in_use) {
            return;
        }

        debug!(
            bytes_in_use,
            threshold = self.threshold.current(),
            "GC threshold exceeded, starting collection"
        );

        self.collect();
        self.threshold.adjust(self.allocator.bytes_in_use());
    }
}
