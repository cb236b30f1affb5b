//! Adaptive collection threshold
//!
//! Negative feedback on collection frequency: cycles that follow each other
//! within the spacing window raise the threshold (collect less often),
//! well-spaced cycles lower it (collect sooner). The result is clamped to
//! the configured bounds, except that it never drops below the bytes still
//! live after the cycle scaled by the growth factor. Otherwise a live set
//! larger than the ceiling would trigger a cycle on every allocation.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::heap::HeapConfig;
use crate::logging::log_threshold_adjusted;

/// Time source for the threshold heuristic
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic tests and replays
///
/// Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Instant {
        self.now.get()
    }
}

pub struct Threshold {
    current: usize,
    min: usize,
    max: usize,
    spacing: Duration,
    grow: f64,
    shrink: f64,
    last: Instant,
    clock: Box<dyn Clock>,
}

impl Threshold {
    pub fn new(config: &HeapConfig, clock: Box<dyn Clock>) -> Self {
        let last = clock.now();
        let min = config.min_threshold.min(config.max_threshold);
        let max = config.max_threshold.max(config.min_threshold);

        Self {
            current: config.initial_threshold.clamp(min, max),
            min,
            max,
            spacing: config.spacing,
            grow: config.grow_factor,
            shrink: config.shrink_factor,
            last,
            clock,
        }
    }

    /// Current trigger in bytes
    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn exceeded_by(&self, bytes_in_use: usize) -> bool {
        bytes_in_use > self.current
    }

    /// Recompute after a triggered collection and return the new trigger
    ///
    /// `live_bytes` is what the cycle left in use; the trigger stays above it.
    pub fn adjust(&mut self, live_bytes: usize) -> usize {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.last);
        let previous = self.current;

        let scaled = if elapsed < self.spacing {
            previous as f64 * self.grow
        } else {
            previous as f64 / self.shrink
        };

        let floor = (live_bytes as f64 * self.grow) as usize;
        self.current = (scaled as usize).clamp(self.min, self.max).max(floor);
        self.last = now;

        log_threshold_adjusted(previous, self.current, elapsed.as_millis());
        self.current
    }
}
