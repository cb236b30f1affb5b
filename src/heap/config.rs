//! Heap configuration
//!
//! Defaults keep the first collection threshold deliberately low so that
//! cycles happen often and are easy to observe.

use std::time::Duration;

use crate::allocator::DEFAULT_BLOCK_BYTES;

/// First collection trigger, in arena bytes
pub const INITIAL_THRESHOLD: usize = 2024 * 2;
/// Lowest value the adaptive threshold may shrink to
pub const MIN_THRESHOLD: usize = 1024;
/// Highest value the adaptive threshold may grow to
pub const MAX_THRESHOLD: usize = 256 * 1024 * 1024;
/// Collections closer together than this are considered too frequent
pub const COLLECT_SPACING: Duration = Duration::from_millis(100);
pub const GROW_FACTOR: f64 = 1.5;
pub const SHRINK_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, PartialEq)]
pub struct HeapConfig {
    /// Bytes per arena block
    pub block_bytes: usize,
    pub initial_threshold: usize,
    pub min_threshold: usize,
    pub max_threshold: usize,
    pub spacing: Duration,
    pub grow_factor: f64,
    pub shrink_factor: f64,
    /// Collect automatically when arena usage crosses the threshold
    pub auto_collect: bool,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            block_bytes: DEFAULT_BLOCK_BYTES,
            initial_threshold: INITIAL_THRESHOLD,
            min_threshold: MIN_THRESHOLD,
            max_threshold: MAX_THRESHOLD,
            spacing: COLLECT_SPACING,
            grow_factor: GROW_FACTOR,
            shrink_factor: SHRINK_FACTOR,
            auto_collect: true,
        }
    }
}

impl HeapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // SCOPEGC_BLOCK_BYTES: arena block size
        if let Some(bytes) = env_parse::<usize>("SCOPEGC_BLOCK_BYTES") {
            config.block_bytes = bytes;
        }

        // SCOPEGC_THRESHOLD: initial collection trigger in bytes
        if let Some(threshold) = env_parse::<usize>("SCOPEGC_THRESHOLD") {
            config.initial_threshold = threshold;
        }

        // SCOPEGC_AUTO_COLLECT: 0/false disables allocation-triggered collection
        if let Ok(val) = std::env::var("SCOPEGC_AUTO_COLLECT") {
            config.auto_collect = !(val == "0" || val.eq_ignore_ascii_case("false"));
        }

        config
    }

    pub fn with_block_bytes(mut self, bytes: usize) -> Self {
        self.block_bytes = bytes;
        self
    }

    pub fn with_initial_threshold(mut self, threshold: usize) -> Self {
        self.initial_threshold = threshold;
        self
    }

    pub fn with_threshold_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_threshold = min.min(max);
        self.max_threshold = max.max(min);
        self
    }

    pub fn with_spacing(mut self, spacing: Duration) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_auto_collect(mut self, enabled: bool) -> Self {
        self.auto_collect = enabled;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HeapConfig::default();
        assert_eq!(config.initial_threshold, 4048);
        assert_eq!(config.block_bytes, 1024 * 1024);
        assert_eq!(config.spacing, Duration::from_millis(100));
        assert!(config.auto_collect);
    }

    #[test]
    fn test_bounds_are_ordered() {
        let config = HeapConfig::new().with_threshold_bounds(5000, 100);
        assert_eq!(config.min_threshold, 100);
        assert_eq!(config.max_threshold, 5000);
    }
}
