use std::path::PathBuf;
use std::time::Duration;

use crate::engine::DEFAULT_KENNEL_CAPACITY;

pub const JOURNAL_FILE: &str = "bookings.journal";
pub const FREE_SPACE_FILE: &str = "freeSpace.txt";

/// Daemon settings, read from `KENNEL_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KennelConfig {
    pub data_dir: PathBuf,
    pub capacity: u32,
    pub compact_threshold: u64,
    pub publish_interval: Duration,
    pub metrics_port: Option<u16>,
}

impl Default for KennelConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            capacity: DEFAULT_KENNEL_CAPACITY,
            compact_threshold: 1000,
            publish_interval: Duration::from_secs(60),
            metrics_port: None,
        }
    }
}

impl KennelConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset or unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        Self {
            data_dir: lookup("KENNEL_DATA_DIR").map_or(defaults.data_dir, PathBuf::from),
            capacity: parsed("KENNEL_CAPACITY")
                .and_then(|n| u32::try_from(n).ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.capacity),
            compact_threshold: parsed("KENNEL_COMPACT_THRESHOLD").unwrap_or(defaults.compact_threshold),
            publish_interval: parsed("KENNEL_PUBLISH_INTERVAL_SECS")
                .filter(|&s| s > 0)
                .map_or(defaults.publish_interval, Duration::from_secs),
            metrics_port: parsed("KENNEL_METRICS_PORT").and_then(|p| u16::try_from(p).ok()),
        }
    }

    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join(JOURNAL_FILE)
    }

    pub fn free_space_path(&self) -> PathBuf {
        self.data_dir.join(FREE_SPACE_FILE)
    }
}
