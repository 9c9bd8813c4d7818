//! Settings of a [`ConnectionStats`](crate::ConnectionStats).

use crate::error::Result;
use serde::Deserialize;
use std::time::Duration;

pub(crate) const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(1);

/// Settings of a [`ConnectionStats`](crate::ConnectionStats).
///
/// Can be built with [`RTCStatsConfigurationBuilder`] or loaded from JSON:
///
/// ```
/// use rtc_stats::RTCStatsConfiguration;
/// use std::time::Duration;
///
/// let config = RTCStatsConfiguration::from_json(
///     r#"{"evictStaleEntries": false, "pollingIntervalMs": 2000}"#,
/// )
/// .unwrap();
/// assert!(!config.evict_stale_entries());
/// assert_eq!(config.polling_interval(), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RTCStatsConfiguration {
    /// Drop the state of streams and candidate pairs missing from a snapshot.
    pub(crate) evict_stale_entries: bool,

    /// Expected time between two snapshots. Zero means the default.
    #[serde(rename = "pollingIntervalMs", deserialize_with = "duration_millis::deserialize")]
    pub(crate) polling_interval: Duration,
}

impl Default for RTCStatsConfiguration {
    fn default() -> Self {
        RTCStatsConfiguration {
            evict_stale_entries: true,
            polling_interval: DEFAULT_POLLING_INTERVAL,
        }
    }
}

impl RTCStatsConfiguration {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn evict_stale_entries(&self) -> bool {
        self.evict_stale_entries
    }

    pub fn polling_interval(&self) -> Duration {
        self.polling_interval
    }
}

#[derive(Default, Debug, Clone)]
pub struct RTCStatsConfigurationBuilder {
    evict_stale_entries: Option<bool>,
    polling_interval: Option<Duration>,
}

impl RTCStatsConfigurationBuilder {
    pub fn new() -> Self {
        RTCStatsConfigurationBuilder::default()
    }

    /// Keeps the state of ids that disappear from snapshots when `false`.
    pub fn with_evict_stale_entries(mut self, evict_stale_entries: bool) -> Self {
        self.evict_stale_entries = Some(evict_stale_entries);
        self
    }

    /// A zero interval falls back to the default of one second.
    pub fn with_polling_interval(mut self, polling_interval: Duration) -> Self {
        self.polling_interval = Some(polling_interval).filter(|interval| !interval.is_zero());
        self
    }

    pub fn build(self) -> RTCStatsConfiguration {
        let default = RTCStatsConfiguration::default();
        RTCStatsConfiguration {
            evict_stale_entries: self
                .evict_stale_entries
                .unwrap_or(default.evict_stale_entries),
            polling_interval: self.polling_interval.unwrap_or(default.polling_interval),
        }
    }
}

mod duration_millis {
    use super::DEFAULT_POLLING_INTERVAL;
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        if millis == 0 {
            Ok(DEFAULT_POLLING_INTERVAL)
        } else {
            Ok(Duration::from_millis(millis))
        }
    }
}
