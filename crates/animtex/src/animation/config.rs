use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ENABLED_INTERVAL: bool = true;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_ENABLED_LOOP: bool = true;

/// Per-consumer playback options.
///
/// Deserializes from the camelCase shape hosts already use, e.g.
/// `{"url": "https://example.com/cat.gif", "interval": 50, "enabledLoop": false}`.
/// Everything but `url` is optional; `interval` is in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackConfig {
    pub url: String,

    /// Whether the clock advances on its own
    #[serde(default = "default_enabled_interval")]
    pub enabled_interval: bool,

    #[serde(default = "default_interval", with = "millis")]
    pub interval: Duration,

    /// Wrap past the last frame, or freeze on it
    #[serde(default = "default_enabled_loop")]
    pub enabled_loop: bool,
}

impl PlaybackConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            enabled_interval: DEFAULT_ENABLED_INTERVAL,
            interval: DEFAULT_INTERVAL,
            enabled_loop: DEFAULT_ENABLED_LOOP,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_interval_enabled(mut self, enabled: bool) -> Self {
        self.enabled_interval = enabled;
        self
    }

    pub fn with_loop(mut self, enabled: bool) -> Self {
        self.enabled_loop = enabled;
        self
    }
}

fn default_enabled_interval() -> bool {
    DEFAULT_ENABLED_INTERVAL
}

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn default_enabled_loop() -> bool {
    DEFAULT_ENABLED_LOOP
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
