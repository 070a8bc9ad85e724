//! Configuration for the SDK
//!
//! [`SdkConfig`] controls parse requests, "play and wait", sub-item
//! sequencing and the event managers created for every wrapper. It can be
//! built in code, from one of the presets, or loaded from a JSON file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use media_event_manager::EventManagerConfig;
use media_native::ParseFlags;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_DIR: &str = "media-sdk";
const CONFIG_FILE: &str = "config.json";

/// Configuration shared by every wrapper a factory creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Options applied to every media the factory creates, and the initial
    /// standing options of each player's sub-item sequencer
    /// Default: empty
    pub default_media_options: Vec<String>,

    /// Timeout passed to the engine for parse requests; `None` lets the
    /// engine decide
    /// Default: None
    #[serde(with = "millis_opt")]
    pub parse_timeout: Option<Duration>,

    /// Flags used by `parsing.parse()`
    /// Default: local only
    pub parse_flags: ParseFlags,

    /// How long "play and wait" waits for the first playing or error event
    /// Default: 5 seconds
    #[serde(with = "millis")]
    pub start_timeout: Duration,

    /// Advance to the next sub-item when one finishes
    /// Default: true
    pub auto_play_sub_items: bool,

    /// Wrap to the first sub-item after the last one
    /// Default: false
    pub repeat_sub_items: bool,

    /// Settings for the per-resource event managers
    pub event_manager: EventSettings,
}

/// Serializable view of [`EventManagerConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Default: "media-events"
    pub thread_name: String,
    /// Default: None (unbounded)
    pub queue_capacity: Option<usize>,
}

impl Default for EventSettings {
    fn default() -> Self {
        let defaults = EventManagerConfig::default();
        Self {
            thread_name: defaults.thread_name,
            queue_capacity: defaults.queue_capacity,
        }
    }
}

impl From<&EventSettings> for EventManagerConfig {
    fn from(settings: &EventSettings) -> Self {
        EventManagerConfig {
            thread_name: settings.thread_name.clone(),
            queue_capacity: settings.queue_capacity,
        }
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            default_media_options: Vec::new(),
            parse_timeout: None,
            parse_flags: ParseFlags::LOCAL,
            start_timeout: Duration::from_secs(5),
            auto_play_sub_items: true,
            repeat_sub_items: false,
            event_manager: EventSettings::default(),
        }
    }
}

impl SdkConfig {
    /// Create a new SdkConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Short start wait and bounded event queues, for interactive front ends
    /// that would rather miss a progress event than stall
    pub fn strict_start() -> Self {
        Self {
            start_timeout: Duration::from_secs(2),
            parse_timeout: Some(Duration::from_secs(10)),
            event_manager: EventSettings {
                queue_capacity: Some(1024),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_timeout == Duration::ZERO {
            return Err(ConfigError::Invalid(
                "start timeout must be greater than 0".to_string(),
            ));
        }

        if self.parse_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid(
                "parse timeout must be greater than 0 when set".to_string(),
            ));
        }

        if let Some(option) = self
            .default_media_options
            .iter()
            .find(|o| o.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "default media option {:?} is blank",
                option
            )));
        }

        EventManagerConfig::from(&self.event_manager)
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SdkConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load the user's configuration file, or defaults when there is none
    ///
    /// Looks for `media-sdk/config.json` under the platform configuration
    /// directory. A file that exists but does not parse is an error.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub(crate) fn event_manager_config(&self) -> EventManagerConfig {
        EventManagerConfig::from(&self.event_manager)
    }

    pub fn with_default_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_media_options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }

    pub fn with_parse(mut self, flags: ParseFlags, timeout: Option<Duration>) -> Self {
        self.parse_flags = flags;
        self.parse_timeout = timeout;
        self
    }

    pub fn with_sub_items(mut self, auto_play: bool, repeat: bool) -> Self {
        self.auto_play_sub_items = auto_play;
        self.repeat_sub_items = repeat;
        self
    }
}

/// Timeout in the engine's convention, `-1` for "engine default"
pub(crate) fn timeout_ms(timeout: Option<Duration>) -> i32 {
    timeout.map_or(-1, |t| i32::try_from(t.as_millis()).unwrap_or(i32::MAX))
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod millis_opt {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|v| v.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SdkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.start_timeout, Duration::from_secs(5));
        assert!(config.auto_play_sub_items);
        assert!(!config.repeat_sub_items);
        assert_eq!(timeout_ms(config.parse_timeout), -1);
    }

    #[test]
    fn test_strict_start_preset() {
        let config = SdkConfig::strict_start();
        assert!(config.validate().is_ok());
        assert!(config.start_timeout < SdkConfig::default().start_timeout);
        assert_eq!(config.event_manager_config().queue_capacity, Some(1024));
        assert_eq!(timeout_ms(config.parse_timeout), 10_000);
    }

    #[test]
    fn test_config_validation() {
        let config = SdkConfig::default().with_start_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = SdkConfig::default().with_parse(ParseFlags::NETWORK, Some(Duration::ZERO));
        assert!(config.validate().is_err());

        let config = SdkConfig::default().with_default_options([":no-video", " "]);
        assert!(config.validate().is_err());

        let mut config = SdkConfig::default();
        config.event_manager.queue_capacity = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = SdkConfig::from_json_str(
            r#"{ "start_timeout": 250, "repeat_sub_items": true, "event_manager": { "queue_capacity": 16 } }"#,
        )
        .unwrap();

        assert_eq!(config.start_timeout, Duration::from_millis(250));
        assert!(config.repeat_sub_items);
        assert!(config.auto_play_sub_items);
        assert_eq!(config.event_manager.thread_name, "media-events");
        assert_eq!(config.event_manager.queue_capacity, Some(16));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SdkConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SdkConfig::from_json_str(r#"{ "start_timeout": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_timeout_ms_saturates() {
        assert_eq!(timeout_ms(Some(Duration::from_millis(1500))), 1500);
        assert_eq!(timeout_ms(Some(Duration::from_secs(u64::MAX / 2))), i32::MAX);
        assert_eq!(timeout_ms(None), -1);
    }
}
