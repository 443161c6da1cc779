//! Runtime configuration of the sync core.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::connection::{ReconnectPolicy, DEFAULT_STREAM_URL};
use super::validator::DEFAULT_IDENTITY_PROPERTY;

/// Default length of one animation run.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(1000);

/// Default number of interpolation steps per run (60 frames per second).
pub const DEFAULT_FRAME_COUNT: usize = 60;

/// Default capacity of the consumer event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// What happens when a snapshot arrives while frames are still animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationPolicy {
    /// Stop the running animation and start the new one from the last
    /// published frame.
    #[default]
    Replace,

    /// Let runs continue independently; their frames may interleave.
    Overlap,
}

impl fmt::Display for AnimationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Overlap => write!(f, "overlap"),
        }
    }
}

impl FromStr for AnimationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "overlap" => Ok(Self::Overlap),
            other => Err(format!("unknown animation policy '{}'", other)),
        }
    }
}

/// Animation pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationConfig {
    /// Time from the first to the last frame of a run.
    pub duration: Duration,

    /// Interpolation steps per run; a run publishes `frame_count + 1` frames.
    pub frame_count: usize,

    /// Overlapping-run behaviour.
    pub policy: AnimationPolicy,
}

impl AnimationConfig {
    /// Delay between consecutive frames. Zero means "publish at once".
    pub fn frame_interval(&self) -> Duration {
        if self.frame_count == 0 {
            return Duration::ZERO;
        }
        match u32::try_from(self.frame_count) {
            Ok(count) => self.duration / count,
            Err(_) => self.duration.div_f64(self.frame_count as f64),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_ANIMATION_DURATION,
            frame_count: DEFAULT_FRAME_COUNT,
            policy: AnimationPolicy::default(),
        }
    }
}

/// Everything [`super::SyncContext`] needs to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Streaming endpoint.
    pub stream_url: String,

    /// Property holding each entity's identity.
    pub identity_property: String,

    /// Reconnect behaviour.
    pub reconnect: ReconnectPolicy,

    /// Frame pacing.
    pub animation: AnimationConfig,

    /// Capacity of the consumer broadcast channel.
    pub event_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            stream_url: DEFAULT_STREAM_URL.to_string(),
            identity_property: DEFAULT_IDENTITY_PROPERTY.to_string(),
            reconnect: ReconnectPolicy::default(),
            animation: AnimationConfig::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interval_default() {
        let config = AnimationConfig::default();
        let interval = config.frame_interval();
        assert!(interval > Duration::from_micros(16_600));
        assert!(interval < Duration::from_micros(16_700));
    }

    #[test]
    fn test_frame_interval_zero_frames() {
        let config = AnimationConfig {
            frame_count: 0,
            ..Default::default()
        };
        assert_eq!(config.frame_interval(), Duration::ZERO);
    }

    #[test]
    fn test_frame_interval_beyond_u32_frames() {
        let config = AnimationConfig {
            duration: Duration::from_secs(4_294_967_296),
            frame_count: u32::MAX as usize + 1,
            ..Default::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("replace".parse(), Ok(AnimationPolicy::Replace));
        assert_eq!(" Overlap ".parse(), Ok(AnimationPolicy::Overlap));
        assert!("queue".parse::<AnimationPolicy>().is_err());
        assert_eq!(AnimationPolicy::Overlap.to_string(), "overlap");
    }

    #[test]
    fn test_sync_config_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.stream_url, "ws://localhost:4567/ws");
        assert_eq!(config.identity_property, "vehicleCode");
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.animation.frame_count, 60);
    }
}
