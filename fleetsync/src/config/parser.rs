//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;

use super::defaults::{MAX_ANIMATION_DURATION_MS, MAX_FRAME_RATE};
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [stream] section
    if let Some(section) = ini.section(Some("stream")) {
        if let Some(v) = section.get("url") {
            config.stream.url = parse_url("stream", "url", v, &["ws://", "wss://"])?;
        }
        if let Some(v) = section.get("identity_property") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("stream", "identity_property", v, "must not be empty"));
            }
            config.stream.identity_property = v.to_string();
        }
    }

    // [reconnect] section
    if let Some(section) = ini.section(Some("reconnect")) {
        if let Some(v) = section.get("delay_ms") {
            config.reconnect.delay_ms =
                parse_number("reconnect", "delay_ms", v, "must be a non-negative integer (milliseconds)")?;
        }
        if let Some(v) = section.get("max_attempts") {
            config.reconnect.max_attempts =
                parse_number("reconnect", "max_attempts", v, "must be a non-negative integer")?;
        }
    }

    // [animation] section
    if let Some(section) = ini.section(Some("animation")) {
        if let Some(v) = section.get("duration_ms") {
            let reason = format!("must be an integer from 0 to {} (milliseconds)", MAX_ANIMATION_DURATION_MS);
            let duration_ms: u64 = parse_number("animation", "duration_ms", v, &reason)?;
            if duration_ms > MAX_ANIMATION_DURATION_MS {
                return Err(invalid("animation", "duration_ms", v, &reason));
            }
            config.animation.duration_ms = duration_ms;
        }
        if let Some(v) = section.get("frame_rate") {
            let reason = format!("must be an integer from 0 to {} (frames per second)", MAX_FRAME_RATE);
            let frame_rate: u32 = parse_number("animation", "frame_rate", v, &reason)?;
            if frame_rate > MAX_FRAME_RATE {
                return Err(invalid("animation", "frame_rate", v, &reason));
            }
            config.animation.frame_rate = frame_rate;
        }
        if let Some(v) = section.get("policy") {
            config.animation.policy = v
                .parse()
                .map_err(|_| invalid("animation", "policy", v, "must be 'replace' or 'overlap'"))?;
        }
    }

    // [reference] section
    if let Some(section) = ini.section(Some("reference")) {
        if let Some(v) = section.get("url") {
            config.reference.url = parse_url("reference", "url", v, &["http://", "https://"])?;
        }
        if let Some(v) = section.get("timeout") {
            let timeout: u64 =
                parse_number("reference", "timeout", v, "must be a positive integer (seconds)")?;
            if timeout == 0 {
                return Err(invalid("reference", "timeout", v, "must be a positive integer (seconds)"));
            }
            config.reference.timeout = timeout;
        }
    }

    // [simulation] section
    if let Some(section) = ini.section(Some("simulation")) {
        if let Some(v) = section.get("url") {
            config.simulation.url = parse_url("simulation", "url", v, &["http://", "https://"])?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_url(
    section: &str,
    key: &str,
    value: &str,
    schemes: &[&str],
) -> Result<String, ConfigFileError> {
    let v = value.trim();
    if !schemes.iter().any(|s| v.starts_with(s)) || schemes.iter().any(|s| v == *s) {
        return Err(invalid(
            section,
            key,
            value,
            &format!("must be a URL starting with {}", schemes.join(" or ")),
        ));
    }
    Ok(v.to_string())
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use crate::config::settings::ConfigFile;
    use crate::feed::AnimationPolicy;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_partial_config() {
        let config = load(
            r#"
[stream]
url = wss://fleet.example.com/ws

[animation]
policy = overlap
"#,
        )
        .unwrap();

        assert_eq!(config.stream.url, "wss://fleet.example.com/ws");
        assert_eq!(config.stream.identity_property, "vehicleCode");
        assert_eq!(config.animation.policy, AnimationPolicy::Overlap);
        assert_eq!(config.animation.frame_rate, DEFAULT_FRAME_RATE);
        assert_eq!(config.reconnect.max_attempts, 5);
    }

    #[test]
    fn test_invalid_stream_url() {
        let err = load("[stream]\nurl = http://localhost:4567/ws\n").unwrap_err();
        assert!(err.to_string().contains("stream.url"));
        assert!(err.to_string().contains("ws://"));
    }

    #[test]
    fn test_invalid_reconnect_delay() {
        let err = load("[reconnect]\ndelay_ms = soon\n").unwrap_err();
        match err {
            ConfigFileError::InvalidValue {
                section,
                key,
                value,
                ..
            } => {
                assert_eq!(section, "reconnect");
                assert_eq!(key, "delay_ms");
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_invalid_policy() {
        let err = load("[animation]\npolicy = queue\n").unwrap_err();
        assert!(err.to_string().contains("'replace' or 'overlap'"));
    }

    #[test]
    fn test_animation_duration_out_of_range() {
        let err = load("[animation]\nduration_ms = 4294967296000\n").unwrap_err();
        assert!(err.to_string().contains("animation.duration_ms"));

        let config = load("[animation]\nduration_ms = 60000\n").unwrap();
        assert_eq!(config.animation.duration_ms, MAX_ANIMATION_DURATION_MS);
    }

    #[test]
    fn test_animation_frame_rate_out_of_range() {
        let err = load("[animation]\nframe_rate = 4000000000\n").unwrap_err();
        assert!(err.to_string().contains("animation.frame_rate"));

        // Larger than u32 fails the number parse with the same message.
        let err = load("[animation]\nframe_rate = 99999999999\n").unwrap_err();
        assert!(err.to_string().contains("animation.frame_rate"));
    }

    #[test]
    fn test_animation_bounds_give_usable_interval() {
        let config = load("[animation]\nduration_ms = 60000\nframe_rate = 1000\n").unwrap();
        let animation = config.sync_config().animation;
        assert_eq!(animation.frame_count, 60_000);
        assert_eq!(animation.frame_interval(), std::time::Duration::from_millis(1));
    }

    #[test]
    fn test_zero_reference_timeout_rejected() {
        assert!(load("[reference]\ntimeout = 0\n").is_err());
    }

    #[test]
    fn test_empty_identity_rejected() {
        assert!(load("[stream]\nidentity_property =\n").is_err());
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("test/path"));
        }

        // Non-tilde paths should be unchanged
        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }
}
