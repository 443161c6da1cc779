//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[stream]
; WebSocket endpoint delivering position snapshots (ws:// or wss://)
url = {}
; Feature property that identifies each entity across snapshots
identity_property = {}

[reconnect]
; Delay in milliseconds before each reconnect attempt (default: 3000)
delay_ms = {}
; Reconnect attempts before giving up (default: 5)
; The counter resets after every successful connection
max_attempts = {}

[animation]
; Time in milliseconds to move entities from one snapshot to the next (default: 1000)
duration_ms = {}
; Frames per second while animating (default: 60)
frame_rate = {}
; What to do when a snapshot arrives while the previous one is still animating:
;   replace - stop the running animation and continue from the current frame (default)
;   overlap - let both animations run; frames may interleave
policy = {}

[reference]
; Endpoint serving reference locations (warehouses, offices)
url = {}
; HTTP timeout in seconds (default: 10)
timeout = {}

[simulation]
; Base URL of the simulation control server
url = {}

[logging]
; Log file path (cleared at the start of each session)
file = {}
"#,
        config.stream.url,
        config.stream.identity_property,
        config.reconnect.delay_ms,
        config.reconnect.max_attempts,
        config.animation.duration_ms,
        config.animation.frame_rate,
        config.animation.policy,
        config.reference.url,
        config.reference.timeout,
        config.simulation.url,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
