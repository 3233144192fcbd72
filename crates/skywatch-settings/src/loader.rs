//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`SkywatchSettings::default()`]
//! 2. If `~/.skywatch/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::SkywatchSettings;

/// Resolve the data directory (`$SKYWATCH_DATA_DIR` or `~/.skywatch`).
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SKYWATCH_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".skywatch")
}

/// Resolve the path to the settings file (`<data dir>/settings.json`).
pub fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<SkywatchSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<SkywatchSettings> {
    let defaults = serde_json::to_value(SkywatchSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: SkywatchSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Each env var has strict parsing rules: integers must be valid and within
/// the specified range; invalid values are silently ignored (fall back to
/// file/default).
pub fn apply_env_overrides(settings: &mut SkywatchSettings) {
    // ── Realtime settings ───────────────────────────────────────────
    if let Some(v) = read_env_string("SKYWATCH_LOCATION_URL") {
        settings.realtime.location_url = v;
    }
    if let Some(v) = read_env_string("SKYWATCH_CHAT_URL") {
        settings.realtime.chat_url = v;
    }
    if let Some(v) = read_env_u64("SKYWATCH_BASE_DELAY_MS", 1, 600_000) {
        settings.realtime.reconnect.base_delay_ms = v;
    }
    if let Some(v) = read_env_u32("SKYWATCH_MAX_RECONNECT_ATTEMPTS", 1, 100) {
        settings.realtime.reconnect.max_attempts = v;
    }
    if let Some(v) = read_env_u64("SKYWATCH_SAMPLE_INTERVAL_SECS", 1, 3600) {
        settings.realtime.sample_interval_secs = v;
    }
    if let Some(v) = read_env_usize("SKYWATCH_SEND_QUEUE_DEPTH", 1, 65_536) {
        settings.realtime.send_queue_depth = v;
    }

    // ── Location settings ───────────────────────────────────────────
    if let Some(v) = read_env_string("SKYWATCH_DEFAULT_VISIBILITY") {
        if let Ok(visibility) = serde_json::from_value(Value::String(v)) {
            settings.location.default_visibility = visibility;
        }
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u64` within `[min, max]`.
pub fn parse_u64_in_range(val: &str, min: u64, max: u64) -> Option<u64> {
    val.trim()
        .parse::<u64>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

/// Parse a string as a `u32` within `[min, max]`.
pub fn parse_u32_in_range(val: &str, min: u32, max: u32) -> Option<u32> {
    val.trim()
        .parse::<u32>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

/// Parse a string as a `usize` within `[min, max]`.
pub fn parse_usize_in_range(val: &str, min: usize, max: usize) -> Option<usize> {
    val.trim()
        .parse::<usize>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_u64_in_range(&v, min, max))
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_u32_in_range(&v, min, max))
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_usize_in_range(&v, min, max))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
