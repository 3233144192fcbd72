//! # skywatch-settings
//!
//! Configuration management with layered sources for the Skywatch client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`SkywatchSettings::default()`]
//! 2. **User file** — `~/.skywatch/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `SKYWATCH_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use skywatch_settings::get_settings;
//!
//! let settings = get_settings();
//! println!("location channel: {}", settings.realtime.location_url);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    data_dir, deep_merge, load_settings, load_settings_from_path, settings_path,
};
pub use types::{LocationSettings, RealtimeSettings, SkywatchSettings};

use std::sync::OnceLock;

/// Global settings singleton.
///
/// Initialized on first access via [`get_settings`]. The settings are loaded
/// from `~/.skywatch/settings.json` with env var overrides, or fall back to
/// compiled defaults if loading fails.
static SETTINGS: OnceLock<SkywatchSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.skywatch/settings.json` with env
/// var overrides. On subsequent calls, returns the cached value. If loading
/// fails, returns compiled defaults.
pub fn get_settings() -> &'static SkywatchSettings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

/// Initialize the global settings with a specific value.
///
/// # Errors
///
/// Returns the provided settings back if the global was already initialized.
pub fn init_settings(settings: SkywatchSettings) -> std::result::Result<(), SkywatchSettings> {
    SETTINGS.set(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
