use std::time::Duration;

use glossa_types::PopupPosition;
use serde::{Deserialize, Serialize};

pub mod env;
pub mod error;

pub use error::ConfigError;

/// Upper bound for `animation_duration`, anything longer reads as a typo
pub const MAX_ANIMATION_MS: u64 = 10_000;

fn default_data_url() -> String {
    "glossary.json".to_string()
}

fn default_highlight_color() -> String {
    "#0066cc".to_string()
}

fn default_animation_duration() -> u64 {
    300
}

fn default_mobile_breakpoint() -> u32 {
    768
}

fn default_enabled() -> bool {
    true
}

fn default_hover_grace_ms() -> u64 {
    300
}

fn default_scan_debounce_ms() -> u64 {
    100
}

fn default_resize_debounce_ms() -> u64 {
    150
}

fn default_announcement_ms() -> u64 {
    1000
}

fn default_instance_prefix() -> String {
    "glossa".to_string()
}

/// Widget configuration.
///
/// Keys are camelCase in JSON and unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Where the glossary JSON lives (http(s) URL or file path)
    #[serde(default = "default_data_url")]
    pub data_url: String,
    /// Marker and popup accent color
    #[serde(default = "default_highlight_color")]
    pub highlight_color: String,
    pub popup_position: PopupPosition,
    /// CSS transition length and deferred popup removal, in ms
    #[serde(default = "default_animation_duration")]
    pub animation_duration: u64,
    /// Viewport width (px) below which the compact popup layout applies
    #[serde(default = "default_mobile_breakpoint")]
    pub mobile_breakpoint: u32,
    /// Default case sensitivity, terms may override
    pub case_sensitive: bool,
    pub exclude_selectors: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enable_keyboard: bool,
    #[serde(default = "default_enabled")]
    pub enable_touch: bool,
    #[serde(default = "default_enabled")]
    pub enable_hover: bool,
    #[serde(default = "default_enabled")]
    pub enable_click: bool,
    pub debug_mode: bool,
    /// Time the pointer gets to travel from a marker onto its popup
    #[serde(default = "default_hover_grace_ms")]
    pub hover_grace_ms: u64,
    #[serde(default = "default_scan_debounce_ms")]
    pub scan_debounce_ms: u64,
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
    /// Lifetime of the screen reader live region
    #[serde(default = "default_announcement_ms")]
    pub announcement_ms: u64,
    #[serde(default = "default_instance_prefix")]
    pub instance_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_url: default_data_url(),
            highlight_color: default_highlight_color(),
            popup_position: PopupPosition::default(),
            animation_duration: default_animation_duration(),
            mobile_breakpoint: default_mobile_breakpoint(),
            case_sensitive: false,
            exclude_selectors: vec![],
            enable_keyboard: default_enabled(),
            enable_touch: default_enabled(),
            enable_hover: default_enabled(),
            enable_click: default_enabled(),
            debug_mode: false,
            hover_grace_ms: default_hover_grace_ms(),
            scan_debounce_ms: default_scan_debounce_ms(),
            resize_debounce_ms: default_resize_debounce_ms(),
            announcement_ms: default_announcement_ms(),
            instance_prefix: default_instance_prefix(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration object
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "dataUrl",
                reason: "must not be empty".to_string(),
            });
        }

        if self.highlight_color.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "highlightColor",
                reason: "must not be empty".to_string(),
            });
        }

        if self.animation_duration > MAX_ANIMATION_MS {
            return Err(ConfigError::Invalid {
                field: "animationDuration",
                reason: format!("{} exceeds {MAX_ANIMATION_MS}ms", self.animation_duration),
            });
        }

        if self.mobile_breakpoint == 0 {
            return Err(ConfigError::Invalid {
                field: "mobileBreakpoint",
                reason: "must be positive".to_string(),
            });
        }

        if self.instance_prefix.is_empty()
            || !self
                .instance_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Invalid {
                field: "instancePrefix",
                reason: format!("'{}' is not a valid class prefix", self.instance_prefix),
            });
        }

        Ok(())
    }

    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_duration)
    }

    pub fn hover_grace(&self) -> Duration {
        Duration::from_millis(self.hover_grace_ms)
    }

    pub fn scan_debounce(&self) -> Duration {
        Duration::from_millis(self.scan_debounce_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn announcement(&self) -> Duration {
        Duration::from_millis(self.announcement_ms)
    }
}
