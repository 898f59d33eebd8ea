use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    AT_BOTTOM_THRESHOLD_ROWS, BLUR_CHECK_DELAY_MS, CALL_PEEK_DELAY_MS, DEMO_HISTORY_LEN,
    DISCARD_FACTOR, INCOMING_INTERVAL_SECS, LOAD_LATENCY_MS, MARK_READ_THROTTLE_MS,
    MIN_ROW_HEIGHT, PAGE_SIZE, SCROLL_ACTIVITY_MS, SENTINEL_HEIGHT,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// Demo conversation served by the built-in store
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Scroll and visibility heuristics. None of these are hard invariants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineConfig {
    /// Rows from the content end that still count as "at bottom"
    #[serde(default = "default_at_bottom_threshold")]
    pub at_bottom_threshold: usize,
    /// Minimum rendered height of a message, used for the row capacity estimate
    #[serde(default = "default_min_row_height")]
    pub min_row_height: usize,
    /// Discard older messages once the list exceeds capacity times this factor
    #[serde(default = "default_discard_factor")]
    pub discard_factor: f64,
    #[serde(default = "default_mark_read_throttle_ms")]
    pub mark_read_throttle_ms: u64,
    #[serde(default = "default_call_peek_delay_ms")]
    pub call_peek_delay_ms: u64,
    #[serde(default = "default_scroll_activity_ms")]
    pub scroll_activity_ms: u64,
    #[serde(default = "default_blur_check_delay_ms")]
    pub blur_check_delay_ms: u64,
    /// Height of the at-bottom detector (0 = a single point at the content end)
    #[serde(default = "default_sentinel_height")]
    pub sentinel_height: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            at_bottom_threshold: default_at_bottom_threshold(),
            min_row_height: default_min_row_height(),
            discard_factor: default_discard_factor(),
            mark_read_throttle_ms: default_mark_read_throttle_ms(),
            call_peek_delay_ms: default_call_peek_delay_ms(),
            scroll_activity_ms: default_scroll_activity_ms(),
            blur_check_delay_ms: default_blur_check_delay_ms(),
            sentinel_height: default_sentinel_height(),
        }
    }
}

impl TimelineConfig {
    pub fn mark_read_throttle(&self) -> Duration {
        Duration::from_millis(self.mark_read_throttle_ms)
    }

    pub fn call_peek_delay(&self) -> Duration {
        Duration::from_millis(self.call_peek_delay_ms)
    }

    pub fn scroll_activity(&self) -> Duration {
        Duration::from_millis(self.scroll_activity_ms)
    }

    pub fn blur_check_delay(&self) -> Duration {
        Duration::from_millis(self.blur_check_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub keybinding_mode: KeybindingMode,
    #[serde(default)]
    pub theme: ThemeVariant,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            keybinding_mode: KeybindingMode::default(),
            theme: ThemeVariant::default(),
            date_format: default_date_format(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeybindingMode {
    #[default]
    Vim,
    Arrows,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeVariant {
    /// Catppuccin Mocha (true color)
    #[default]
    Modern,
    /// Terminal palette colors only
    Dark,
    HighContrast,
}

/// Which spoofing warning the demo conversation carries
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DemoWarning {
    #[default]
    None,
    DirectDuplicate,
    GroupCollision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    #[serde(default = "default_load_latency_ms")]
    pub load_latency_ms: u64,
    /// Seconds between simulated incoming messages (0 = disabled)
    #[serde(default = "default_incoming_interval_secs")]
    pub incoming_interval_secs: u64,
    /// Serve the demo conversation as a group
    #[serde(default = "default_true")]
    pub group: bool,
    /// Number of trailing messages that start out unread
    #[serde(default = "default_unread")]
    pub unread: usize,
    /// Present the conversation as an incoming message request
    #[serde(default)]
    pub message_request: bool,
    #[serde(default)]
    pub warning: DemoWarning,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            history_len: default_history_len(),
            load_latency_ms: default_load_latency_ms(),
            incoming_interval_secs: default_incoming_interval_secs(),
            group: true,
            unread: default_unread(),
            message_request: false,
            warning: DemoWarning::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_at_bottom_threshold() -> usize {
    AT_BOTTOM_THRESHOLD_ROWS
}

fn default_min_row_height() -> usize {
    MIN_ROW_HEIGHT
}

fn default_discard_factor() -> f64 {
    DISCARD_FACTOR
}

fn default_mark_read_throttle_ms() -> u64 {
    MARK_READ_THROTTLE_MS
}

fn default_call_peek_delay_ms() -> u64 {
    CALL_PEEK_DELAY_MS
}

fn default_scroll_activity_ms() -> u64 {
    SCROLL_ACTIVITY_MS
}

fn default_blur_check_delay_ms() -> u64 {
    BLUR_CHECK_DELAY_MS
}

fn default_sentinel_height() -> usize {
    SENTINEL_HEIGHT
}

fn default_date_format() -> String {
    "%b %d %H:%M".to_string()
}

fn default_page_size() -> usize {
    PAGE_SIZE
}

fn default_history_len() -> usize {
    DEMO_HISTORY_LEN
}

fn default_load_latency_ms() -> u64 {
    LOAD_LATENCY_MS
}

fn default_incoming_interval_secs() -> u64 {
    INCOMING_INTERVAL_SECS
}

fn default_unread() -> usize {
    12
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("convo");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the config file, falling back to defaults when none exists
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.timeline.min_row_height == 0 {
            anyhow::bail!("timeline.min_row_height must be at least 1");
        }
        if self.timeline.discard_factor.is_nan() || self.timeline.discard_factor < 1.0 {
            anyhow::bail!(
                "timeline.discard_factor must be >= 1.0 (got {})",
                self.timeline.discard_factor
            );
        }
        if self.demo.page_size == 0 {
            anyhow::bail!("demo.page_size must be at least 1");
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let dir = Self::config_dir()?;

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(Self::config_dir()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.timeline, TimelineConfig::default());
        assert_eq!(config.timeline.mark_read_throttle_ms, 500);
        assert_eq!(config.timeline.discard_factor, 1.5);
        assert_eq!(config.ui.keybinding_mode, KeybindingMode::Vim);
        assert_eq!(config.demo.warning, DemoWarning::None);
    }

    #[test]
    fn test_parse_partial_timeline_section() {
        let toml = r#"
            [timeline]
            at_bottom_threshold = 3
            discard_factor = 2.0

            [ui]
            keybinding_mode = "arrows"
            theme = "high-contrast"

            [demo]
            warning = "group-collision"
            group = false
        "#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.timeline.at_bottom_threshold, 3);
        assert_eq!(config.timeline.discard_factor, 2.0);
        // Untouched keys keep their defaults
        assert_eq!(config.timeline.min_row_height, MIN_ROW_HEIGHT);
        assert_eq!(config.ui.keybinding_mode, KeybindingMode::Arrows);
        assert_eq!(config.ui.theme, ThemeVariant::HighContrast);
        assert_eq!(config.demo.warning, DemoWarning::GroupCollision);
        assert!(!config.demo.group);
    }

    #[test]
    fn test_rejects_invalid_heuristics() {
        assert!(Config::parse("[timeline]\nmin_row_height = 0").is_err());
        assert!(Config::parse("[timeline]\ndiscard_factor = 0.5").is_err());
        assert!(Config::parse("[demo]\npage_size = 0").is_err());
    }

    #[test]
    fn test_durations() {
        let timeline = TimelineConfig::default();
        assert_eq!(timeline.mark_read_throttle(), Duration::from_millis(500));
        assert_eq!(timeline.call_peek_delay(), Duration::from_millis(500));
        assert_eq!(timeline.blur_check_delay(), Duration::ZERO);
    }
}
