//! Configuration module for folio
//!
//! This module handles loading and validating configuration from environment
//! variables, providing strongly-typed configuration for the runtime, the
//! timers and the layout thresholds.

use envconfig::Envconfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure for folio
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct Config {
    /// Application configuration
    #[serde(flatten)]
    #[envconfig(nested)]
    pub app: AppConfig,

    /// Timer delays and debounce windows
    #[serde(flatten)]
    #[envconfig(nested)]
    pub timing: TimingConfig,

    /// Layout thresholds
    #[serde(flatten)]
    #[envconfig(nested)]
    pub layout: LayoutConfig,

    /// Feature flags
    #[serde(flatten)]
    #[envconfig(nested)]
    pub features: FeatureFlags,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct AppConfig {
    /// Log level
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,

    /// Environment (development, staging, production)
    #[envconfig(from = "ENVIRONMENT", default = "development")]
    pub environment: String,
}

impl AppConfig {
    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Timer delays and debounce windows, all in milliseconds
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct TimingConfig {
    /// Delay between landing on the about page and the skill animation
    #[envconfig(from = "SKILL_ANIMATION_DELAY_MS", default = "300")]
    pub skill_animation_delay_ms: u64,

    /// Delay between resetting skill bars and filling them
    #[envconfig(from = "SKILL_FILL_DELAY_MS", default = "100")]
    pub skill_fill_delay_ms: u64,

    /// How long the success notice stays up before the form resets
    #[envconfig(from = "FORM_RESET_DELAY_MS", default = "3000")]
    pub form_reset_delay_ms: u64,

    /// Scroll handler debounce window
    #[envconfig(from = "SCROLL_DEBOUNCE_MS", default = "10")]
    pub scroll_debounce_ms: u64,

    /// Resize handler debounce window
    #[envconfig(from = "RESIZE_DEBOUNCE_MS", default = "250")]
    pub resize_debounce_ms: u64,
}

impl TimingConfig {
    pub fn skill_animation_delay(&self) -> Duration {
        Duration::from_millis(self.skill_animation_delay_ms)
    }

    pub fn skill_fill_delay(&self) -> Duration {
        Duration::from_millis(self.skill_fill_delay_ms)
    }

    pub fn form_reset_delay(&self) -> Duration {
        Duration::from_millis(self.form_reset_delay_ms)
    }

    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

/// Layout thresholds
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct LayoutConfig {
    /// Vertical scroll past which the header switches to its scrolled style
    #[envconfig(from = "HEADER_SCROLL_THRESHOLD_PX", default = "50")]
    pub header_scroll_threshold_px: f64,

    /// Viewport width above which the mobile menu is force-closed
    #[envconfig(from = "MOBILE_BREAKPOINT_PX", default = "768")]
    pub mobile_breakpoint_px: u32,

    /// Visible fraction at which a fade target is revealed
    #[envconfig(from = "FADE_IN_THRESHOLD", default = "0.1")]
    pub fade_in_threshold: f64,

    /// Bottom margin subtracted from the viewport for fade-in checks
    #[envconfig(from = "FADE_IN_ROOT_MARGIN_PX", default = "50")]
    pub fade_in_root_margin_px: f64,
}

/// Feature flags
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct FeatureFlags {
    /// Enable the 1-4 page shortcuts
    #[envconfig(from = "ENABLE_KEYBOARD_SHORTCUTS", default = "true")]
    pub keyboard_shortcuts: bool,

    /// Enable deferred image loading
    #[envconfig(from = "ENABLE_LAZY_IMAGES", default = "true")]
    pub lazy_images: bool,

    /// Enable fade-in on scroll
    #[envconfig(from = "ENABLE_FADE_IN", default = "true")]
    pub fade_in: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenv::dotenv().ok();

        Config::init_from_env().map_err(Error::from)
    }

    /// Built-in defaults, ignoring the process environment
    pub fn defaults() -> Result<Self> {
        Config::init_from_hashmap(&HashMap::new()).map_err(Error::from)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.timing.form_reset_delay_ms == 0 {
            return Err(Error::config("Form reset delay must be greater than 0"));
        }

        if !(self.layout.fade_in_threshold > 0.0 && self.layout.fade_in_threshold <= 1.0) {
            return Err(Error::config("Fade-in threshold must be in (0, 1]"));
        }

        if self.layout.fade_in_root_margin_px < 0.0 {
            return Err(Error::config("Fade-in root margin cannot be negative"));
        }

        if self.layout.mobile_breakpoint_px == 0 {
            return Err(Error::config("Mobile breakpoint cannot be 0"));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!(
            environment = %self.app.environment,
            log_level = %self.app.log_level,
            "Application configuration"
        );

        tracing::info!(
            skill_animation_delay_ms = self.timing.skill_animation_delay_ms,
            skill_fill_delay_ms = self.timing.skill_fill_delay_ms,
            form_reset_delay_ms = self.timing.form_reset_delay_ms,
            scroll_debounce_ms = self.timing.scroll_debounce_ms,
            resize_debounce_ms = self.timing.resize_debounce_ms,
            "Timing configuration"
        );

        tracing::info!(
            header_scroll_threshold_px = self.layout.header_scroll_threshold_px,
            mobile_breakpoint_px = self.layout.mobile_breakpoint_px,
            fade_in_threshold = self.layout.fade_in_threshold,
            fade_in_root_margin_px = self.layout.fade_in_root_margin_px,
            "Layout configuration"
        );

        tracing::info!(
            keyboard_shortcuts = self.features.keyboard_shortcuts,
            lazy_images = self.features.lazy_images,
            fade_in = self.features.fade_in,
            "Feature flags"
        );
    }
}
