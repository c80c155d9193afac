#![forbid(unsafe_code)]

//! Navigation engine configuration.
//!
//! [`NavConfig::default()`] reproduces the constants the overlay engine has
//! always used (400 ms exit delay, `id` query parameter, 10 px swipe lock,
//! 30 % swipe dismissal). With the `config-file` feature the same structure
//! can be loaded from TOML or JSON; every field is optional in the file.
//!
//! ```toml
//! settle_delay_ms = 400
//! query_param = "id"
//!
//! [swipe]
//! lock_threshold_px = 10.0
//! dismiss_fraction = 0.3
//! ```

use core::time::Duration;
#[cfg(feature = "config-file")]
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default exit-animation duration before a closing overlay is detached.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 400;
/// Default URL query parameter carrying the topmost content id.
pub const DEFAULT_QUERY_PARAM: &str = "id";

/// Swipe-to-close thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    /// Movement (px) before a touch is classified as drag or scroll.
    pub lock_threshold_px: f32,
    /// Fraction of the viewport width a drag must exceed to close.
    pub dismiss_fraction: f32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            lock_threshold_px: 10.0,
            dismiss_fraction: 0.3,
        }
    }
}

/// Top-level configuration for the overlay navigation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Exit-animation duration in milliseconds.
    pub settle_delay_ms: u64,
    /// Name of the URL query parameter that carries the top overlay id.
    pub query_param: String,
    /// Swipe gesture thresholds.
    pub swipe: SwipeConfig,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            query_param: DEFAULT_QUERY_PARAM.to_owned(),
            swipe: SwipeConfig::default(),
        }
    }
}

impl NavConfig {
    /// Exit-animation duration.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Set the exit-animation duration.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the URL query parameter name.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>) -> Self {
        self.query_param = name.into();
        self
    }

    /// Set swipe thresholds.
    #[must_use]
    pub fn with_swipe(mut self, swipe: SwipeConfig) -> Self {
        self.swipe = swipe;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query_param.trim().is_empty() {
            return Err(ConfigError::Invalid("query_param must not be empty"));
        }
        if !self.swipe.lock_threshold_px.is_finite() || self.swipe.lock_threshold_px < 0.0 {
            return Err(ConfigError::Invalid(
                "swipe.lock_threshold_px must be a non-negative number",
            ));
        }
        let fraction = self.swipe.dismiss_fraction;
        if !fraction.is_finite() || fraction <= 0.0 || fraction > 1.0 {
            return Err(ConfigError::Invalid(
                "swipe.dismiss_fraction must be in (0, 1]",
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, choosing the format by extension (`.json` or TOML).
    #[cfg(feature = "config-file")]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        }
    }
}

/// Errors produced while loading or validating a [`NavConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[cfg(feature = "config-file")]
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "config-file")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[cfg(feature = "config-file")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
