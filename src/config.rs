//! Configuration module for tdiff
//!
//! Loads user configuration from ~/.tdiff/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::render::ViewMode;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Default view for flat rendering (unified or split)
    pub view: ViewMode,
    /// Hide unchanged context lines by default
    pub show_only_diffs: bool,
    /// Trim lines before diffing by default
    pub ignore_whitespace: bool,
    /// Reformat JSON inputs with two-space indentation before diffing
    pub pretty_print_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            view: ViewMode::Split,
            show_only_diffs: false,
            ignore_whitespace: false,
            pretty_print_json: true,
        }
    }
}

impl Config {
    /// Load configuration from the default path (~/.tdiff/config.toml)
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path();

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("invalid config file: {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tdiff")
            .join("config.toml")
    }

    /// Merge CLI overrides into config
    pub fn with_overrides(
        mut self,
        only_diffs: bool,
        ignore_whitespace: bool,
        no_pretty_json: bool,
        view: Option<ViewMode>,
    ) -> Self {
        if only_diffs {
            self.show_only_diffs = true;
        }
        if ignore_whitespace {
            self.ignore_whitespace = true;
        }
        if no_pretty_json {
            self.pretty_print_json = false;
        }
        if let Some(view) = view {
            self.view = view;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_defaults() {
        let config = Config::default().with_overrides(true, false, true, Some(ViewMode::Unified));
        assert!(config.show_only_diffs);
        assert!(!config.ignore_whitespace);
        assert!(!config.pretty_print_json);
        assert_eq!(config.view, ViewMode::Unified);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config {
            view: ViewMode::Unified,
            show_only_diffs: true,
            ignore_whitespace: false,
            pretty_print_json: false,
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.view, ViewMode::Unified);
        assert!(parsed.show_only_diffs);
        assert!(!parsed.pretty_print_json);
    }
}
