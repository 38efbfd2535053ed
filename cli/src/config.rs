//! TOML configuration for the demo binary.
//!
//! Loaded from `~/.cordon/config.toml`:
//!
//! ```toml
//! [ui]
//! ascii_only = false
//! high_contrast = false
//!
//! [runtime]
//! max_cascade_passes = 8
//! catch_panics = true
//! capture_traces = true
//! ```
//!
//! `CORDON_ASCII=1` forces ASCII glyphs, and a non-empty `NO_COLOR`
//! selects the high-contrast palette (plain ANSI colors, no RGB escapes).

use serde::Deserialize;
use std::{env, path::PathBuf};

use cordon_engine::RuntimeConfig;
use cordon_tui::UiOptions;

#[derive(Debug, Default, Deserialize)]
pub struct CordonConfig {
    pub ui: Option<UiSection>,
    pub runtime: Option<RuntimeSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UiSection {
    /// Use ASCII-only glyphs for markers and separators.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable the high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
}

/// Overrides for [`RuntimeConfig`]; absent fields keep the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct RuntimeSection {
    pub max_cascade_passes: Option<u32>,
    pub catch_panics: Option<bool>,
    pub capture_traces: Option<bool>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl CordonConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read { path, source: err });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse { path, source: err })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Presentation toggles with environment overrides applied.
    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        let ascii_env = env::var("CORDON_ASCII").ok();
        let no_color = env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
        self.resolve_ui_options(ascii_env.as_deref(), no_color)
    }

    // Environment can force a toggle on, never off.
    fn resolve_ui_options(&self, ascii_override: Option<&str>, no_color: bool) -> UiOptions {
        let ui = self.ui.as_ref();
        UiOptions {
            ascii_only: ui.is_some_and(|ui| ui.ascii_only) || ascii_override.is_some_and(is_truthy),
            high_contrast: ui.is_some_and(|ui| ui.high_contrast) || no_color,
        }
    }

    /// Runtime settings on top of [`RuntimeConfig::default`].
    #[must_use]
    pub fn runtime_config(&self) -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        if let Some(runtime) = &self.runtime {
            if let Some(passes) = runtime.max_cascade_passes {
                config.max_cascade_passes = passes;
            }
            if let Some(catch) = runtime.catch_panics {
                config.catch_panics = catch;
            }
            if let Some(capture) = runtime.capture_traces {
                config.capture_traces = capture;
            }
        }
        config
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".cordon").join("config.toml"))
}
