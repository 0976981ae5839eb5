//! Configuration system for retrobridge

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::joypad::{Joypad, LogicalButton};

/// Largest accepted frame width or height, in pixels
pub const MAX_DISPLAY_SIDE: u32 = 4096;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub display: DisplayConfig,
    pub input: InputConfig,
    pub bridge: BridgeConfig,
    pub debug: DebugConfig,
}

/// General front-end settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub title: String,
    pub start_paused: bool,
}

/// Display surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Integer window scale
    pub scale: u32,
    /// Texture smoothing; must stay off for crisp pixel art
    pub smoothing: bool,
}

/// Input bridge settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InputConfig {
    pub strategy: InputStrategy,
    pub joypad: Joypad,
    pub keyboard_mapping: KeyboardMapping,
}

/// How button state reaches the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum InputStrategy {
    /// Send a command on every key transition
    #[default]
    Push,
    /// Answer backend-initiated input requests
    Poll,
}

/// Keyboard to joypad button mapping, using host key identifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyboardMapping {
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
    pub a: String,
    pub b: String,
    pub start: String,
    pub select: String,
}

/// Boundary settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Age after which an unanswered frame request is abandoned
    pub pull_timeout_ms: u64,
}

/// Debug settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
    /// Log timing reports from instrumented paths
    pub trace_timing: bool,
}

/// Logging level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub const fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            title: "retrobridge".to_string(),
            start_paused: false,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            scale: 2,
            smoothing: false,
        }
    }
}

impl Default for KeyboardMapping {
    fn default() -> Self {
        Self {
            up: "w".to_string(),
            down: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            a: "j".to_string(),
            b: "k".to_string(),
            start: "1".to_string(),
            select: "2".to_string(),
        }
    }
}

impl KeyboardMapping {
    /// Key bound to `button`
    pub fn key(&self, button: LogicalButton) -> &str {
        match button {
            LogicalButton::Up => &self.up,
            LogicalButton::Down => &self.down,
            LogicalButton::Left => &self.left,
            LogicalButton::Right => &self.right,
            LogicalButton::A => &self.a,
            LogicalButton::B => &self.b,
            LogicalButton::Start => &self.start,
            LogicalButton::Select => &self.select,
        }
    }

    /// (button, key) pairs in button order
    pub fn bindings(&self) -> impl Iterator<Item = (LogicalButton, &str)> + '_ {
        LogicalButton::ALL
            .into_iter()
            .map(move |button| (button, self.key(button)))
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            pull_timeout_ms: 1000,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            trace_timing: true,
        }
    }
}

impl Config {
    /// Load configuration from the default path, or create it with defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, writing defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)?;
        Ok(())
    }

    /// Check values the bridge cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "display size {}x{} must be non-zero",
                self.display.width, self.display.height
            )));
        }
        if self.display.width > MAX_DISPLAY_SIDE || self.display.height > MAX_DISPLAY_SIDE {
            return Err(ConfigError::Invalid(format!(
                "display size {}x{} exceeds {} pixels per side",
                self.display.width, self.display.height, MAX_DISPLAY_SIDE
            )));
        }
        if self.display.scale == 0 {
            return Err(ConfigError::Invalid("display scale must be non-zero".to_string()));
        }
        if self.display.smoothing {
            return Err(ConfigError::Invalid(
                "display smoothing must be disabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("retrobridge")
            .join("config.toml")
    }
}
