//! Bridge configuration
//!
//! The connection identity (server, executable, open mode) and the two follow
//! policies. Values can come from a JSON file, from the `VIMSERVER`
//! environment variable, and from runtime parameter updates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming the vim server; also the signal used to
/// resolve [`FollowMode::Auto`].
pub const SERVER_ENV_VAR: &str = "VIMSERVER";

/// Server name used when nothing else is configured
pub const DEFAULT_SERVER_NAME: &str = "gdb";

/// Editor executable used when nothing else is configured
pub const DEFAULT_EXECUTABLE: &str = "vim";

/// How the editor reuses its UI when asked to open a file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OpenMode {
    /// Replace the buffer in the current window (`--remote`)
    #[default]
    Window,
    /// Open the file in a tab (`--remote-tab`)
    Tab,
}

impl OpenMode {
    /// The remote-open flag for this mode
    pub fn remote_flag(self) -> &'static str {
        match self {
            OpenMode::Window => "--remote",
            OpenMode::Tab => "--remote-tab",
        }
    }

    pub fn from_use_tabs(use_tabs: bool) -> Self {
        if use_tabs {
            OpenMode::Tab
        } else {
            OpenMode::Window
        }
    }

    pub fn uses_tabs(self) -> bool {
        self == OpenMode::Tab
    }
}

/// Whether a debugger event should move the editor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FollowMode {
    On,
    #[default]
    Off,
    /// Follow only when [`SERVER_ENV_VAR`] is set
    Auto,
}

impl fmt::Display for FollowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FollowMode::On => "on",
            FollowMode::Off => "off",
            FollowMode::Auto => "auto",
        })
    }
}

/// Error parsing an on/off/auto value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected \"on\", \"off\" or \"auto\", got \"{0}\"")]
pub struct ParseFollowModeError(pub String);

impl FromStr for FollowMode {
    type Err = ParseFollowModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" | "1" | "yes" | "enable" => Ok(FollowMode::On),
            "off" | "0" | "no" | "disable" => Ok(FollowMode::Off),
            "auto" | "-1" => Ok(FollowMode::Auto),
            _ => Err(ParseFollowModeError(s.to_string())),
        }
    }
}

/// Connection identity of the remote editor.
///
/// `server_name` and `executable` are never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    server_name: String,
    executable: String,
    open_mode: OpenMode,
}

impl ConnectionConfig {
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn open_mode(&self) -> OpenMode {
        self.open_mode
    }

    /// Apply a partial update. Empty names are ignored and the previous value
    /// is kept.
    pub fn apply(&mut self, update: ConnectionUpdate) {
        if let Some(name) = update.server_name.filter(|s| !s.is_empty()) {
            self.server_name = name;
        }
        if let Some(exe) = update.executable.filter(|s| !s.is_empty()) {
            self.executable = exe;
        }
        if let Some(mode) = update.open_mode {
            self.open_mode = mode;
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            executable: DEFAULT_EXECUTABLE.to_string(),
            open_mode: OpenMode::Window,
        }
    }
}

/// Partial update of a [`ConnectionConfig`]; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionUpdate {
    pub server_name: Option<String>,
    pub executable: Option<String>,
    pub open_mode: Option<OpenMode>,
}

impl ConnectionUpdate {
    pub fn server_name(name: impl Into<String>) -> Self {
        Self {
            server_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn executable(exe: impl Into<String>) -> Self {
        Self {
            executable: Some(exe.into()),
            ..Self::default()
        }
    }

    pub fn open_mode(mode: OpenMode) -> Self {
        Self {
            open_mode: Some(mode),
            ..Self::default()
        }
    }
}

/// Source of environment variables, so policy resolution can be tested
/// without touching the process environment.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;

    /// Server name from [`SERVER_ENV_VAR`], if set
    fn server_name(&self) -> Option<String> {
        self.var(SERVER_ENV_VAR)
    }
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for std::collections::HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Error loading a config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Name the vim server was started with (`vim --servername NAME`)
    pub server_name: String,
    /// Editor executable, e.g. `vim` or `gvim`
    pub executable: String,
    pub open_mode: OpenMode,
    /// Follow the frame whenever execution stops
    pub follow_on_stop: FollowMode,
    /// Follow the frame whenever the prompt is shown
    pub follow_on_prompt: FollowMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            executable: DEFAULT_EXECUTABLE.to_string(),
            open_mode: OpenMode::Window,
            follow_on_stop: FollowMode::Off,
            follow_on_prompt: FollowMode::Off,
        }
    }
}

impl Config {
    /// Default config location: `<config dir>/vimview/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vimview").join("config.json"))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the default config file if it exists, falling back to defaults
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path().filter(|p| p.is_file()) else {
            return Self::default();
        };
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config: {}", e);
                Self::default()
            }
        }
    }

    /// Override the server name from the environment, if set
    pub fn with_environment(mut self, env: &dyn Environment) -> Self {
        if let Some(name) = env.server_name().filter(|s| !s.is_empty()) {
            self.server_name = name;
        }
        self
    }

    pub fn connection_update(&self) -> ConnectionUpdate {
        ConnectionUpdate {
            server_name: Some(self.server_name.clone()),
            executable: Some(self.executable.clone()),
            open_mode: Some(self.open_mode),
        }
    }

    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Config)).unwrap_or_default()
    }
}
