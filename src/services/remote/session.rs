//! Remote editor session
//!
//! Turns "show this file at this line" requests into editor invocations and
//! remembers the last requested location so that repeated requests for the
//! same place do not make the editor jump again.

use crate::config::{ConnectionConfig, ConnectionUpdate};
use crate::debugger::DebuggerHost;
use crate::services::remote::command::RemoteCommand;
use crate::services::remote::spawner::{LocalProcessSpawner, ProcessSpawner, SpawnError};
use std::path::{Path, PathBuf};

/// Error from talking to the editor
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Spawn(SpawnError),

    /// The editor answered with bytes that are not UTF-8
    #[error("Decode error: {0}")]
    Decode(#[source] std::string::FromUtf8Error),
}

impl From<SpawnError> for SessionError {
    fn from(err: SpawnError) -> Self {
        match err {
            SpawnError::Decode(e) => SessionError::Decode(e),
            other => SessionError::Spawn(other),
        }
    }
}

/// Text returned by `--remote-expr`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub output: String,
    /// Empty on success, e.g. "E247: no registered server named ..." otherwise
    pub error: String,
}

impl Evaluation {
    pub fn is_ok(&self) -> bool {
        self.error.is_empty()
    }
}

/// Last location the editor was asked to show.
///
/// This is what was requested, not what the editor actually displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionLocation {
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
}

impl SessionLocation {
    fn matches(&self, path: &Path, line: Option<u32>) -> bool {
        self.file.as_deref() == Some(path) && self.line == line
    }
}

/// Options for [`RemoteEditorSession::open_file`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Only open paths that are existing regular files
    pub existing_only: bool,
    /// Open even if this is the location requested last time
    pub reopen: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            existing_only: true,
            reopen: false,
        }
    }
}

impl OpenOptions {
    pub fn reopen() -> Self {
        Self {
            reopen: true,
            ..Self::default()
        }
    }
}

/// Connection to a vim server plus the last location sent to it
pub struct RemoteEditorSession {
    config: ConnectionConfig,
    location: SessionLocation,
    prefix: RemoteCommand,
    spawner: Box<dyn ProcessSpawner>,
}

impl RemoteEditorSession {
    /// Create a session with the default identity that runs local processes
    pub fn new() -> Self {
        Self::with_spawner(Box::new(LocalProcessSpawner))
    }

    pub fn with_spawner(spawner: Box<dyn ProcessSpawner>) -> Self {
        let config = ConnectionConfig::default();
        let prefix = RemoteCommand::prefix(&config);
        Self {
            config,
            location: SessionLocation::default(),
            prefix,
            spawner,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn location(&self) -> &SessionLocation {
        &self.location
    }

    /// Update the connection identity. Empty names are ignored.
    pub fn configure(&mut self, update: ConnectionUpdate) {
        self.config.apply(update);
        self.prefix = RemoteCommand::prefix(&self.config);
        tracing::debug!(
            "vim server \"{}\", executable \"{}\", {:?} mode",
            self.config.server_name(),
            self.config.executable(),
            self.config.open_mode()
        );
    }

    /// Evaluate a vim expression on the server and wait for the result
    pub fn evaluate(&self, expression: &str) -> Result<Evaluation, SessionError> {
        let cmd = self.prefix.clone().remote_expr(expression);
        tracing::debug!("cmd: {}", cmd);

        let result = self.spawner.output(&cmd.program, &cmd.args)?;
        if !result.stdout.is_empty() {
            tracing::debug!("out: {}", result.stdout);
        }
        if !result.stderr.is_empty() {
            tracing::debug!("err: {}", result.stderr);
        }
        if result.exit_code != 0 {
            tracing::debug!("exit: {}", result.exit_code);
        }

        Ok(Evaluation {
            output: result.stdout,
            error: result.stderr,
        })
    }

    /// Ask the editor to show `path`, optionally at `line`.
    ///
    /// Returns `Ok(true)` if the editor was launched, `Ok(false)` if the
    /// request was skipped as a repeat or because the file does not exist.
    pub fn open_file(
        &mut self,
        path: &Path,
        line: Option<u32>,
        options: OpenOptions,
    ) -> Result<bool, SessionError> {
        if !options.reopen && self.location.matches(path, line) {
            return Ok(false);
        }

        if options.existing_only && !path.is_file() {
            tracing::debug!("not a file: {}", path.display());
            return Ok(false);
        }

        let cmd = self
            .prefix
            .clone()
            .remote_open(self.config.open_mode(), path, line);
        tracing::debug!("cmd: {}", cmd);

        // Recorded before launching so a slow editor cannot cause a second
        // launch for the same location.
        self.location = SessionLocation {
            file: Some(path.to_path_buf()),
            line,
        };

        self.spawner.launch(&cmd.program, &cmd.args)?;
        Ok(true)
    }

    /// Show the debugger's selected frame in the editor.
    ///
    /// When the frame has no usable location nothing is opened and, if
    /// `show_errors` is set, the reason is written to the host.
    pub fn request_current_location(
        &mut self,
        host: &mut dyn DebuggerHost,
        show_errors: bool,
        options: OpenOptions,
    ) -> Result<bool, SessionError> {
        let frame = match host.selected_frame_location() {
            Ok(frame) => frame,
            Err(e) => {
                if show_errors {
                    host.write_line(&e.to_string());
                }
                return Ok(false);
            }
        };

        self.open_file(&frame.path, Some(frame.line), options)
    }
}

impl Default for RemoteEditorSession {
    fn default() -> Self {
        Self::new()
    }
}
