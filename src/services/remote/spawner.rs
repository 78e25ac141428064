//! Editor process spawner
//!
//! Runs remote-control invocations of the editor executable, either waiting
//! for captured output or detached with output discarded.

use std::process::{Command, Stdio};

/// Captured output of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Error from spawning a process
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error("Failed to run {program}: {source}")]
    Process {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Decode error: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

/// Trait for spawning editor processes
pub trait ProcessSpawner {
    /// Spawn a process, wait for it to exit and capture stdout/stderr
    fn output(&self, program: &str, args: &[String]) -> Result<SpawnResult, SpawnError>;

    /// Spawn a process with stdout/stderr discarded and return immediately
    fn launch(&self, program: &str, args: &[String]) -> Result<(), SpawnError>;
}

/// Spawns processes on the local machine
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProcessSpawner;

impl ProcessSpawner for LocalProcessSpawner {
    fn output(&self, program: &str, args: &[String]) -> Result<SpawnResult, SpawnError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| SpawnError::Process {
                program: program.to_string(),
                source,
            })?;

        Ok(SpawnResult {
            stdout: String::from_utf8(output.stdout)?,
            stderr: String::from_utf8(output.stderr)?,
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    fn launch(&self, program: &str, args: &[String]) -> Result<(), SpawnError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SpawnError::Process {
                program: program.to_string(),
                source,
            })?;

        // Reap in the background so the caller never waits on the editor
        let program = program.to_string();
        std::thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                tracing::debug!("{} exited with {}", program, status);
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("Failed to wait for {}: {}", program, e),
        });
        Ok(())
    }
}
