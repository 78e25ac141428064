//! Vim remote-control support
//!
//! This module drives a vim server through its argv-based remote interface
//! (`--servername`, `--remote`, `--remote-tab`, `--remote-expr`).

mod command;
mod session;
mod spawner;

pub use command::RemoteCommand;
pub use session::{Evaluation, OpenOptions, RemoteEditorSession, SessionError, SessionLocation};
pub use spawner::{LocalProcessSpawner, ProcessSpawner, SpawnError, SpawnResult};
