//! Remote-control command lines
//!
//! Every invocation starts with `<executable> +q --servername <server>`.
//! `+q` makes a vim started without a running server quit right away instead
//! of opening an interactive editor on the debugger's terminal.

use crate::config::{ConnectionConfig, OpenMode};
use std::fmt;
use std::path::Path;

/// A fully built editor invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RemoteCommand {
    /// `<program> +q --servername <server>` with no action yet
    pub fn prefix(config: &ConnectionConfig) -> Self {
        Self {
            program: config.executable().to_string(),
            args: vec![
                "+q".to_string(),
                "--servername".to_string(),
                config.server_name().to_string(),
            ],
        }
    }

    /// `... --remote-expr <expression>`
    pub fn remote_expr(mut self, expression: &str) -> Self {
        self.args.push("--remote-expr".to_string());
        self.args.push(expression.to_string());
        self
    }

    /// `... <mode-flag> [+<line>] <path>`
    ///
    /// Line 0 means "unknown" and is dropped, like a missing line.
    pub fn remote_open(mut self, mode: OpenMode, path: &Path, line: Option<u32>) -> Self {
        self.args.push(mode.remote_flag().to_string());
        if let Some(line) = line.filter(|&l| l > 0) {
            self.args.push(format!("+{}", line));
        }
        self.args.push(path.to_string_lossy().into_owned());
        self
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
