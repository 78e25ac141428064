//! Debugger-facing commands, convenience variables and parameters
//!
//! These are the names a host adapter registers with the debugger. Running
//! them is done by [`crate::app::VimView`].

use crate::config::{FollowMode, ParseFollowModeError};

/// A user command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the selected frame in vim (`vim`, `v`)
    View,
    /// Without argument: break at the vim cursor.
    /// With a breakpoint number: show that breakpoint in vim. (`vbreak`)
    Break(Option<String>),
}

impl Command {
    /// Command names with their help text
    pub const ALL: &'static [(&'static str, &'static str)] = &[
        ("vim", "Show current stack frame in vim."),
        ("v", "Show current stack frame in vim."),
        (
            "vbreak",
            "Set breakpoint under current vim cursor position.\n\
             If run with breakpoint number as argument, will show breakpoint position in vim.",
        ),
    ];

    /// Look up a command by name; `arg` is the rest of the command line
    pub fn parse(name: &str, arg: &str) -> Option<Self> {
        let arg = arg.trim();
        match name {
            "vim" | "v" => Some(Command::View),
            "vbreak" if arg.is_empty() => Some(Command::Break(None)),
            "vbreak" => Some(Command::Break(Some(arg.to_string()))),
            _ => None,
        }
    }
}

/// Convenience variables that read state from the vim cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorQuery {
    /// Word under the cursor (`$vw`)
    Word,
    /// WORD under the cursor (`$ve`)
    BigWord,
    /// Full path of the current file (`$vf`)
    File,
    /// Cursor line (`$vl`)
    Line,
    /// `file:line` of the cursor (`$vfl`)
    FileLine,
}

impl CursorQuery {
    pub const ALL: [CursorQuery; 5] = [
        CursorQuery::Word,
        CursorQuery::BigWord,
        CursorQuery::File,
        CursorQuery::Line,
        CursorQuery::FileLine,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CursorQuery::Word => "vw",
            CursorQuery::BigWord => "ve",
            CursorQuery::File => "vf",
            CursorQuery::Line => "vl",
            CursorQuery::FileLine => "vfl",
        }
    }

    /// Vim expression producing the value
    pub fn expression(self) -> &'static str {
        match self {
            CursorQuery::Word => r#"expand("<cword>")"#,
            CursorQuery::BigWord => r#"expand("<cWORD>")"#,
            CursorQuery::File => r#"expand("%:p")"#,
            CursorQuery::Line => r#"line(".")"#,
            CursorQuery::FileLine => r#"expand("%:p") . ":" . line(".")"#,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix('$').unwrap_or(name);
        Self::ALL.into_iter().find(|q| q.name() == name)
    }
}

/// Error setting a parameter
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    #[error("unknown parameter \"{0}\"")]
    Unknown(String),

    #[error(transparent)]
    InvalidFollowMode(#[from] ParseFollowModeError),

    #[error("expected \"on\" or \"off\", got \"{0}\"")]
    InvalidBoolean(String),
}

/// Runtime settings exposed to the debugger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    FollowOnStop,
    FollowOnPrompt,
    ServerName,
    Executable,
    UseTabs,
}

/// A parsed parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    Follow(FollowMode),
    Text(String),
    Flag(bool),
}

impl Parameter {
    pub const ALL: [Parameter; 5] = [
        Parameter::FollowOnStop,
        Parameter::FollowOnPrompt,
        Parameter::ServerName,
        Parameter::Executable,
        Parameter::UseTabs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Parameter::FollowOnStop => "vimview-onstop",
            Parameter::FollowOnPrompt => "vimview-onprompt",
            Parameter::ServerName => "vimview-server",
            Parameter::Executable => "vimview-command",
            Parameter::UseTabs => "vimview-tabs",
        }
    }

    pub fn doc(self) -> &'static str {
        match self {
            Parameter::FollowOnStop => "VimView: following frame on stop.",
            Parameter::FollowOnPrompt => "VimView: following frame on prompt show.",
            Parameter::ServerName => "VimView: remote vim server name.",
            Parameter::Executable => "VimView: vim executable name.",
            Parameter::UseTabs => "VimView: open files in tabs.",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ParameterError> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ParameterError::Unknown(name.to_string()))
    }

    pub fn parse_value(self, value: &str) -> Result<ParameterValue, ParameterError> {
        match self {
            Parameter::FollowOnStop | Parameter::FollowOnPrompt => {
                Ok(ParameterValue::Follow(value.parse()?))
            }
            Parameter::ServerName | Parameter::Executable => {
                Ok(ParameterValue::Text(value.trim().to_string()))
            }
            Parameter::UseTabs => parse_flag(value).map(ParameterValue::Flag),
        }
    }
}

fn parse_flag(value: &str) -> Result<bool, ParameterError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "1" | "yes" | "enable" => Ok(true),
        "off" | "0" | "no" | "disable" => Ok(false),
        _ => Err(ParameterError::InvalidBoolean(value.to_string())),
    }
}

pub(crate) fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
