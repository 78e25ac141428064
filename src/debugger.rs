//! Host debugger boundary
//!
//! The bridge never talks to a debugger directly. A host adapter implements
//! [`DebuggerHost`] and forwards stop/prompt events to [`crate::app::VimView`].

use std::path::PathBuf;

/// Resolved source location of the selected frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLocation {
    /// Full path of the source file
    pub path: PathBuf,
    /// Line number (1-based)
    pub line: u32,
}

impl FrameLocation {
    pub fn new(path: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

/// Why the selected frame has no usable source location
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("no frame is selected")]
    NoFrameSelected,

    #[error("this is not a valid frame")]
    InvalidFrame,

    #[error("can't read symbol for current frame")]
    MissingSymbol,

    #[error("can't read filename for current frame")]
    MissingFilename,
}

/// A breakpoint as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub number: u32,
    /// `path:line` for file breakpoints, anything else for the rest
    pub location: String,
}

/// A breakpoint location split into file and optional line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointLocation {
    pub path: PathBuf,
    pub line: Option<u32>,
}

impl BreakpointLocation {
    /// Split `path:line` at the last colon.
    ///
    /// Anything that does not end in `:<number>` is treated as a bare path
    /// with no line.
    pub fn parse(location: &str) -> Self {
        if let Some((path, line)) = location.rsplit_once(':') {
            if let Ok(line) = line.trim().parse::<u32>() {
                return Self {
                    path: PathBuf::from(path),
                    line: Some(line),
                };
            }
        }
        Self {
            path: PathBuf::from(location),
            line: None,
        }
    }
}

/// Operations the bridge needs from the debugger it runs inside
pub trait DebuggerHost {
    /// Source file and line of the currently selected frame
    fn selected_frame_location(&self) -> Result<FrameLocation, FrameError>;

    /// All breakpoints currently known to the debugger
    fn breakpoints(&self) -> Vec<Breakpoint>;

    /// Create a breakpoint at a `file:line` location.
    /// The error string is the debugger's own message.
    fn create_breakpoint(&mut self, location: &str) -> Result<(), String>;

    /// Write diagnostic text to the debugger console
    fn write(&mut self, text: &str);

    /// Write a single line of diagnostic text
    fn write_line(&mut self, text: &str) {
        self.write(text);
        self.write("\n");
    }
}
