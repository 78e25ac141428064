//! Shared fixtures: a spawner that records instead of running vim, and a
//! scripted debugger.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use vimview::debugger::{Breakpoint, DebuggerHost, FrameError, FrameLocation};
use vimview::services::remote::{
    ProcessSpawner, RemoteCommand, RemoteEditorSession, SpawnError, SpawnResult,
};

#[derive(Clone, Default)]
pub struct RecordingSpawner {
    pub launched: Rc<RefCell<Vec<RemoteCommand>>>,
    pub evaluated: Rc<RefCell<Vec<RemoteCommand>>>,
    pub reply: Rc<RefCell<SpawnResult>>,
    pub fail: bool,
}

impl RecordingSpawner {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn session(&self) -> RemoteEditorSession {
        RemoteEditorSession::with_spawner(Box::new(self.clone()))
    }

    pub fn reply_with(&self, stdout: &str, stderr: &str) {
        *self.reply.borrow_mut() = SpawnResult {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code: if stderr.is_empty() { 0 } else { 1 },
        };
    }

    pub fn launch_count(&self) -> usize {
        self.launched.borrow().len()
    }

    pub fn last_launch(&self) -> Option<RemoteCommand> {
        self.launched.borrow().last().cloned()
    }

    fn check(&self, program: &str) -> Result<(), SpawnError> {
        if self.fail {
            return Err(SpawnError::Process {
                program: program.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        Ok(())
    }
}

impl ProcessSpawner for RecordingSpawner {
    fn output(&self, program: &str, args: &[String]) -> Result<SpawnResult, SpawnError> {
        self.check(program)?;
        self.evaluated.borrow_mut().push(RemoteCommand {
            program: program.to_string(),
            args: args.to_vec(),
        });
        Ok(self.reply.borrow().clone())
    }

    fn launch(&self, program: &str, args: &[String]) -> Result<(), SpawnError> {
        self.check(program)?;
        self.launched.borrow_mut().push(RemoteCommand {
            program: program.to_string(),
            args: args.to_vec(),
        });
        Ok(())
    }
}

pub struct FakeDebugger {
    pub frame: Result<FrameLocation, FrameError>,
    pub breakpoints: Vec<Breakpoint>,
    pub created: Vec<String>,
    pub console: String,
}

impl FakeDebugger {
    pub fn new() -> Self {
        Self {
            frame: Err(FrameError::NoFrameSelected),
            breakpoints: Vec::new(),
            created: Vec::new(),
            console: String::new(),
        }
    }

    pub fn stopped_at(path: &Path, line: u32) -> Self {
        Self {
            frame: Ok(FrameLocation::new(path, line)),
            ..Self::new()
        }
    }
}

impl DebuggerHost for FakeDebugger {
    fn selected_frame_location(&self) -> Result<FrameLocation, FrameError> {
        self.frame.clone()
    }

    fn breakpoints(&self) -> Vec<Breakpoint> {
        self.breakpoints.clone()
    }

    fn create_breakpoint(&mut self, location: &str) -> Result<(), String> {
        if location.is_empty() {
            return Err("Function \"\" not defined.".to_string());
        }
        self.created.push(location.to_string());
        Ok(())
    }

    fn write(&mut self, text: &str) {
        self.console.push_str(text);
    }
}

pub fn source_file() -> tempfile::NamedTempFile {
    tempfile::Builder::new()
        .prefix("main")
        .suffix(".c")
        .tempfile()
        .unwrap()
}
