//! Keep a vim server showing the debugger's current source location.
//!
//! A debugger adapter owns a single [`VimView`], implements
//! [`DebuggerHost`] for its debugger, and forwards stop and prompt events.

pub mod app;
pub mod commands;
pub mod config;
pub mod debugger;
pub mod services;

pub use app::VimView;
pub use debugger::DebuggerHost;
