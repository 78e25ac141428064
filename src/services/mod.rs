pub mod follow;
pub mod hooks;
pub mod remote;
#[cfg(feature = "runtime")]
pub mod tracing_setup;
