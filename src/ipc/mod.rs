//! Stdio protocol plumbing: JSON command/status messages and raw audio frames.

pub mod frame;
pub mod protocol;
