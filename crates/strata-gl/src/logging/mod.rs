//! Logger setup for applications and tests.
//!
//! The library itself only emits through the `log` facade; `init_logging`
//! is a convenience for binaries that do not bring their own backend.

mod init;

pub use init::{init_logging, LoggingConfig};
