//! Logging utilities.
//!
//! This module centralizes logger initialization. It sticks to the standard
//! `log` facade so game and engine code stay backend-agnostic.

mod init;

pub use init::{init_logging, LoggingConfig};
