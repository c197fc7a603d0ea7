//! Fieldreg CLI library
//!
//! The binary in `main.rs` only parses arguments, installs logging and maps
//! the result to an exit code. Everything else lives here so it can be
//! exercised from tests.

pub mod cli;
pub mod commands;
pub mod output;
pub mod services;

pub use cli::{Cli, Commands, OutputFormat};
pub use services::Services;
