//! pinpoint CLI library
//!
//! Exposes the command implementations and policy loading for integration
//! testing.

pub mod commands;
pub mod config;

pub use commands::{Cli, Command};
pub use config::load_policies;
