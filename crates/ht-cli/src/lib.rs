//! Hierarchical time tracker CLI library.
//!
//! This crate provides the CLI interface and the adapters that connect the
//! entry store to storage, the terminal and the clipboard.

mod cli;
pub mod commands;
mod config;
pub mod session;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use session::Session;
