//! CLI subcommand implementations.

pub mod clear;
pub mod delete;
pub mod export;
pub mod list;
pub mod rename;
pub mod start;
pub mod status;
pub mod stop;
pub mod util;
pub mod watch;
