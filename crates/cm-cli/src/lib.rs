//! Classroom check-out tracker CLI library.
//!
//! This crate provides the CLI interface over [`cm_core::Tracker`].

mod cli;
pub mod commands;
mod config;
mod sink;

pub use cli::{Cli, Commands};
pub use config::{Config, DEFAULT_DESTINATIONS};
pub use sink::StderrSink;
