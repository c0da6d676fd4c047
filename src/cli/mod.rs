//! CLI module - command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `verify-dealer` - Operator action to verify a dealer account

pub mod args;

pub use args::{Cli, Commands};
