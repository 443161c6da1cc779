//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (path, show, init)
//! - [`locations`] - Fetch reference locations
//! - [`simulation`] - Start, pause or stop the upstream simulation
//! - [`watch`] - Follow the live position feed

pub mod config;
pub mod locations;
pub mod simulation;
pub mod watch;
