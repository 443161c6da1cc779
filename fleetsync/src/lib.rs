//! fleetsync - Real-time vehicle position sync
//!
//! This library keeps a consumer in step with a live feed of moving entity
//! positions: it owns the streaming connection and its reconnect policy,
//! validates each snapshot, and publishes smoothly interpolated frames.
//!
//! # High-Level API
//!
//! For most use cases, [`feed::SyncContext`] is the only entry point:
//!
//! ```ignore
//! use fleetsync::config::ConfigFile;
//! use fleetsync::feed::{SyncContext, SyncEvent};
//!
//! let config = ConfigFile::load()?;
//! let context = SyncContext::new(config.sync_config());
//! let mut events = context.subscribe();
//! context.open().await;
//! ```

pub mod config;
pub mod feed;
pub mod logging;
pub mod reference;
pub mod simulation;

/// Version of the fleetsync library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
