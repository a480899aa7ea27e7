//! Shared test utilities for the ogc-probe workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Canned WFS/WMS capabilities documents and exception reports
//! - Fake image payloads of an exact size
//! - An in-process mock OGC server on an ephemeral port
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then in an async test:
//!
//! ```ignore
//! use test_utils::{MockLayer, MockOgcServer, MockOgcService};
//!
//! let server = MockOgcServer::start(MockOgcService::default()).await;
//! let url = server.ows_url();
//! ```

pub mod fixtures;
pub mod generators;
pub mod server;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use server::*;
