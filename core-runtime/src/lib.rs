//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the scanner crates:
//! - Logging and tracing setup
//! - Scanner configuration and capability injection
//! - Scan event bus
//!
//! ## Overview
//!
//! Nothing in here knows how a catalog is built. This crate fixes the
//! conventions the other crates follow: how capabilities are injected and
//! validated, how logs are filtered and mirrored to the host, and how scan
//! progress is broadcast.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
