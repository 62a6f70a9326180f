//! Workspace umbrella crate.
//!
//! Host applications can depend on `music-scanner-workspace` and enable the
//! `desktop-shims` feature to get the scanner façade together with the
//! desktop bridge implementations, without wiring each crate individually.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
