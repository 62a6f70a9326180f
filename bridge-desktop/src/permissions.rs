//! Desktop permission gate
//!
//! Desktop operating systems grant file access to the user's own media
//! without a runtime prompt, so both calls report `granted`.

use async_trait::async_trait;
use bridge_traits::{
    access::{PermissionGate, PermissionStatus},
    error::Result,
};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopPermissionGate;

impl DesktopPermissionGate {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PermissionGate for DesktopPermissionGate {
    async fn check_permissions(&self) -> Result<PermissionStatus> {
        Ok(PermissionStatus::granted())
    }

    async fn request_permissions(&self) -> Result<PermissionStatus> {
        debug!("Desktop host has no runtime media permission; reporting granted");
        Ok(PermissionStatus::granted())
    }
}
