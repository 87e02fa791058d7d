//! Runtime permission handling
//!
//! Android gates BLE scanning behind runtime permissions whose set depends on
//! the API level. Desktop stacks have no such prompt and are always granted.

use crate::domain::errors::ControllerError;
use async_trait::async_trait;
use tracing::{info, warn};

/// First Android API level with the dedicated Bluetooth permissions.
pub const ANDROID_BLUETOOTH_PERMISSIONS_API: u32 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android { api_level: u32 },
    Ios,
    Desktop,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Self::Ios
        } else {
            Self::Desktop
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    BluetoothScan,
    BluetoothConnect,
    FineLocation,
}

pub fn required_permissions(platform: Platform) -> &'static [Permission] {
    match platform {
        Platform::Android { api_level } if api_level >= ANDROID_BLUETOOTH_PERMISSIONS_API => &[
            Permission::BluetoothScan,
            Permission::BluetoothConnect,
            Permission::FineLocation,
        ],
        Platform::Android { .. } => &[Permission::FineLocation],
        Platform::Ios | Platform::Desktop => &[],
    }
}

fn denial_message(platform: Platform) -> &'static str {
    match platform {
        Platform::Android { api_level } if api_level >= ANDROID_BLUETOOTH_PERMISSIONS_API => {
            "Bluetooth and location permissions are required."
        }
        _ => "Location permission is required for BLE scanning.",
    }
}

/// OS side of a permission prompt.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Returns the permissions the user refused. `Err` carries the OS message
    /// when the request itself failed.
    async fn request(&self, permissions: &[Permission]) -> Result<Vec<Permission>, String>;
}

/// Gate for hosts without a runtime permission model.
pub struct HostPermissionGate;

#[async_trait]
impl PermissionGate for HostPermissionGate {
    async fn request(&self, _permissions: &[Permission]) -> Result<Vec<Permission>, String> {
        Ok(Vec::new())
    }
}

pub struct PermissionRequester {
    platform: Platform,
    gate: Box<dyn PermissionGate>,
}

impl PermissionRequester {
    pub fn new(platform: Platform, gate: Box<dyn PermissionGate>) -> Self {
        Self { platform, gate }
    }

    pub fn host() -> Self {
        Self::new(Platform::current(), Box::new(HostPermissionGate))
    }

    pub async fn request_permissions(&self) -> Result<(), ControllerError> {
        let required = required_permissions(self.platform);
        if required.is_empty() {
            return Ok(());
        }

        info!("Requesting permissions: {:?}", required);
        match self.gate.request(required).await {
            Ok(denied) if denied.is_empty() => Ok(()),
            Ok(denied) => {
                warn!("Permissions denied: {:?}", denied);
                Err(ControllerError::PermissionDenied(
                    denial_message(self.platform).to_string(),
                ))
            }
            Err(message) => {
                warn!("Permission request failed: {}", message);
                Err(ControllerError::PermissionDenied(message))
            }
        }
    }

    /// Boolean form of [`request_permissions`](Self::request_permissions).
    pub async fn granted(&self) -> bool {
        self.request_permissions().await.is_ok()
    }
}
