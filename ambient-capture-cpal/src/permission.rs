//! Desktop microphone permission probe.
//!
//! Desktop hosts expose no per-app consent dialog for unpackaged
//! applications; access amounts to "a default input device exists and can
//! be opened". Any host state the probe cannot interpret maps to
//! `Denied` — permission is fail-closed.

use cpal::traits::{DeviceTrait, HostTrait};

use ambient_capture_core::traits::permission::{PermissionProvider, PermissionStatus};

pub struct HostMicPermission;

impl HostMicPermission {
    pub fn new() -> Self {
        Self
    }

    fn probe(&self) -> PermissionStatus {
        let Some(device) = cpal::default_host().default_input_device() else {
            return PermissionStatus::Denied;
        };
        match device.default_input_config() {
            Ok(_) => PermissionStatus::Granted,
            Err(e) => {
                log::warn!("default input device is not openable: {}", e);
                PermissionStatus::Denied
            }
        }
    }
}

impl Default for HostMicPermission {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionProvider for HostMicPermission {
    fn status(&self) -> PermissionStatus {
        self.probe()
    }

    fn request(&self) -> bool {
        // No dialog to raise on desktop hosts; re-probe and answer.
        matches!(self.probe(), PermissionStatus::Granted)
    }
}
