//! Host audio session bookkeeping for desktop targets.
//!
//! Desktop hosts have no process-global session object to configure the
//! way mobile platforms do; this controller verifies that capture is
//! possible and enforces strict activate/deactivate pairing so misuse
//! surfaces instead of silently overlapping sessions.

use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::HostTrait;

use ambient_capture_core::models::error::CaptureError;
use ambient_capture_core::traits::session::AudioSessionController;

pub struct HostAudioSession {
    active: AtomicBool,
}

impl HostAudioSession {
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Default for HostAudioSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSessionController for HostAudioSession {
    fn activate(&self) -> Result<(), CaptureError> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::SessionConfigurationFailed(
                "audio session already active".into(),
            ));
        }
        if cpal::default_host().default_input_device().is_none() {
            self.active.store(false, Ordering::SeqCst);
            return Err(CaptureError::SessionConfigurationFailed(
                "no capture endpoint available".into(),
            ));
        }
        log::info!("audio session activated");
        Ok(())
    }

    fn deactivate(&self) -> Result<(), CaptureError> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Err(CaptureError::SessionConfigurationFailed(
                "audio session is not active".into(),
            ));
        }
        log::info!("audio session deactivated");
        Ok(())
    }
}
