use crate::models::error::CaptureError;

/// Controller for the host's shared audio session.
///
/// The session is a process-global resource: activation must happen
/// strictly before the capture engine opens its input, and deactivation
/// strictly after the engine is fully torn down. Calls are not
/// reentrant-safe; the recorder enforces strict pairing.
pub trait AudioSessionController: Send + Sync {
    /// Configure and activate the shared session for simultaneous
    /// playback and record.
    fn activate(&self) -> Result<(), CaptureError>;

    /// Deactivate the shared session. Failures here are best-effort for
    /// callers: the recorder logs them and does not escalate.
    fn deactivate(&self) -> Result<(), CaptureError>;
}
