/// Recording session state machine.
///
/// State transitions:
/// ```text
/// idle → recording → stopping → idle
/// ```
///
/// A live capture session (engine, tap, open output file) exists if and
/// only if the state is `Recording`.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    Idle,
    Recording { duration_secs: f64 },
    Stopping,
}

impl CaptureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    /// Returns the elapsed duration if the state tracks one.
    pub fn duration(&self) -> Option<f64> {
        match self {
            Self::Recording { duration_secs } => Some(*duration_secs),
            _ => None,
        }
    }
}
