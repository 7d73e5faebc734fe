/// Counters for debugging capture sessions.
#[derive(Debug, Clone, Default)]
pub struct CaptureDiagnostics {
    pub callback_count: u64,
    pub samples_total: u64,
    pub bytes_written: u64,
    pub write_failures: u64,
    pub feed_drops: u64,
}
