use std::path::PathBuf;

/// Configuration for a recording session.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Directory where recording files are written.
    pub output_directory: PathBuf,

    /// Sample rate written to the WAV header at open (default: 48000).
    /// Patched to the detected input rate when the file is finalized.
    pub sample_rate: f64,

    /// Bit depth for PCM output (default: 16).
    pub bit_depth: u16,

    /// Number of output channels (default: 1; the mic is downmixed to mono).
    pub channels: u16,

    /// Requested tap buffer size in frames (default: 1024).
    pub buffer_frames: u32,

    /// Recordings at or below this duration are discarded (default: 0.5).
    pub min_duration_secs: f64,

    /// Gain applied to the RMS before clamping to [0, 1] (default: 5.0).
    /// Tuning constant: favors meter responsiveness over linear accuracy.
    pub level_gain: f32,

    /// Maximum number of sample buffers queued for the classification
    /// consumer before the oldest is dropped (default: 32).
    pub feed_capacity: usize,
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate <= 0.0 {
            return Err("sample rate must be positive".into());
        }
        if ![16, 24, 32].contains(&self.bit_depth) {
            return Err(format!("unsupported bit depth: {}", self.bit_depth));
        }
        if ![1, 2].contains(&self.channels) {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.buffer_frames == 0 {
            return Err("buffer size must be at least one frame".into());
        }
        if self.min_duration_secs < 0.0 {
            return Err("minimum duration must not be negative".into());
        }
        if self.feed_capacity == 0 {
            return Err("feed capacity must be at least one buffer".into());
        }
        Ok(())
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("."),
            sample_rate: 48000.0,
            bit_depth: 16,
            channels: 1,
            buffer_frames: 1024,
            min_duration_secs: 0.5,
            level_gain: 5.0,
            feed_capacity: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CaptureConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = CaptureConfig::default();
        config.bit_depth = 12;
        assert!(config.validate().is_err());

        let mut config = CaptureConfig::default();
        config.sample_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = CaptureConfig::default();
        config.buffer_frames = 0;
        assert!(config.validate().is_err());

        let mut config = CaptureConfig::default();
        config.feed_capacity = 0;
        assert!(config.validate().is_err());
    }
}
