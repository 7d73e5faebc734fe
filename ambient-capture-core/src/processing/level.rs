/// Instantaneous loudness of a PCM buffer: RMS scaled by `gain`, clamped
/// to [0, 1].
///
/// The gain is an empirical tuning constant, not a physical measurement.
/// Returns 0.0 for an empty buffer and for non-finite input.
pub fn level_from_samples(samples: &[f32], gain: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    let rms = (sum_sq / samples.len() as f32).sqrt();
    let scaled = rms * gain;
    if scaled.is_nan() {
        return 0.0;
    }
    scaled.clamp(0.0, 1.0)
}
