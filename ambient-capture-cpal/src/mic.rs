//! cpal microphone capture provider.
//!
//! Opens the default input device in its native configuration and
//! delivers f32 sample buffers via the `AudioBufferCallback`. The stream
//! is created, played, and dropped on a dedicated capture thread because
//! `cpal::Stream` must stay on the thread that built it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, StreamConfig};
use parking_lot::Mutex;

use ambient_capture_core::models::error::CaptureError;
use ambient_capture_core::traits::provider::{AudioBufferCallback, CaptureProvider};

/// Microphone capture backed by the host's default input device.
pub struct CpalMicCapture {
    requested_buffer_frames: Option<u32>,
    running: Arc<AtomicBool>,
    capture_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl CpalMicCapture {
    /// Capture with the device's default buffering.
    pub fn default_device() -> Self {
        Self {
            requested_buffer_frames: None,
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: Mutex::new(None),
        }
    }

    /// Capture requesting a fixed tap buffer size in frames. Hosts that
    /// reject the fixed size fall back to their default buffering.
    pub fn with_buffer_frames(frames: u32) -> Self {
        Self {
            requested_buffer_frames: Some(frames),
            ..Self::default_device()
        }
    }
}

impl CaptureProvider for CpalMicCapture {
    fn is_available(&self) -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    fn start(&mut self, callback: AudioBufferCallback) -> Result<(), CaptureError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CaptureError::EngineCreationFailed(
                "mic capture already running".into(),
            ));
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let requested_frames = self.requested_buffer_frames;
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), CaptureError>>();

        let handle = thread::Builder::new()
            .name("cpal-mic-capture".into())
            .spawn(move || {
                let stream = match build_input_stream(requested_frames, callback) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        running.store(false, Ordering::SeqCst);
                        return;
                    }
                };

                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(CaptureError::EngineCreationFailed(format!(
                        "failed to start input stream: {}",
                        e
                    ))));
                    running.store(false, Ordering::SeqCst);
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                while running.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(50));
                }
                drop(stream);
            })
            .map_err(|e| CaptureError::EngineCreationFailed(format!("failed to spawn capture thread: {}", e)))?;

        *self.capture_handle.lock() = Some(handle);

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                self.stop()?;
                Err(e)
            }
            Err(_) => {
                self.stop()?;
                Err(CaptureError::EngineCreationFailed(
                    "capture thread exited before reporting readiness".into(),
                ))
            }
        }
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.capture_handle.lock().take() {
            let _ = handle.join();
        }
        Ok(())
    }
}

/// Build an input stream on the default device, converting whatever
/// sample format the hardware delivers to f32.
fn build_input_stream(
    requested_frames: Option<u32>,
    callback: AudioBufferCallback,
) -> Result<cpal::Stream, CaptureError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(CaptureError::InputUnavailable)?;

    log::info!(
        "using audio input device: {}",
        device.name().unwrap_or_else(|_| "<unnamed>".into())
    );

    let supported = device
        .default_input_config()
        .map_err(|_| CaptureError::InputUnavailable)?;
    let sample_format = supported.sample_format();
    let mut config: StreamConfig = supported.into();
    if let Some(frames) = requested_frames {
        config.buffer_size = BufferSize::Fixed(frames);
    }

    log::info!(
        "audio config: {} Hz, {} channels, {:?}",
        config.sample_rate.0,
        config.channels,
        sample_format
    );

    match try_build(&device, &config, sample_format, Arc::clone(&callback)) {
        Ok(stream) => Ok(stream),
        Err(e) if matches!(config.buffer_size, BufferSize::Fixed(_)) => {
            // Some hosts reject fixed buffer sizes; retry with the default.
            log::warn!("fixed buffer size rejected ({}), retrying with default buffering", e);
            config.buffer_size = BufferSize::Default;
            try_build(&device, &config, sample_format, callback)
        }
        Err(e) => Err(e),
    }
}

fn try_build(
    device: &cpal::Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    callback: AudioBufferCallback,
) -> Result<cpal::Stream, CaptureError> {
    let sample_rate = config.sample_rate.0 as f64;
    let channels = config.channels;
    let err_fn = |err| log::error!("audio stream error: {}", err);

    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            config,
            move |data: &[f32], _| callback(data, sample_rate, channels),
            err_fn,
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            config,
            move |data: &[i16], _| {
                let samples: Vec<f32> = data.iter().map(|&s| s as f32 / 32_768.0).collect();
                callback(&samples, sample_rate, channels);
            },
            err_fn,
            None,
        ),
        SampleFormat::U16 => device.build_input_stream(
            config,
            move |data: &[u16], _| {
                let samples: Vec<f32> = data.iter().map(|&s| (s as f32 - 32_768.0) / 32_768.0).collect();
                callback(&samples, sample_rate, channels);
            },
            err_fn,
            None,
        ),
        other => {
            return Err(CaptureError::EngineCreationFailed(format!(
                "unsupported sample format: {:?}",
                other
            )))
        }
    };

    stream.map_err(|e| CaptureError::EngineCreationFailed(format!("failed to build input stream: {}", e)))
}
