use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::config::CaptureConfig;
use crate::models::diagnostics::CaptureDiagnostics;
use crate::models::error::CaptureError;
use crate::models::recording::SoundRecording;
use crate::models::state::CaptureState;
use crate::processing::level::level_from_samples;
use crate::processing::sample_feed::SampleFeed;
use crate::processing::wav;
use crate::storage::metadata::{self, RecordingMetadata};
use crate::storage::wav_writer::WavFileWriter;
use crate::traits::delegate::CaptureDelegate;
use crate::traits::permission::{PermissionProvider, PermissionStatus};
use crate::traits::provider::{AudioBufferCallback, CaptureProvider};
use crate::traits::session::AudioSessionController;

/// Timer period for duration updates.
const DURATION_TICK: Duration = Duration::from_millis(100);

/// Internal mutable recorder state, protected by `parking_lot::Mutex`.
struct RecorderState {
    state: CaptureState,
    audio_level: f32,
    permission_granted: bool,
    last_error: Option<String>,
    capture_start: Option<Instant>,
    detected_rate: Option<f64>,
    diagnostics: CaptureDiagnostics,
}

impl RecorderState {
    fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            audio_level: 0.0,
            permission_granted: false,
            last_error: None,
            capture_start: None,
            detected_rate: None,
            diagnostics: CaptureDiagnostics::default(),
        }
    }

    fn elapsed_duration(&self) -> f64 {
        match self.capture_start {
            Some(start) => start.elapsed().as_secs_f64(),
            None => 0.0,
        }
    }
}

/// Ambient sound recorder.
///
/// Generic over the platform capabilities (`CaptureProvider`,
/// `AudioSessionController`, `PermissionProvider`) so the session state
/// machine runs unchanged against real hardware or scripted test doubles.
///
/// Data flow while a session is open:
/// ```text
/// [Capture Provider] → per-buffer callback
///         ├→ level meter → published audio level
///         ├→ SampleFeed  → classification consumer (best-effort)
///         └→ i16 PCM     → WavFileWriter (append failures swallowed)
/// ```
///
/// One recorder owns at most one live session; `start` while recording is
/// rejected and `stop` without a session is a no-op. The recorder is meant
/// to be constructed once by whatever composes the application and passed
/// down explicitly.
pub struct SoundRecorder<P: CaptureProvider, S: AudioSessionController, M: PermissionProvider> {
    provider: P,
    session: S,
    permission: M,
    config: CaptureConfig,
    shared: Arc<Mutex<RecorderState>>,
    feed: Arc<SampleFeed>,
    writer: Arc<Mutex<Option<WavFileWriter>>>,
    delegate: Option<Arc<dyn CaptureDelegate>>,

    // Duration timer thread control
    timer_running: Arc<AtomicBool>,
    timer_handle: Option<thread::JoinHandle<()>>,

    session_active: bool,
    file_path: Option<PathBuf>,
}

impl<P: CaptureProvider, S: AudioSessionController, M: PermissionProvider> SoundRecorder<P, S, M> {
    pub fn new(provider: P, session: S, permission: M, config: CaptureConfig) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::InvalidConfiguration)?;
        let feed_capacity = config.feed_capacity;
        Ok(Self {
            provider,
            session,
            permission,
            config,
            shared: Arc::new(Mutex::new(RecorderState::new())),
            feed: Arc::new(SampleFeed::new(feed_capacity)),
            writer: Arc::new(Mutex::new(None)),
            delegate: None,
            timer_running: Arc::new(AtomicBool::new(false)),
            timer_handle: None,
            session_active: false,
            file_path: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        self.delegate = Some(delegate);
    }

    // --- Published state ---

    pub fn state(&self) -> CaptureState {
        self.shared.lock().state.clone()
    }

    pub fn is_recording(&self) -> bool {
        self.shared.lock().state.is_recording()
    }

    pub fn audio_level(&self) -> f32 {
        self.shared.lock().audio_level
    }

    pub fn duration_secs(&self) -> f64 {
        self.shared.lock().elapsed_duration()
    }

    pub fn permission_granted(&self) -> bool {
        self.shared.lock().permission_granted
    }

    pub fn last_error(&self) -> Option<String> {
        self.shared.lock().last_error.clone()
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        let mut diagnostics = self.shared.lock().diagnostics.clone();
        diagnostics.feed_drops = self.feed.dropped();
        diagnostics
    }

    /// Handle for the classification consumer to drain captured buffers.
    pub fn sample_feed(&self) -> Arc<SampleFeed> {
        Arc::clone(&self.feed)
    }

    // --- Permission ---

    /// Query microphone permission, issuing a one-time request when the
    /// host reports it undetermined. The result is cached and gates
    /// `start` until the next explicit check.
    pub fn check_permission(&mut self) -> bool {
        let granted = match self.permission.status() {
            PermissionStatus::Granted => true,
            PermissionStatus::Denied => false,
            PermissionStatus::Undetermined => self.permission.request(),
        };
        self.shared.lock().permission_granted = granted;
        granted
    }

    // --- Recording control ---

    /// Open a capture session and return the path of the output file.
    ///
    /// Fails closed on the cached permission state without touching the
    /// engine. On any failure after partial allocation, every resource
    /// acquired so far (session activation, output file) is released and
    /// no state is retained.
    pub fn start(&mut self) -> Result<PathBuf, CaptureError> {
        {
            let shared = self.shared.lock();
            if !shared.permission_granted {
                drop(shared);
                return Err(self.fail(CaptureError::PermissionDenied));
            }
            if !shared.state.is_idle() {
                drop(shared);
                return Err(self.fail(CaptureError::AlreadyRecording));
            }
        }

        if !self.provider.is_available() {
            return Err(self.fail(CaptureError::InputUnavailable));
        }

        self.session.activate().map_err(|e| self.fail(e))?;
        self.session_active = true;

        let file_path = self.recording_file_path();
        let mut writer = WavFileWriter::new(file_path.clone());
        if let Err(e) = writer.open(
            self.config.sample_rate as u32,
            self.config.bit_depth,
            self.config.channels,
        ) {
            let _ = writer.discard();
            self.deactivate_session();
            return Err(self.fail(e));
        }
        *self.writer.lock() = Some(writer);
        self.file_path = Some(file_path.clone());

        // A new session must not deliver buffers captured by the last one.
        self.feed.clear();

        let callback = self.make_buffer_callback();
        if let Err(e) = self.provider.start(callback) {
            if let Some(mut writer) = self.writer.lock().take() {
                let _ = writer.discard();
            }
            self.file_path = None;
            self.deactivate_session();
            return Err(self.fail(e));
        }

        {
            let mut shared = self.shared.lock();
            shared.capture_start = Some(Instant::now());
            shared.detected_rate = None;
            shared.audio_level = 0.0;
            shared.last_error = None;
            shared.diagnostics = CaptureDiagnostics::default();
            shared.state = CaptureState::Recording { duration_secs: 0.0 };
        }
        self.notify_state(&CaptureState::Recording { duration_secs: 0.0 });

        self.start_duration_timer();

        Ok(file_path)
    }

    /// Close the capture session.
    ///
    /// Returns `None` when no session is open (no-op) and when the
    /// elapsed duration does not exceed the configured minimum, in which
    /// case the output file is deleted. All engine, timer, and file
    /// resources are released on every path.
    pub fn stop(&mut self) -> Result<Option<SoundRecording>, CaptureError> {
        {
            let shared = self.shared.lock();
            if !shared.state.is_recording() {
                return Ok(None);
            }
        }
        self.set_state(CaptureState::Stopping);

        if let Err(e) = self.provider.stop() {
            log::warn!("capture provider stop failed: {}", e);
        }

        self.stop_duration_timer();

        let (duration, detected_rate) = {
            let mut shared = self.shared.lock();
            let duration = shared.elapsed_duration();
            shared.capture_start = None;
            (duration, shared.detected_rate)
        };

        self.deactivate_session();

        let file_path = self.file_path.take();
        let writer = self.writer.lock().take();

        let mut recording = None;
        let mut failure = None;
        if let (Some(mut writer), Some(path)) = (writer, file_path) {
            if duration > self.config.min_duration_secs {
                match writer.close(detected_rate, self.config.channels, self.config.bit_depth) {
                    Ok(checksum) => {
                        let descriptor = SoundRecording::unclassified(duration, &path);
                        let sidecar = RecordingMetadata {
                            recording: descriptor.clone(),
                            checksum,
                        };
                        if let Err(e) = metadata::write_metadata(&sidecar, &path) {
                            log::warn!("failed to write metadata sidecar: {}", e);
                        }
                        recording = Some(descriptor);
                    }
                    Err(e) => {
                        let _ = writer.discard();
                        failure = Some(e);
                    }
                }
            } else {
                // Too short to keep; remove the file rather than orphan it.
                if let Err(e) = writer.discard() {
                    log::warn!("failed to remove discarded recording: {}", e);
                }
            }
        }

        {
            let mut shared = self.shared.lock();
            shared.audio_level = 0.0;
            shared.detected_rate = None;
            shared.state = CaptureState::Idle;
        }
        self.notify_state(&CaptureState::Idle);

        if let Some(e) = failure {
            return Err(self.fail(e));
        }
        if let Some(ref descriptor) = recording {
            if let Some(ref delegate) = self.delegate {
                delegate.on_recording_finished(descriptor);
            }
        }
        Ok(recording)
    }

    // --- Internal helpers ---

    /// Callback installed on the capture provider. Runs on the provider's
    /// audio context: meters, feeds the classifier queue, and appends PCM
    /// to the output file. A failed disk append is logged and counted but
    /// never interrupts live capture.
    fn make_buffer_callback(&self) -> AudioBufferCallback {
        let shared = Arc::clone(&self.shared);
        let writer = Arc::clone(&self.writer);
        let feed = Arc::clone(&self.feed);
        let gain = self.config.level_gain;

        Arc::new(move |samples: &[f32], sample_rate: f64, channels: u16| {
            let mono = if channels > 1 {
                wav::downmix_to_mono(samples, channels as usize)
            } else {
                samples.to_vec()
            };

            let level = level_from_samples(&mono, gain);
            {
                let mut s = shared.lock();
                if !s.state.is_recording() {
                    return;
                }
                s.audio_level = level;
                if s.detected_rate.is_none() {
                    s.detected_rate = Some(sample_rate);
                }
                s.diagnostics.callback_count += 1;
                s.diagnostics.samples_total += mono.len() as u64;
            }

            let pcm = wav::convert_to_i16_pcm(&mono);

            // Verbatim copy for the classification consumer.
            feed.push(mono);

            let mut writer_guard = writer.lock();
            if let Some(ref mut writer) = *writer_guard {
                match writer.write(&pcm) {
                    Ok(()) => {
                        shared.lock().diagnostics.bytes_written += pcm.len() as u64;
                    }
                    Err(e) => {
                        log::error!("audio file append failed: {}", e);
                        shared.lock().diagnostics.write_failures += 1;
                    }
                }
            }
        })
    }

    /// Start the duration update timer.
    fn start_duration_timer(&mut self) {
        self.timer_running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.timer_running);
        let shared = Arc::clone(&self.shared);
        let delegate = self.delegate.clone();

        let handle = thread::Builder::new()
            .name("capture-duration".into())
            .spawn(move || {
                while running.load(Ordering::SeqCst) {
                    thread::sleep(DURATION_TICK);

                    let mut s = shared.lock();
                    if let CaptureState::Recording { .. } = s.state {
                        let duration_secs = s.elapsed_duration();
                        s.state = CaptureState::Recording { duration_secs };
                        let level = s.audio_level;
                        drop(s);

                        if let Some(ref delegate) = delegate {
                            delegate.on_state_changed(&CaptureState::Recording { duration_secs });
                            delegate.on_level(level);
                        }
                    }
                }
            })
            .expect("failed to spawn timer thread");

        self.timer_handle = Some(handle);
    }

    fn stop_duration_timer(&mut self) {
        self.timer_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.timer_handle.take() {
            let _ = handle.join();
        }
    }

    /// Best-effort session deactivation; failures are logged, not escalated.
    fn deactivate_session(&mut self) {
        if self.session_active {
            if let Err(e) = self.session.deactivate() {
                log::warn!("audio session deactivation failed: {}", e);
            }
            self.session_active = false;
        }
    }

    fn recording_file_path(&self) -> PathBuf {
        let stamp = chrono::Utc::now().timestamp_millis();
        self.config
            .output_directory
            .join(format!("recording_{}.wav", stamp))
    }

    fn set_state(&self, new_state: CaptureState) {
        self.shared.lock().state = new_state.clone();
        self.notify_state(&new_state);
    }

    fn notify_state(&self, state: &CaptureState) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(state);
        }
    }

    /// Publish an error to observers and hand it back to the caller.
    fn fail(&self, error: CaptureError) -> CaptureError {
        self.shared.lock().last_error = Some(error.to_string());
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(&error);
        }
        error
    }
}

impl<P: CaptureProvider, S: AudioSessionController, M: PermissionProvider> Drop for SoundRecorder<P, S, M> {
    fn drop(&mut self) {
        if self.shared.lock().state.is_recording() {
            if let Err(e) = self.stop() {
                log::warn!("failed to stop recording during drop: {}", e);
            }
        }
    }
}
