//! Hand-written doubles for the collaborator traits, shared by unit tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::models::device::{CaptureDevice, EncoderSettings, MovieContainer, SessionPreset, WriterSettings};
use crate::models::error::CaptureError;
use crate::models::media::{Frame, MediaTime, PixelBuffer, PixelFormat};
use crate::models::recording_result::RecordingResult;
use crate::models::state::CaptureState;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::capture_source::{CaptureSource, FrameCallback};
use crate::traits::device_catalog::DeviceCatalog;
use crate::traits::frame_delegate::FrameDelegate;
use crate::traits::movie_writer::{MovieWriter, MovieWriterFactory};
use crate::traits::photo_library::{AuthorizationStatus, PhotoLibrary};

pub fn frame_at(seconds: f64) -> Frame {
    let buffer = PixelBuffer::new(4, 2, PixelFormat::Nv12FullRange, vec![0x10u8; 12]);
    Frame::new(buffer, MediaTime::from_seconds(seconds, 1_000_000))
}

pub fn unique_temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("video_capture_test_{}_{}", name, uuid::Uuid::new_v4()))
}

pub fn two_camera_devices() -> Vec<CaptureDevice> {
    use crate::models::device::DevicePosition;
    vec![
        CaptureDevice::new("back-id", "Back Camera", DevicePosition::Back),
        CaptureDevice::new("front-id", "Front Camera", DevicePosition::Front),
    ]
}

// --- Device catalog ---

pub struct MockCatalog {
    devices: Vec<CaptureDevice>,
}

impl MockCatalog {
    pub fn new(devices: Vec<CaptureDevice>) -> Self {
        Self { devices }
    }
}

impl DeviceCatalog for MockCatalog {
    fn video_devices(&self) -> Vec<CaptureDevice> {
        self.devices.clone()
    }
}

// --- Capture source ---

#[derive(Debug, Clone, Default)]
pub struct SourceLog {
    pub configurations: usize,
    pub in_transaction: bool,
    pub removed: Vec<String>,
    pub presets: Vec<SessionPreset>,
    pub starts: usize,
    pub stops: usize,
}

pub struct MockSource {
    input: Option<CaptureDevice>,
    running: bool,
    callback: Arc<Mutex<Option<FrameCallback>>>,
    log: Arc<Mutex<SourceLog>>,
    pub has_output: bool,
    pub fail_add_input: bool,
    pub encoder_settings: Option<EncoderSettings>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            input: None,
            running: false,
            callback: Arc::new(Mutex::new(None)),
            log: Arc::new(Mutex::new(SourceLog::default())),
            has_output: true,
            fail_add_input: false,
            encoder_settings: Some(EncoderSettings {
                codec: "h264".into(),
                width: 640,
                height: 480,
                average_bit_rate: Some(2_000_000),
            }),
        }
    }

    pub fn log(&self) -> SourceLog {
        self.log.lock().clone()
    }

    /// Handle that survives moving the source into a controller.
    pub fn handle(&self) -> MockSourceHandle {
        MockSourceHandle {
            callback: Arc::clone(&self.callback),
            log: Arc::clone(&self.log),
        }
    }
}

impl CaptureSource for MockSource {
    fn has_video_output(&self) -> bool {
        self.has_output
    }

    fn active_input(&self) -> Option<CaptureDevice> {
        self.input.clone()
    }

    fn begin_configuration(&mut self) {
        self.log.lock().in_transaction = true;
    }

    fn commit_configuration(&mut self) {
        self.log.lock().in_transaction = false;
    }

    fn remove_input(&mut self, device: &CaptureDevice) {
        assert!(self.log.lock().in_transaction, "input removed outside a transaction");
        self.log.lock().removed.push(device.unique_id.clone());
        self.input = None;
    }

    fn can_add_input(&self, _device: &CaptureDevice) -> bool {
        true
    }

    fn add_input(&mut self, device: &CaptureDevice) -> Result<(), CaptureError> {
        if self.fail_add_input {
            return Err(CaptureError::DeviceNotAvailable);
        }
        let mut log = self.log.lock();
        assert!(log.in_transaction, "input added outside a transaction");
        log.configurations += 1;
        self.input = Some(device.clone());
        Ok(())
    }

    fn can_set_session_preset(&self, _preset: SessionPreset) -> bool {
        true
    }

    fn set_session_preset(&mut self, preset: SessionPreset) {
        self.log.lock().presets.push(preset);
    }

    fn recommended_encoder_settings(&self, _container: MovieContainer) -> Option<EncoderSettings> {
        self.encoder_settings.clone()
    }

    fn start_running(&mut self, callback: FrameCallback) -> Result<(), CaptureError> {
        *self.callback.lock() = Some(callback);
        self.running = true;
        self.log.lock().starts += 1;
        Ok(())
    }

    fn stop_running(&mut self) -> Result<(), CaptureError> {
        *self.callback.lock() = None;
        self.running = false;
        self.log.lock().stops += 1;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[derive(Clone)]
pub struct MockSourceHandle {
    callback: Arc<Mutex<Option<FrameCallback>>>,
    log: Arc<Mutex<SourceLog>>,
}

impl MockSourceHandle {
    /// Deliver a frame the way the capture pipeline would. Returns false if
    /// the source is not running.
    pub fn deliver(&self, frame: Frame) -> bool {
        let callback = self.callback.lock().clone();
        match callback {
            Some(cb) => {
                cb(frame);
                true
            }
            None => false,
        }
    }

    pub fn log(&self) -> SourceLog {
        self.log.lock().clone()
    }

    /// The callback of the current run, kept alive past a stop.
    pub fn callback(&self) -> Option<FrameCallback> {
        self.callback.lock().clone()
    }
}

// --- Movie writer ---

#[derive(Debug, Default)]
struct WriterLog {
    created: usize,
    appended: Vec<MediaTime>,
    last_settings: Option<WriterSettings>,
    not_ready: bool,
    fail_create: bool,
    fail_start: bool,
    fail_append: bool,
    append_delay: Option<Duration>,
    finished: usize,
}

#[derive(Clone, Default)]
pub struct MockWriterFactory {
    log: Arc<Mutex<WriterLog>>,
}

impl MockWriterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.log.lock().created
    }

    pub fn appended(&self) -> Vec<MediaTime> {
        self.log.lock().appended.clone()
    }

    pub fn finished(&self) -> usize {
        self.log.lock().finished
    }

    pub fn last_settings(&self) -> Option<WriterSettings> {
        self.log.lock().last_settings.clone()
    }

    pub fn set_ready(&self, ready: bool) {
        self.log.lock().not_ready = !ready;
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.log.lock().fail_create = fail;
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.log.lock().fail_start = fail;
    }

    pub fn set_fail_append(&self, fail: bool) {
        self.log.lock().fail_append = fail;
    }

    /// Make every append take `delay`, like an encoder that cannot keep up.
    pub fn set_append_delay(&self, delay: Duration) {
        self.log.lock().append_delay = Some(delay);
    }
}

impl MovieWriterFactory for MockWriterFactory {
    fn create(&self, path: &Path, settings: &WriterSettings) -> Result<Box<dyn MovieWriter>, CaptureError> {
        let mut log = self.log.lock();
        if log.fail_create {
            return Err(CaptureError::WriterCreationFailed("mock refused".into()));
        }
        // Like a real writer, creation leaves a file behind.
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CaptureError::WriterCreationFailed(e.to_string()))?;
        }
        fs::write(path, b"").map_err(|e| CaptureError::WriterCreationFailed(e.to_string()))?;
        log.created += 1;
        log.last_settings = Some(settings.clone());
        Ok(Box::new(MockWriter {
            path: path.to_path_buf(),
            log: Arc::clone(&self.log),
            finished: false,
        }))
    }
}

struct MockWriter {
    path: PathBuf,
    log: Arc<Mutex<WriterLog>>,
    finished: bool,
}

impl MovieWriter for MockWriter {
    fn start_session(&mut self, _at: MediaTime) -> Result<(), CaptureError> {
        if self.log.lock().fail_start {
            return Err(CaptureError::WriterCreationFailed("mock session refused".into()));
        }
        Ok(())
    }

    fn is_ready_for_more_media_data(&self) -> bool {
        !self.finished && !self.log.lock().not_ready
    }

    fn append(&mut self, _buffer: &PixelBuffer, presentation_time: MediaTime) -> Result<(), CaptureError> {
        let delay = self.log.lock().append_delay;
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        let mut log = self.log.lock();
        if log.fail_append {
            return Err(CaptureError::AppendFailed("mock refused".into()));
        }
        log.appended.push(presentation_time);
        Ok(())
    }

    fn mark_as_finished(&mut self) {
        self.finished = true;
    }

    fn finish_writing(&mut self) -> Result<PathBuf, CaptureError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CaptureError::StorageError(e.to_string()))?;
        }
        fs::write(&self.path, b"mock movie").map_err(|e| CaptureError::StorageError(e.to_string()))?;
        self.log.lock().finished += 1;
        Ok(self.path.clone())
    }
}

// --- Photo library ---

#[derive(Debug)]
struct LibraryLog {
    status: AuthorizationStatus,
    answer: AuthorizationStatus,
    requests: usize,
    saved: Vec<PathBuf>,
    fail_save: bool,
}

#[derive(Clone)]
pub struct MockLibrary {
    log: Arc<Mutex<LibraryLog>>,
}

impl MockLibrary {
    pub fn new(status: AuthorizationStatus, answer: AuthorizationStatus) -> Self {
        Self {
            log: Arc::new(Mutex::new(LibraryLog {
                status,
                answer,
                requests: 0,
                saved: Vec::new(),
                fail_save: false,
            })),
        }
    }

    pub fn authorized() -> Self {
        Self::new(AuthorizationStatus::Authorized, AuthorizationStatus::Authorized)
    }

    pub fn requests(&self) -> usize {
        self.log.lock().requests
    }

    pub fn saved(&self) -> Vec<PathBuf> {
        self.log.lock().saved.clone()
    }

    pub fn set_fail_save(&self, fail: bool) {
        self.log.lock().fail_save = fail;
    }
}

impl PhotoLibrary for MockLibrary {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.log.lock().status
    }

    fn request_authorization(&self) -> AuthorizationStatus {
        let mut log = self.log.lock();
        log.requests += 1;
        log.status = log.answer;
        log.answer
    }

    fn save_video(&self, path: &Path) -> Result<(), CaptureError> {
        let mut log = self.log.lock();
        if log.fail_save {
            return Err(CaptureError::SaveFailed("mock library error".into()));
        }
        log.saved.push(path.to_path_buf());
        Ok(())
    }
}

// --- Delegates ---

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    State(CaptureState),
    Error(CaptureError),
    Finished(RecordingResult),
    Frame { rotation: u32, timestamp: MediaTime },
}

/// Delegate that turns every callback into an `Event` on a channel.
pub struct ChannelDelegate {
    tx: Sender<Event>,
}

impl ChannelDelegate {
    pub fn new() -> (Arc<Self>, Receiver<Event>) {
        let (tx, rx) = unbounded();
        (Arc::new(Self { tx }), rx)
    }
}

impl CaptureDelegate for ChannelDelegate {
    fn on_state_changed(&self, state: &CaptureState) {
        let _ = self.tx.send(Event::State(*state));
    }

    fn on_error(&self, error: &CaptureError) {
        let _ = self.tx.send(Event::Error(error.clone()));
    }

    fn on_capture_finished(&self, result: &RecordingResult) {
        let _ = self.tx.send(Event::Finished(result.clone()));
    }
}

impl FrameDelegate for ChannelDelegate {
    fn on_frame(&self, _buffer: &PixelBuffer, rotation_degrees: u32, timestamp: MediaTime) {
        let _ = self.tx.send(Event::Frame {
            rotation: rotation_degrees,
            timestamp,
        });
    }
}

/// Wait for the first event matching `pred`, skipping the rest.
pub fn wait_for(rx: &Receiver<Event>, pred: impl Fn(&Event) -> bool) -> Option<Event> {
    loop {
        match rx.recv_timeout(Duration::from_secs(5)) {
            Ok(event) if pred(&event) => return Some(event),
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
}
