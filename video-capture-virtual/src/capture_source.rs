//! Synthetic camera capture source.
//!
//! Generates NV12 test-pattern frames on a dedicated `virtual-camera`
//! thread and delivers them through the `FrameCallback`, the same way a
//! hardware source delivers sample buffers from its output queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use video_capture_core::models::device::{CaptureDevice, EncoderSettings, MovieContainer, SessionPreset};
use video_capture_core::models::error::CaptureError;
use video_capture_core::models::media::{Frame, MediaTime, PixelBuffer, PixelFormat};
use video_capture_core::traits::capture_source::{CaptureSource, FrameCallback};

/// Camera-less capture source.
///
/// Input and preset changes are only accepted inside a
/// `begin_configuration` / `commit_configuration` pair.
pub struct VirtualCaptureSource {
    frame_rate: u32,
    has_output: bool,
    input: Option<CaptureDevice>,
    preset: SessionPreset,
    in_configuration: bool,
    running: Arc<AtomicBool>,
    capture_handle: Option<thread::JoinHandle<()>>,
}

impl VirtualCaptureSource {
    pub fn new(frame_rate: u32) -> Self {
        Self {
            frame_rate: frame_rate.max(1),
            has_output: true,
            input: None,
            preset: SessionPreset::Vga640x480,
            in_configuration: false,
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: None,
        }
    }

    /// A source whose video output could not be attached.
    pub fn without_output(frame_rate: u32) -> Self {
        let mut source = Self::new(frame_rate);
        source.has_output = false;
        source
    }

    fn require_configuration(&self, what: &str) -> Result<(), CaptureError> {
        if self.in_configuration {
            Ok(())
        } else {
            Err(CaptureError::ConfigurationFailed(format!(
                "{} outside begin/commit configuration",
                what
            )))
        }
    }
}

impl CaptureSource for VirtualCaptureSource {
    fn has_video_output(&self) -> bool {
        self.has_output
    }

    fn active_input(&self) -> Option<CaptureDevice> {
        self.input.clone()
    }

    fn begin_configuration(&mut self) {
        self.in_configuration = true;
    }

    fn commit_configuration(&mut self) {
        self.in_configuration = false;
    }

    fn remove_input(&mut self, device: &CaptureDevice) {
        if self.input.as_ref() == Some(device) {
            log::debug!("Removing input {}", device.localized_name);
            self.input = None;
        }
    }

    fn can_add_input(&self, _device: &CaptureDevice) -> bool {
        self.input.is_none()
    }

    fn add_input(&mut self, device: &CaptureDevice) -> Result<(), CaptureError> {
        self.require_configuration("add_input")?;
        if self.input.is_some() {
            return Err(CaptureError::ConfigurationFailed("source already has an input".into()));
        }
        log::debug!("Adding input {}", device.localized_name);
        self.input = Some(device.clone());
        Ok(())
    }

    fn can_set_session_preset(&self, _preset: SessionPreset) -> bool {
        self.in_configuration
    }

    fn set_session_preset(&mut self, preset: SessionPreset) {
        if self.in_configuration {
            self.preset = preset;
        } else {
            log::warn!("Ignoring preset {:?} outside configuration", preset);
        }
    }

    fn recommended_encoder_settings(&self, _container: MovieContainer) -> Option<EncoderSettings> {
        if !self.has_output {
            return None;
        }
        let (width, height) = self.preset.dimensions();
        Some(EncoderSettings {
            codec: "h264".into(),
            width,
            height,
            average_bit_rate: Some(width * height * 4),
        })
    }

    fn start_running(&mut self, callback: FrameCallback) -> Result<(), CaptureError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CaptureError::ConfigurationFailed("virtual camera already running".into()));
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let (width, height) = self.preset.dimensions();
        let frame_rate = self.frame_rate;

        let handle = thread::Builder::new()
            .name("virtual-camera".into())
            .spawn(move || {
                frame_loop(&running, width, height, frame_rate, &callback);
                running.store(false, Ordering::SeqCst);
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                CaptureError::Unknown(format!("failed to spawn camera thread: {}", e))
            })?;

        self.capture_handle = Some(handle);
        log::info!("Virtual camera started: {}x{} @ {} fps", width, height, frame_rate);
        Ok(())
    }

    fn stop_running(&mut self) -> Result<(), CaptureError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.capture_handle.take() {
            if handle.join().is_err() {
                return Err(CaptureError::Unknown("virtual camera thread panicked".into()));
            }
            log::info!("Virtual camera stopped");
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for VirtualCaptureSource {
    fn drop(&mut self) {
        let _ = self.stop_running();
    }
}

/// Deliver frames until `running` clears. Timestamps count frames at
/// `frame_rate`, starting at zero for each run.
fn frame_loop(running: &AtomicBool, width: u32, height: u32, frame_rate: u32, callback: &FrameCallback) {
    let interval = Duration::from_secs_f64(1.0 / frame_rate as f64);
    let started = Instant::now();
    let mut index: u64 = 0;

    while running.load(Ordering::SeqCst) {
        let buffer = test_pattern(width, height, index);
        let timestamp = MediaTime::new(index as i64, frame_rate as i32);
        callback(Frame::new(buffer, timestamp));

        index += 1;
        let due = started + interval.mul_f64(index as f64);
        let now = Instant::now();
        if due > now {
            thread::sleep(due - now);
        }
    }
    log::debug!("Virtual camera delivered {} frames", index);
}

/// Full-range NV12 frame: a horizontal luma ramp that scrolls one column per
/// frame over neutral chroma.
pub fn test_pattern(width: u32, height: u32, index: u64) -> PixelBuffer {
    let format = PixelFormat::Nv12FullRange;
    let luma_len = width as usize * height as usize;
    let mut data = vec![128u8; format.buffer_len(width, height)];

    if width > 0 {
        for row in data[..luma_len].chunks_mut(width as usize) {
            for (x, px) in row.iter_mut().enumerate() {
                let column = (x as u64 + index) % width as u64;
                *px = (column * 255 / width as u64) as u8;
            }
        }
    }
    PixelBuffer::new(width, height, format, data)
}
