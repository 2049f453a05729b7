use std::fs;
use std::path::PathBuf;

use crate::models::camera::Camera;
use crate::models::config::CaptureConfiguration;
use crate::models::device::{MovieContainer, WriterSettings};
use crate::models::error::CaptureError;
use crate::models::media::{Frame, MediaTime};
use crate::models::state::CaptureState;
use crate::traits::capture_source::CaptureSource;
use crate::traits::movie_writer::{MovieWriter, MovieWriterFactory};

/// An open recording: the writer plus the bookkeeping needed to place frames.
pub struct RecordingSession {
    pub file_path: PathBuf,
    pub writer: Box<dyn MovieWriter>,
    pub settings: WriterSettings,
    /// Timestamp of the frame that primed the session, in seconds.
    pub baseline_seconds: f64,
    pub frames_appended: u64,
    pub frames_dropped: u64,
    pub last_presentation_time: MediaTime,
    pub camera: Option<Camera>,
}

impl RecordingSession {
    pub fn duration_secs(&self) -> f64 {
        self.last_presentation_time.seconds()
    }
}

impl std::fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSession")
            .field("file_path", &self.file_path)
            .field("baseline_seconds", &self.baseline_seconds)
            .field("frames_appended", &self.frames_appended)
            .field("frames_dropped", &self.frames_dropped)
            .finish_non_exhaustive()
    }
}

/// What a single frame did to the recording.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Not recording; the frame only went to the live delegate.
    Ignored,
    /// A new movie file was opened and primed with this frame.
    Opened(PathBuf),
    Appended(MediaTime),
    /// The writer was not ready (or refused the frame); nothing was written.
    Dropped,
    /// Opening the writer failed; the state is back to idle.
    Failed(CaptureError),
}

/// Four-state recording lifecycle driven by the user trigger and by frames.
///
/// Owned by the capture queue. Nothing else mutates it.
pub struct RecordingStateMachine {
    state: CaptureState,
    session: Option<RecordingSession>,
    output_directory: PathBuf,
    container: MovieContainer,
    media_timescale: i32,
    rotation_degrees: u32,
    camera: Option<Camera>,
}

impl RecordingStateMachine {
    pub fn new(config: &CaptureConfiguration) -> Self {
        Self {
            state: CaptureState::Idle,
            session: None,
            output_directory: config.output_directory.clone(),
            container: config.container,
            media_timescale: config.media_timescale,
            rotation_degrees: config.rotation_degrees,
            camera: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    /// Camera recorded into the metadata of sessions opened from now on.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    /// Add frames lost before reaching the machine to the open recording.
    ///
    /// Returns false when no recording is open; the count is discarded.
    pub fn record_dropped(&mut self, count: u64) -> bool {
        match self.session.as_mut() {
            Some(session) if self.state == CaptureState::Capturing => {
                session.frames_dropped += count;
                true
            }
            _ => false,
        }
    }

    /// User capture action: idle → start, capturing → end.
    ///
    /// Returns the closed session when the trigger ends a recording.
    pub fn trigger(&mut self) -> Option<RecordingSession> {
        let next = self.state.on_trigger();
        if next == self.state {
            return None;
        }
        log::debug!("Capture state {} -> {}", self.state.as_str(), next.as_str());
        self.state = next;
        if next == CaptureState::End {
            self.session.take()
        } else {
            None
        }
    }

    /// Force the lifecycle to `end`, returning any open session.
    pub fn force_end(&mut self) -> Option<RecordingSession> {
        if self.state != CaptureState::End {
            log::debug!("Capture state {} -> end (stop)", self.state.as_str());
        }
        self.state = CaptureState::End;
        self.session.take()
    }

    /// Ready a finished lifecycle for a new capture. Only `end` is reset.
    pub fn reset(&mut self) -> bool {
        if self.state == CaptureState::End {
            log::debug!("Capture state end -> idle (new capture)");
            self.state = CaptureState::Idle;
            return true;
        }
        false
    }

    /// Per-frame step.
    ///
    /// In `start` the frame opens the writer (settings borrowed from the
    /// source) and becomes the timestamp baseline. In `capturing` the frame
    /// is appended relative to the baseline, or dropped if the writer is not
    /// ready. Other states ignore frames.
    pub fn handle_frame(
        &mut self,
        frame: &Frame,
        factory: &dyn MovieWriterFactory,
        source: &dyn CaptureSource,
    ) -> FrameOutcome {
        let opened = match self.state {
            CaptureState::Start => match self.open_session(frame, factory, source) {
                Ok(path) => Some(path),
                Err(e) => {
                    log::error!("Failed to open recording: {}", e);
                    log::debug!("Capture state start -> idle (writer failed)");
                    self.state = CaptureState::Idle;
                    return FrameOutcome::Failed(e);
                }
            },
            CaptureState::Capturing => None,
            CaptureState::Idle | CaptureState::End => return FrameOutcome::Ignored,
        };

        let appended = self.append(frame);
        match (opened, appended) {
            (Some(path), _) => FrameOutcome::Opened(path),
            (None, Some(time)) => FrameOutcome::Appended(time),
            (None, None) => FrameOutcome::Dropped,
        }
    }

    fn open_session(
        &mut self,
        frame: &Frame,
        factory: &dyn MovieWriterFactory,
        source: &dyn CaptureSource,
    ) -> Result<PathBuf, CaptureError> {
        let encoder = source.recommended_encoder_settings(self.container).ok_or_else(|| {
            CaptureError::WriterCreationFailed("video output has no recommended encoder settings".into())
        })?;

        let file_name = uuid::Uuid::new_v4().to_string();
        let file_path = self
            .output_directory
            .join(format!("{}.{}", file_name, self.container.extension()));

        let settings = WriterSettings {
            container: self.container,
            encoder,
            rotation_degrees: self.rotation_degrees,
            media_timescale: self.media_timescale,
            expects_media_data_in_real_time: true,
        };

        let mut writer = factory.create(&file_path, &settings)?;
        if let Err(e) = writer.start_session(MediaTime::ZERO) {
            drop(writer);
            if let Err(rm) = fs::remove_file(&file_path) {
                log::warn!("Failed to remove {}: {}", file_path.display(), rm);
            }
            return Err(e);
        }

        log::info!("Recording to {}", file_path.display());

        self.session = Some(RecordingSession {
            file_path: file_path.clone(),
            writer,
            settings,
            baseline_seconds: frame.timestamp.seconds(),
            frames_appended: 0,
            frames_dropped: 0,
            last_presentation_time: MediaTime::ZERO,
            camera: self.camera,
        });
        log::debug!("Capture state start -> capturing");
        self.state = CaptureState::Capturing;
        Ok(file_path)
    }

    /// Append to the open session. `None` means the frame was dropped.
    fn append(&mut self, frame: &Frame) -> Option<MediaTime> {
        let timescale = self.media_timescale;
        let session = self.session.as_mut()?;

        if !session.writer.is_ready_for_more_media_data() {
            session.frames_dropped += 1;
            log::trace!("Writer not ready, dropping frame at {:.3}s", frame.timestamp.seconds());
            return None;
        }

        let time = MediaTime::from_seconds(frame.timestamp.seconds() - session.baseline_seconds, timescale);
        match session.writer.append(&frame.buffer, time) {
            Ok(()) => {
                session.frames_appended += 1;
                session.last_presentation_time = time;
                Some(time)
            }
            Err(e) => {
                session.frames_dropped += 1;
                log::error!("Failed to append frame: {}", e);
                None
            }
        }
    }
}
