//! # video-capture-core
//!
//! Platform-agnostic camera capture core library.
//!
//! Provides camera selection, the recording state machine, frame forwarding
//! to a video-call consumer, movie file output, and session orchestration.
//! Platform backends implement `DeviceCatalog`, `CaptureSource` and
//! `PhotoLibrary` and plug into the generic `CaptureController`.
//!
//! ## Architecture
//!
//! ```text
//! video-capture-core (this crate)
//! ├── traits/       ← CaptureSource, DeviceCatalog, MovieWriter, PhotoLibrary, delegates
//! ├── models/       ← CaptureError, CaptureState, Camera, CaptureConfiguration, media types
//! ├── selector/     ← device lookup and input switching
//! ├── recording/    ← RecordingStateMachine (idle → start → capturing → end)
//! ├── delegate/     ← DelegateForwarder (every frame, rotation applied)
//! ├── session/      ← CaptureController (capture queue orchestrator)
//! └── storage/      ← FileMovieWriter, metadata sidecar, finalize and save
//! ```

pub mod delegate;
pub mod models;
pub mod recording;
pub mod selector;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod test_support;

// Re-export key types at crate root for convenience.
pub use delegate::forwarder::DelegateForwarder;
pub use models::camera::Camera;
pub use models::config::CaptureConfiguration;
pub use models::device::{
    CaptureDevice, DevicePosition, EncoderSettings, MovieContainer, SessionPreset, WriterSettings,
};
pub use models::error::CaptureError;
pub use models::media::{Frame, MediaTime, PixelBuffer, PixelFormat};
pub use models::recording_result::{RecordingMetadata, RecordingResult};
pub use models::state::CaptureState;
pub use recording::state_machine::{FrameOutcome, RecordingSession, RecordingStateMachine};
pub use selector::device_selector::{capture_device, change_capture_device, DeviceChange};
pub use session::controller::CaptureController;
pub use storage::movie_file::{FileMovieWriter, FileMovieWriterFactory};
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::capture_source::{CaptureSource, FrameCallback};
pub use traits::device_catalog::DeviceCatalog;
pub use traits::frame_delegate::FrameDelegate;
pub use traits::movie_writer::{MovieWriter, MovieWriterFactory};
pub use traits::photo_library::{AuthorizationStatus, PhotoLibrary};
