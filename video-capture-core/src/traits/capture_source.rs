use std::sync::Arc;

use crate::models::device::{CaptureDevice, EncoderSettings, MovieContainer, SessionPreset};
use crate::models::error::CaptureError;
use crate::models::media::Frame;

/// Callback invoked for every frame the capture pipeline produces.
///
/// Fires on the source's own delivery thread. Keep processing minimal.
pub type FrameCallback = Arc<dyn Fn(Frame) + Send + Sync + 'static>;

/// A platform capture session together with its video data output.
///
/// Owned by the capture queue; every call happens on that thread.
pub trait CaptureSource: Send {
    /// Whether a video data output is attached. Without one nothing can start.
    fn has_video_output(&self) -> bool;

    /// Device backing the current input, if any.
    fn active_input(&self) -> Option<CaptureDevice>;

    /// Open a configuration transaction.
    fn begin_configuration(&mut self);

    /// Commit the changes made since `begin_configuration`.
    fn commit_configuration(&mut self);

    fn remove_input(&mut self, device: &CaptureDevice);

    fn can_add_input(&self, device: &CaptureDevice) -> bool;

    /// Create an input for `device` and install it.
    fn add_input(&mut self, device: &CaptureDevice) -> Result<(), CaptureError>;

    fn can_set_session_preset(&self, preset: SessionPreset) -> bool;

    fn set_session_preset(&mut self, preset: SessionPreset);

    /// Encoder settings the video output recommends for writing `container`.
    fn recommended_encoder_settings(&self, container: MovieContainer) -> Option<EncoderSettings>;

    /// Begin frame delivery to `callback`.
    fn start_running(&mut self, callback: FrameCallback) -> Result<(), CaptureError>;

    /// Halt frame delivery. No callback fires after this returns.
    fn stop_running(&mut self) -> Result<(), CaptureError>;

    fn is_running(&self) -> bool;
}
