use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::CaptureState;

/// Event delegate for recording lifecycle notifications.
///
/// Called from the capture queue or a finalize thread, never the UI thread.
/// Implementations should marshal to the UI thread if needed.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the recording state changes.
    fn on_state_changed(&self, state: &CaptureState);

    /// Called when writer creation, finalization, authorization or save fails.
    fn on_error(&self, error: &CaptureError);

    /// Called when a recording has been finalized and saved to the photo library.
    fn on_capture_finished(&self, result: &RecordingResult);
}
