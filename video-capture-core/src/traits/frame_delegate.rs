use crate::models::media::{MediaTime, PixelBuffer};

/// Live consumer of every captured frame (e.g. a video-call SDK).
///
/// Invoked on the delegate dispatch thread, independent of recording state.
pub trait FrameDelegate: Send + Sync {
    fn on_frame(&self, buffer: &PixelBuffer, rotation_degrees: u32, timestamp: MediaTime);
}
