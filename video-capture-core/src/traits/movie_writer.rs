use std::path::{Path, PathBuf};

use crate::models::device::WriterSettings;
use crate::models::error::CaptureError;
use crate::models::media::{MediaTime, PixelBuffer};

/// Incremental movie file writer with a single video input.
pub trait MovieWriter: Send {
    /// Start the writer session; appended times are relative to `at`.
    fn start_session(&mut self, at: MediaTime) -> Result<(), CaptureError>;

    /// Whether the input can take another frame right now.
    fn is_ready_for_more_media_data(&self) -> bool;

    fn append(&mut self, buffer: &PixelBuffer, presentation_time: MediaTime) -> Result<(), CaptureError>;

    /// No more frames will be appended.
    fn mark_as_finished(&mut self);

    /// Flush and close the file, returning its path.
    fn finish_writing(&mut self) -> Result<PathBuf, CaptureError>;
}

/// Creates movie writers. Creation is allowed to fail.
pub trait MovieWriterFactory: Send + Sync {
    fn create(&self, path: &Path, settings: &WriterSettings) -> Result<Box<dyn MovieWriter>, CaptureError>;
}
