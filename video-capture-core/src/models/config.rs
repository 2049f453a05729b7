use std::path::PathBuf;

use super::camera::Camera;
use super::device::{MovieContainer, SessionPreset};

/// Configuration for a capture controller.
#[derive(Debug, Clone)]
pub struct CaptureConfiguration {
    /// Directory where movie files are created (application document storage).
    pub output_directory: PathBuf,

    /// Output container (default: mov).
    pub container: MovieContainer,

    /// Capture resolution applied on start (default: 640x480).
    pub session_preset: SessionPreset,

    /// Timescale for writer presentation times (default: 600).
    pub media_timescale: i32,

    /// Rotation reported to the frame delegate and baked into the movie
    /// track (default: 90). Valid values: 0, 90, 180, 270.
    pub rotation_degrees: u32,

    /// Camera used by `switch_camera` before any explicit start.
    pub default_camera: Camera,

    /// Arm a recording as soon as capture starts (default: false).
    pub record_on_start: bool,

    /// Write a JSON sidecar next to each finalized movie (default: true).
    pub write_metadata: bool,
}

impl CaptureConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.media_timescale <= 0 {
            return Err(format!("media timescale must be positive: {}", self.media_timescale));
        }
        if ![0, 90, 180, 270].contains(&self.rotation_degrees) {
            return Err(format!("unsupported rotation: {}", self.rotation_degrees));
        }
        if self.output_directory.as_os_str().is_empty() {
            return Err("output directory must not be empty".into());
        }
        Ok(())
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("."),
            container: MovieContainer::Mov,
            session_preset: SessionPreset::Vga640x480,
            media_timescale: 600,
            rotation_degrees: 90,
            default_camera: Camera::default_camera(),
            record_on_start: false,
            write_metadata: true,
        }
    }
}
