use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::device::MovieContainer;

/// Result reported once a recording is finalized and saved.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    pub duration_secs: f64,
    pub metadata: RecordingMetadata,
    pub checksum: String,
}

/// Metadata stored alongside a recording as a JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub file_path: String,
    pub container: MovieContainer,
    pub camera: Option<Camera>,
    pub duration_secs: f64,
    pub frames_appended: u64,
    pub frames_dropped: u64,
    pub rotation_degrees: u32,
    pub checksum: String,
    pub created_at: String,
}

impl RecordingMetadata {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        file_path: &str,
        container: MovieContainer,
        camera: Option<Camera>,
        duration_secs: f64,
        frames_appended: u64,
        frames_dropped: u64,
        rotation_degrees: u32,
        checksum: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: file_path.to_string(),
            container,
            camera,
            duration_secs,
            frames_appended,
            frames_dropped,
            rotation_degrees,
            checksum: checksum.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
