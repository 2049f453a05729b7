use serde::{Deserialize, Serialize};

/// Physical position of a capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePosition {
    Front,
    Back,
    External,
    Unspecified,
}

/// A video capture device available to a capture session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDevice {
    pub unique_id: String,
    pub localized_name: String,
    pub position: DevicePosition,
}

impl CaptureDevice {
    pub fn new(unique_id: impl Into<String>, localized_name: impl Into<String>, position: DevicePosition) -> Self {
        Self {
            unique_id: unique_id.into(),
            localized_name: localized_name.into(),
            position,
        }
    }
}

/// Fixed capture resolution applied when a capture starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPreset {
    Vga640x480,
    Hd1280x720,
    Hd1920x1080,
}

impl SessionPreset {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Vga640x480 => (640, 480),
            Self::Hd1280x720 => (1280, 720),
            Self::Hd1920x1080 => (1920, 1080),
        }
    }
}

/// Output movie container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovieContainer {
    Mov,
    Mp4,
}

impl MovieContainer {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mov => "mov",
            Self::Mp4 => "mp4",
        }
    }
}

/// Encoder settings a capture output recommends for a given container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderSettings {
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub average_bit_rate: Option<u32>,
}

/// Everything a movie writer needs to open its video input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterSettings {
    pub container: MovieContainer,
    pub encoder: EncoderSettings,
    /// Rotation transform baked into the track, in degrees.
    pub rotation_degrees: u32,
    pub media_timescale: i32,
    pub expects_media_data_in_real_time: bool,
}
