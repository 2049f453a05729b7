use serde::{Deserialize, Serialize};

/// Logical camera selection.
///
/// The discriminant doubles as the zero-based index into the enumerated
/// device list (back cameras enumerate first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Camera {
    Back = 0,
    Front = 1,
}

impl Camera {
    pub fn default_camera() -> Self {
        Self::Front
    }

    /// The other camera. Two calls return the original value.
    pub fn next(self) -> Self {
        match self {
            Self::Back => Self::Front,
            Self::Front => Self::Back,
        }
    }

    /// Index into the enumerated device list.
    pub fn device_index(self) -> usize {
        self as usize
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::default_camera()
    }
}
