use serde::{Deserialize, Serialize};

/// Recording lifecycle.
///
/// State transitions:
/// ```text
/// idle ──trigger──→ start ──first frame──→ capturing ──trigger/stop──→ end
///                     │
///                     └──writer creation failed──→ idle
/// ```
///
/// `start` exists so the recording is primed by the first frame that arrives
/// after the request: encoder settings and the timestamp baseline are only
/// known once real frames flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureState {
    #[default]
    Idle,
    Start,
    Capturing,
    End,
}

impl CaptureState {
    /// Apply the user-facing capture action.
    pub fn on_trigger(self) -> Self {
        match self {
            Self::Idle => Self::Start,
            Self::Capturing => Self::End,
            other => other,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether an incoming frame can open or feed a recording.
    pub fn accepts_frames(&self) -> bool {
        matches!(self, Self::Start | Self::Capturing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Start => "start",
            Self::Capturing => "capturing",
            Self::End => "end",
        }
    }
}
