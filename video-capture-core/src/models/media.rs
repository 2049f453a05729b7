use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Rational media timestamp: `value / timescale` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaTime {
    pub value: i64,
    pub timescale: i32,
}

impl MediaTime {
    pub const ZERO: Self = Self { value: 0, timescale: 1 };

    pub fn new(value: i64, timescale: i32) -> Self {
        Self { value, timescale }
    }

    /// Nearest representable time at `timescale`.
    pub fn from_seconds(seconds: f64, timescale: i32) -> Self {
        Self {
            value: (seconds * timescale as f64).round() as i64,
            timescale,
        }
    }

    pub fn seconds(&self) -> f64 {
        if self.timescale == 0 {
            return 0.0;
        }
        self.value as f64 / self.timescale as f64
    }

    pub fn is_valid(&self) -> bool {
        self.timescale > 0
    }
}

impl Default for MediaTime {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Pixel layout of a captured buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Bi-planar 4:2:0 Y'CbCr, full range. Default capture output format.
    Nv12FullRange,
    Nv12VideoRange,
    Bgra,
}

impl PixelFormat {
    pub fn code(&self) -> u8 {
        match self {
            Self::Nv12FullRange => 0,
            Self::Nv12VideoRange => 1,
            Self::Bgra => 2,
        }
    }

    /// Bytes needed for one image of `width` x `height`.
    pub fn buffer_len(&self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            Self::Nv12FullRange | Self::Nv12VideoRange => pixels + pixels / 2,
            Self::Bgra => pixels * 4,
        }
    }
}

/// Decoded image buffer. Cloning shares the underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Arc<[u8]>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            format,
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One captured frame as delivered by the capture pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub buffer: PixelBuffer,
    pub timestamp: MediaTime,
}

impl Frame {
    pub fn new(buffer: PixelBuffer, timestamp: MediaTime) -> Self {
        Self { buffer, timestamp }
    }
}
