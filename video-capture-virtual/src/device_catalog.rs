//! Virtual camera enumeration.

use video_capture_core::models::device::{CaptureDevice, DevicePosition};
use video_capture_core::traits::device_catalog::DeviceCatalog;

pub const BACK_CAMERA_ID: &str = "virtual-back";
pub const FRONT_CAMERA_ID: &str = "virtual-front";

/// Catalog over a fixed device list.
///
/// The default list is ordered back, front so that `Camera::device_index`
/// maps onto it directly.
#[derive(Debug, Clone)]
pub struct VirtualDeviceCatalog {
    devices: Vec<CaptureDevice>,
}

impl VirtualDeviceCatalog {
    pub fn new(devices: Vec<CaptureDevice>) -> Self {
        Self { devices }
    }

    /// A catalog with no cameras attached.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl Default for VirtualDeviceCatalog {
    fn default() -> Self {
        Self::new(vec![
            CaptureDevice::new(BACK_CAMERA_ID, "Back Camera", DevicePosition::Back),
            CaptureDevice::new(FRONT_CAMERA_ID, "Front Camera", DevicePosition::Front),
        ])
    }
}

impl DeviceCatalog for VirtualDeviceCatalog {
    fn video_devices(&self) -> Vec<CaptureDevice> {
        self.devices.clone()
    }
}
