use crate::models::device::CaptureDevice;

/// Enumerates capture-capable video devices.
///
/// Injected into the controller instead of querying ambient platform state,
/// so device selection can run without hardware.
pub trait DeviceCatalog: Send + Sync {
    /// Video devices in enumeration order.
    fn video_devices(&self) -> Vec<CaptureDevice>;
}
