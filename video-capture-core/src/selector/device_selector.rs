//! Maps a zero-based device index onto the injected device catalog and
//! swaps it into the capture source's active input.

use crate::models::device::CaptureDevice;
use crate::traits::capture_source::CaptureSource;
use crate::traits::device_catalog::DeviceCatalog;

/// Outcome of a device change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceChange {
    /// The catalog is empty; nothing was touched.
    NoDevice,
    /// The requested device is already the active input.
    Unchanged(CaptureDevice),
    /// The active input now uses this device.
    Switched(CaptureDevice),
    /// The old input was removed but the new one could not be installed.
    Failed(CaptureDevice),
}

impl DeviceChange {
    /// The device that ended up requested, if any.
    pub fn device(&self) -> Option<&CaptureDevice> {
        match self {
            Self::NoDevice => None,
            Self::Unchanged(d) | Self::Switched(d) | Self::Failed(d) => Some(d),
        }
    }
}

/// Device at `index`, clamped to the last enumerated device.
///
/// Returns `None` only when the catalog is empty.
pub fn capture_device(catalog: &dyn DeviceCatalog, index: usize) -> Option<CaptureDevice> {
    let mut devices = catalog.video_devices();
    if devices.is_empty() {
        return None;
    }
    if index >= devices.len() {
        return devices.pop();
    }
    Some(devices.swap_remove(index))
}

/// Install the device at `index` as the source's active input.
///
/// Runs inside a configuration transaction. Input failures are logged and
/// swallowed; the source may be left without an input.
pub fn change_capture_device(
    catalog: &dyn DeviceCatalog,
    source: &mut dyn CaptureSource,
    index: usize,
) -> DeviceChange {
    let Some(device) = capture_device(catalog, index) else {
        log::debug!("No video devices available for index {}", index);
        return DeviceChange::NoDevice;
    };

    let current = source.active_input();
    if current.as_ref().map(|c| c.unique_id.as_str()) == Some(device.unique_id.as_str()) {
        return DeviceChange::Unchanged(device);
    }

    source.begin_configuration();
    if let Some(ref current) = current {
        source.remove_input(current);
    }
    let installed = if source.can_add_input(&device) {
        match source.add_input(&device) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to add input {}: {}", device.unique_id, e);
                false
            }
        }
    } else {
        log::warn!("Capture source cannot add input {}", device.unique_id);
        false
    };
    source.commit_configuration();

    if installed {
        log::info!("Switched capture device to {} ({})", device.localized_name, device.unique_id);
        DeviceChange::Switched(device)
    } else {
        DeviceChange::Failed(device)
    }
}
