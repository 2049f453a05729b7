//! # video-capture-virtual
//!
//! Virtual camera backend for video-capture-kit.
//!
//! Provides:
//! - `VirtualDeviceCatalog`: fixed list of camera devices ("Back Camera", "Front Camera")
//! - `VirtualCaptureSource`: synthetic NV12 test-pattern frames on a `virtual-camera` thread
//! - `DirectoryPhotoLibrary`: saves finished movies into a library directory
//!
//! Runs anywhere, so the full capture pipeline can be driven without camera
//! hardware or a platform photo library.
//!
//! ## Usage
//! ```ignore
//! use video_capture_core::{CaptureConfiguration, CaptureController, Camera, FileMovieWriterFactory};
//! use video_capture_virtual::{DirectoryPhotoLibrary, VirtualCaptureSource, VirtualDeviceCatalog};
//!
//! let controller = CaptureController::new(
//!     VirtualCaptureSource::new(30),
//!     VirtualDeviceCatalog::default(),
//!     FileMovieWriterFactory,
//!     DirectoryPhotoLibrary::authorized("library"),
//!     CaptureConfiguration::default(),
//! )?;
//! controller.start_capture(Camera::Front);
//! controller.capture();
//! ```

pub mod capture_source;
pub mod device_catalog;
pub mod photo_library;

pub use capture_source::VirtualCaptureSource;
pub use device_catalog::VirtualDeviceCatalog;
pub use photo_library::DirectoryPhotoLibrary;
