//! Record a few seconds from the virtual camera and save it to a library
//! directory.
//!
//! ```text
//! capture-demo [OUTPUT_DIR] [SECONDS]
//! ```
//!
//! Set `RUST_LOG=debug` to see state transitions.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use video_capture_core::{
    Camera, CaptureConfiguration, CaptureController, CaptureDelegate, CaptureError, CaptureState,
    FileMovieWriterFactory, FrameDelegate, MediaTime, PixelBuffer, RecordingResult,
};
use video_capture_virtual::{DirectoryPhotoLibrary, VirtualCaptureSource, VirtualDeviceCatalog};

/// Logs lifecycle callbacks and counts frames handed to the "call".
#[derive(Default)]
struct DemoDelegate {
    frames: AtomicU64,
}

impl CaptureDelegate for DemoDelegate {
    fn on_state_changed(&self, state: &CaptureState) {
        log::info!("State: {}", state.as_str());
    }

    fn on_error(&self, error: &CaptureError) {
        log::error!("Capture error: {}", error);
    }

    fn on_capture_finished(&self, result: &RecordingResult) {
        log::info!(
            "Saved {} ({:.2}s, {} frames, sha256 {})",
            result.file_path.display(),
            result.duration_secs,
            result.metadata.frames_appended,
            result.checksum
        );
    }
}

impl FrameDelegate for DemoDelegate {
    fn on_frame(&self, _buffer: &PixelBuffer, _rotation_degrees: u32, _timestamp: MediaTime) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| "capture-demo-output".into()));
    let seconds: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);

    match run(output_dir, seconds) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(output_dir: PathBuf, seconds: u64) -> Result<(), CaptureError> {
    let config = CaptureConfiguration {
        output_directory: output_dir.join("recordings"),
        ..Default::default()
    };
    let library = DirectoryPhotoLibrary::authorized(output_dir.join("library"));

    let mut controller = CaptureController::new(
        VirtualCaptureSource::new(30),
        VirtualDeviceCatalog::default(),
        FileMovieWriterFactory,
        library,
        config,
    )?;
    let delegate = Arc::new(DemoDelegate::default());
    controller.set_delegate(delegate.clone());
    controller.set_frame_delegate(delegate.clone());

    controller.start_capture(Camera::default_camera());
    controller.capture();
    thread::sleep(Duration::from_secs(seconds));
    controller.stop_capture();
    controller.shutdown();

    log::info!(
        "Forwarded {} frames; library at {}",
        delegate.frames.load(Ordering::Relaxed),
        output_dir.join("library").display()
    );
    Ok(())
}
