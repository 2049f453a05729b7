//! Finalize a closed recording and hand it to the photo library.
//!
//! ```text
//! mark finished → finish writing → checksum → metadata sidecar
//!   → authorization check → save → on_capture_finished
//! ```
//!
//! Failures are logged and reported through `CaptureDelegate::on_error`.
//! Nothing is retried.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use crate::models::error::CaptureError;
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::recording::state_machine::RecordingSession;
use crate::storage::metadata::write_metadata;
use crate::storage::movie_file::sha256_file;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::photo_library::{AuthorizationStatus, PhotoLibrary};

/// Finalize `session` and save it, blocking the calling thread.
pub fn finalize_and_save(
    mut session: RecordingSession,
    library: &dyn PhotoLibrary,
    delegate: Option<&dyn CaptureDelegate>,
    with_metadata: bool,
) -> Result<RecordingResult, CaptureError> {
    let result = finalize(&mut session, with_metadata).and_then(|result| {
        save_to_library(library, &result.file_path)?;
        Ok(result)
    });

    match (&result, delegate) {
        (Ok(result), Some(d)) => d.on_capture_finished(result),
        (Err(e), Some(d)) => d.on_error(e),
        _ => {}
    }
    result
}

/// Run `finalize_and_save` on a `recording-finalize` thread.
pub fn spawn_finalize(
    session: RecordingSession,
    library: Arc<dyn PhotoLibrary>,
    delegate: Option<Arc<dyn CaptureDelegate>>,
    with_metadata: bool,
) -> Result<thread::JoinHandle<()>, CaptureError> {
    thread::Builder::new()
        .name("recording-finalize".into())
        .spawn(move || {
            let _ = finalize_and_save(session, library.as_ref(), delegate.as_deref(), with_metadata);
        })
        .map_err(|e| CaptureError::Unknown(format!("failed to spawn finalize thread: {}", e)))
}

fn finalize(session: &mut RecordingSession, with_metadata: bool) -> Result<RecordingResult, CaptureError> {
    session.writer.mark_as_finished();
    let file_path = session.writer.finish_writing().map_err(|e| {
        log::error!("Failed to finalize {}: {}", session.file_path.display(), e);
        e
    })?;

    let checksum = sha256_file(&file_path)?;
    let duration = session.duration_secs();

    let metadata = RecordingMetadata::new(
        &file_path.to_string_lossy(),
        session.settings.container,
        session.camera,
        duration,
        session.frames_appended,
        session.frames_dropped,
        session.settings.rotation_degrees,
        &checksum,
    );

    if with_metadata {
        // The movie itself is intact; a missing sidecar is not fatal.
        if let Err(e) = write_metadata(&metadata, &file_path) {
            log::warn!("Failed to write metadata for {}: {}", file_path.display(), e);
        }
    }

    log::info!(
        "Finalized {} ({:.2}s, {} frames, {} dropped)",
        file_path.display(),
        duration,
        session.frames_appended,
        session.frames_dropped
    );

    Ok(RecordingResult {
        file_path,
        duration_secs: duration,
        metadata,
        checksum,
    })
}

/// Save `path` to the library, prompting for authorization if undetermined.
pub fn save_to_library(library: &dyn PhotoLibrary, path: &Path) -> Result<(), CaptureError> {
    let status = match library.authorization_status() {
        AuthorizationStatus::NotDetermined => library.request_authorization(),
        status => status,
    };

    if status != AuthorizationStatus::Authorized {
        log::warn!("User denied access to photo library ({:?})", status);
        return Err(CaptureError::PermissionDenied);
    }

    match library.save_video(path) {
        Ok(()) => {
            log::info!("Save complete! path: {}", path.display());
            Ok(())
        }
        Err(e) => {
            log::error!("Save failed for {}: {}", path.display(), e);
            Err(match e {
                CaptureError::SaveFailed(_) => e,
                other => CaptureError::SaveFailed(other.to_string()),
            })
        }
    }
}
