//! Directory-backed photo library.
//!
//! Stands in for a platform media library: saved movies are copied into a
//! library directory. Authorization is simulated with a fixed initial status
//! and a scripted answer to the authorization prompt.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use video_capture_core::models::error::CaptureError;
use video_capture_core::traits::photo_library::{AuthorizationStatus, PhotoLibrary};

pub struct DirectoryPhotoLibrary {
    library_dir: PathBuf,
    status: Mutex<AuthorizationStatus>,
    prompt_answer: AuthorizationStatus,
}

impl DirectoryPhotoLibrary {
    pub fn new(
        library_dir: impl Into<PathBuf>,
        status: AuthorizationStatus,
        prompt_answer: AuthorizationStatus,
    ) -> Self {
        Self {
            library_dir: library_dir.into(),
            status: Mutex::new(status),
            prompt_answer,
        }
    }

    /// Library that has already been granted access.
    pub fn authorized(library_dir: impl Into<PathBuf>) -> Self {
        Self::new(library_dir, AuthorizationStatus::Authorized, AuthorizationStatus::Authorized)
    }

    /// Movies currently in the library, sorted by file name.
    pub fn items(&self) -> Result<Vec<PathBuf>, CaptureError> {
        if !self.library_dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.library_dir)
            .map_err(|e| CaptureError::StorageError(format!("failed to read library: {}", e)))?;

        let mut items: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        items.sort();
        Ok(items)
    }
}

impl PhotoLibrary for DirectoryPhotoLibrary {
    fn authorization_status(&self) -> AuthorizationStatus {
        *self.status.lock()
    }

    fn request_authorization(&self) -> AuthorizationStatus {
        let mut status = self.status.lock();
        if *status == AuthorizationStatus::NotDetermined {
            log::info!("Photo library authorization answered: {:?}", self.prompt_answer);
            *status = self.prompt_answer;
        }
        *status
    }

    fn save_video(&self, path: &Path) -> Result<(), CaptureError> {
        if self.authorization_status() != AuthorizationStatus::Authorized {
            return Err(CaptureError::PermissionDenied);
        }
        let file_name = path
            .file_name()
            .ok_or_else(|| CaptureError::SaveFailed(format!("not a file: {}", path.display())))?;

        fs::create_dir_all(&self.library_dir)
            .map_err(|e| CaptureError::SaveFailed(format!("failed to create library: {}", e)))?;
        let target = self.library_dir.join(file_name);
        fs::copy(path, &target)
            .map_err(|e| CaptureError::SaveFailed(format!("failed to copy {}: {}", path.display(), e)))?;
        Ok(())
    }
}
