use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::error::CaptureError;

/// Runtime authorization to add assets to the photo library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

/// User-visible media library that finalized movies are saved into.
pub trait PhotoLibrary: Send + Sync {
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Prompt for authorization. Blocks until the user answers.
    fn request_authorization(&self) -> AuthorizationStatus;

    /// Create one video asset from the file at `path`.
    fn save_video(&self, path: &Path) -> Result<(), CaptureError>;
}
