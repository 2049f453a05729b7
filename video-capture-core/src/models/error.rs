use thiserror::Error;

/// Errors that can occur during capture and recording operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("writer creation failed: {0}")]
    WriterCreationFailed(String),

    #[error("append failed: {0}")]
    AppendFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("save failed: {0}")]
    SaveFailed(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}
