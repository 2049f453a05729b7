pub mod camera;
pub mod config;
pub mod device;
pub mod error;
pub mod media;
pub mod recording_result;
pub mod state;
