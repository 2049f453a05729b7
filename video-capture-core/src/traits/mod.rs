pub mod capture_delegate;
pub mod capture_source;
pub mod device_catalog;
pub mod frame_delegate;
pub mod movie_writer;
pub mod photo_library;
