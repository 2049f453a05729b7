pub mod finalize;
pub mod metadata;
pub mod movie_file;
