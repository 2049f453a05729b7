use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::device::WriterSettings;
use crate::models::error::CaptureError;
use crate::models::media::{MediaTime, PixelBuffer, PixelFormat};
use crate::traits::movie_writer::{MovieWriter, MovieWriterFactory};

/// Magic bytes at the start of every movie file.
pub const MOVIE_MAGIC: &[u8; 8] = b"VCKMOV01";

/// Size of the fixed part of a frame record, before the pixel bytes.
pub const FRAME_RECORD_HEADER_SIZE: usize = 8 + 4 + 4 + 4 + 1 + 4;

/// Streaming movie writer that stores raw frames in a framed container.
///
/// No encoding happens here; the container just keeps frames in
/// presentation order together with the settings the file was opened with.
///
/// ## File Format
///
/// ```text
/// [8-byte magic "VCKMOV01"]
/// [4-byte LE settings length | settings JSON]
/// [Frame 1: i64 pts value | i32 timescale | u32 width | u32 height | u8 format | u32 len | bytes]
/// [Frame 2: ...]
/// ```
///
/// All integers are little-endian.
pub struct FileMovieWriter {
    file_path: PathBuf,
    settings: WriterSettings,
    file: Option<BufWriter<File>>,
    session_start: Option<MediaTime>,
    finished: bool,
    frames_written: u64,
    total_bytes_written: u64,
}

impl FileMovieWriter {
    /// Create the file and write the container header.
    pub fn create(file_path: PathBuf, settings: WriterSettings) -> Result<Self, CaptureError> {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CaptureError::WriterCreationFailed(format!("failed to create directory: {}", e)))?;
        }

        let file = File::create(&file_path)
            .map_err(|e| CaptureError::WriterCreationFailed(format!("failed to create file: {}", e)))?;

        let mut writer = Self {
            file_path,
            settings,
            file: Some(BufWriter::new(file)),
            session_start: None,
            finished: false,
            frames_written: 0,
            total_bytes_written: 0,
        };

        let header = serde_json::to_vec(&writer.settings)
            .map_err(|e| CaptureError::WriterCreationFailed(format!("failed to encode settings: {}", e)))?;
        writer
            .write_raw(MOVIE_MAGIC)
            .and_then(|_| writer.write_raw(&(header.len() as u32).to_le_bytes()))
            .and_then(|_| writer.write_raw(&header))
            .map_err(|e| CaptureError::WriterCreationFailed(e.to_string()))?;

        Ok(writer)
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Total bytes written so far (including the container header).
    pub fn bytes_written(&self) -> u64 {
        self.total_bytes_written
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), CaptureError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| CaptureError::StorageError("file is not open".into()))?;
        file.write_all(data)
            .map_err(|e| CaptureError::StorageError(format!("write failed: {}", e)))?;
        self.total_bytes_written += data.len() as u64;
        Ok(())
    }
}

impl MovieWriter for FileMovieWriter {
    fn start_session(&mut self, at: MediaTime) -> Result<(), CaptureError> {
        if self.file.is_none() {
            return Err(CaptureError::StorageError("file is not open".into()));
        }
        self.session_start = Some(at);
        Ok(())
    }

    fn is_ready_for_more_media_data(&self) -> bool {
        self.file.is_some() && self.session_start.is_some() && !self.finished
    }

    fn append(&mut self, buffer: &PixelBuffer, presentation_time: MediaTime) -> Result<(), CaptureError> {
        if self.finished {
            return Err(CaptureError::AppendFailed("input is marked as finished".into()));
        }
        if self.session_start.is_none() {
            return Err(CaptureError::AppendFailed("writer session has not started".into()));
        }

        let mut record = Vec::with_capacity(FRAME_RECORD_HEADER_SIZE + buffer.len());
        record.extend_from_slice(&presentation_time.value.to_le_bytes());
        record.extend_from_slice(&presentation_time.timescale.to_le_bytes());
        record.extend_from_slice(&buffer.width.to_le_bytes());
        record.extend_from_slice(&buffer.height.to_le_bytes());
        record.push(buffer.format.code());
        record.extend_from_slice(&(buffer.len() as u32).to_le_bytes());
        record.extend_from_slice(&buffer.data);

        self.write_raw(&record)
            .map_err(|e| CaptureError::AppendFailed(e.to_string()))?;
        self.frames_written += 1;
        Ok(())
    }

    fn mark_as_finished(&mut self) {
        self.finished = true;
    }

    fn finish_writing(&mut self) -> Result<PathBuf, CaptureError> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| CaptureError::StorageError("file is not open".into()))?;
        file.flush().map_err(|e| CaptureError::StorageError(e.to_string()))?;
        let file = file
            .into_inner()
            .map_err(|e| CaptureError::StorageError(e.to_string()))?;
        file.sync_all().map_err(|e| CaptureError::StorageError(e.to_string()))?;
        self.finished = true;

        log::info!(
            "Finished writing {} ({} frames, {} bytes)",
            self.file_path.display(),
            self.frames_written,
            self.total_bytes_written
        );
        Ok(self.file_path.clone())
    }
}

/// Factory for `FileMovieWriter`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMovieWriterFactory;

impl MovieWriterFactory for FileMovieWriterFactory {
    fn create(&self, path: &Path, settings: &WriterSettings) -> Result<Box<dyn MovieWriter>, CaptureError> {
        Ok(Box::new(FileMovieWriter::create(path.to_path_buf(), settings.clone())?))
    }
}

/// One frame read back from a movie file.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub presentation_time: MediaTime,
    pub buffer: PixelBuffer,
}

/// Read a movie file written by `FileMovieWriter`.
pub fn read_movie_file(path: &Path) -> Result<(WriterSettings, Vec<FrameRecord>), CaptureError> {
    let file = File::open(path).map_err(|e| CaptureError::StorageError(format!("failed to open movie: {}", e)))?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 8];
    read_exact(&mut reader, &mut magic)?;
    if &magic != MOVIE_MAGIC {
        return Err(CaptureError::StorageError("not a movie file".into()));
    }

    let header_len = u32::from_le_bytes(read_array(&mut reader)?) as usize;
    let mut header = vec![0u8; header_len];
    read_exact(&mut reader, &mut header)?;
    let settings: WriterSettings = serde_json::from_slice(&header)
        .map_err(|e| CaptureError::StorageError(format!("failed to parse settings: {}", e)))?;

    let mut frames = Vec::new();
    loop {
        let mut value = [0u8; 8];
        match reader.read(&mut value[..1]) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => return Err(CaptureError::StorageError(e.to_string())),
        }
        read_exact(&mut reader, &mut value[1..])?;

        let timescale = i32::from_le_bytes(read_array(&mut reader)?);
        let width = u32::from_le_bytes(read_array(&mut reader)?);
        let height = u32::from_le_bytes(read_array(&mut reader)?);
        let [format_code] = read_array::<1>(&mut reader)?;
        let len = u32::from_le_bytes(read_array(&mut reader)?) as usize;
        let mut data = vec![0u8; len];
        read_exact(&mut reader, &mut data)?;

        let format = match format_code {
            0 => PixelFormat::Nv12FullRange,
            1 => PixelFormat::Nv12VideoRange,
            2 => PixelFormat::Bgra,
            other => return Err(CaptureError::StorageError(format!("unknown pixel format: {}", other))),
        };

        frames.push(FrameRecord {
            presentation_time: MediaTime::new(i64::from_le_bytes(value), timescale),
            buffer: PixelBuffer::new(width, height, format, data),
        });
    }

    Ok((settings, frames))
}

/// Compute SHA-256 hex digest of a file.
pub fn sha256_file(path: &Path) -> Result<String, CaptureError> {
    let data =
        fs::read(path).map_err(|e| CaptureError::StorageError(format!("failed to read file for checksum: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn read_exact(reader: &mut impl Read, buf: &mut [u8]) -> Result<(), CaptureError> {
    reader
        .read_exact(buf)
        .map_err(|e| CaptureError::StorageError(format!("truncated movie file: {}", e)))
}

fn read_array<const N: usize>(reader: &mut impl Read) -> Result<[u8; N], CaptureError> {
    let mut buf = [0u8; N];
    read_exact(reader, &mut buf)?;
    Ok(buf)
}
