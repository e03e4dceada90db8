// Error handling for the telemetry recorder

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TelemetryError>;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Recorder not initialized")]
    NotInitialized,

    #[error("Recorder already initialized, call reset first")]
    AlreadyInitialized,

    #[error("Invalid time unit: {0} (must be finite and strictly positive)")]
    InvalidTimeUnit(f64),

    #[error("Timestamp {timestamp}s out of range (maximum log time is {max_time}s)")]
    TimestampOutOfRange { timestamp: f64, max_time: f64 },

    #[error("Chunk capacity of {capacity} bytes cannot hold a {required} bytes header and record")]
    InvalidChunkCapacity { capacity: usize, required: usize },

    #[error("Buffer overflow: {requested} bytes requested, {available} bytes available")]
    BufferOverflow { requested: usize, available: usize },

    #[error("Failed to write chunk {index} to {path:?}: {source}")]
    ChunkWrite {
        index: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No log found at {0:?}")]
    LogNotFound(PathBuf),

    #[error("Source {source_index} truncated at offset {offset}: expected {expected} bytes, got {got}")]
    TruncatedSource {
        source_index: usize,
        offset: u64,
        expected: usize,
        got: usize,
    },

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(i32),

    #[error("Corrupted data: {0}")]
    CorruptedData(String),

    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    #[error("Invalid UTF-8 string")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}
