// Fixed-schema binary telemetry recorder
// Main library entry point

pub mod core;
pub mod models;

// Re-export main types
pub use crate::core::decoder::{decode, get_data};
pub use crate::core::error::{Result, TelemetryError};
pub use crate::core::format::{LogHeader, RecordGeometry};
pub use crate::core::log_data::DecodedLog;
pub use crate::core::recorder::TelemetryRecorder;
pub use crate::core::registry::{FloatHandle, IntHandle, SignalRegistry, TelemetryData};
pub use crate::core::storage::{chunk_path, discover_chunk_files, read_log_file};
pub use crate::models::recorder_config::RecorderConfig;
