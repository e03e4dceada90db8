pub mod buffer;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod format;
pub mod log_data;
pub mod recorder;
pub mod registry;
pub mod storage;
