// Format constants for the telemetry log

/// Format version written at the head of every chunk.
pub const TELEMETRY_VERSION: i32 = 1;

/// Name of the first column of every log.
pub const TIME_FIELD: &str = "Global.Time";

// Fixed-width field sizes
pub const INT32_SIZE: usize = 4;
pub const INT64_SIZE: usize = 8;
pub const FLOAT64_SIZE: usize = 8;

// Length prefix of strings and string tables: u32
pub const LENGTH_PREFIX_SIZE: usize = 4;

// Record format: ticks(i64) ints(i64 * n) floats(f64 * m)
pub const TIMESTAMP_SIZE: usize = INT64_SIZE;

/// Default upper bound, in bytes, of a single chunk.
pub const DEFAULT_CHUNK_CAPACITY_BYTES: usize = 256 * 1024 * 1024;

/// Default duration of one tick, in seconds.
pub const DEFAULT_TIME_UNIT: f64 = 1.0e-6;

/// Largest tick count that survives the f64 -> i64 conversion.
///
/// `i64::MAX` is not representable as f64; this is the nearest value below it.
pub const MAX_TICKS_F64: f64 = 9_223_372_036_854_774_784.0;

// Header constants describing the column split
pub const NUM_INT_ENTRIES: &str = "NumIntEntries";
pub const NUM_FLOAT_ENTRIES: &str = "NumFloatEntries";
