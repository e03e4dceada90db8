// Telemetry recorder: fixed-schema snapshots appended to bounded chunks

use crate::core::buffer::ByteBuffer;
use crate::core::constants::*;
use crate::core::decoder::decode;
use crate::core::error::{Result, TelemetryError};
use crate::core::format::{LogHeader, RecordGeometry};
use crate::core::log_data::DecodedLog;
use crate::core::registry::SignalRegistry;
use crate::core::storage;
use crate::models::recorder_config::RecorderConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// State that only exists between `initialize` and `reset`.
struct Session<'a> {
    registry: &'a dyn SignalRegistry,
    header: Vec<u8>,
    geometry: RecordGeometry,
    time_unit: f64,
    ticks_per_second: f64,
    snapshots: usize,
}

/// Records registry snapshots into an append-only sequence of chunks.
///
/// Every chunk starts with the same header, so each one can be decoded on
/// its own. Only the last chunk is ever written to.
pub struct TelemetryRecorder<'a> {
    chunk_capacity_bytes: usize,
    chunks: Vec<ByteBuffer>,
    session: Option<Session<'a>>,
}

impl<'a> TelemetryRecorder<'a> {
    pub fn new() -> Self {
        Self::with_config(&RecorderConfig::default())
    }

    pub fn with_config(config: &RecorderConfig) -> Self {
        Self {
            chunk_capacity_bytes: config.chunk_capacity_bytes,
            chunks: Vec::new(),
            session: None,
        }
    }

    /// Freeze the registry schema and open the first chunk.
    pub fn initialize(&mut self, registry: &'a dyn SignalRegistry, time_unit: f64) -> Result<()> {
        if self.session.is_some() {
            return Err(TelemetryError::AlreadyInitialized);
        }
        if !time_unit.is_finite() || time_unit <= 0.0 {
            return Err(TelemetryError::InvalidTimeUnit(time_unit));
        }

        let int_names = registry.int_names();
        let float_names = registry.float_names();
        let header = LogHeader::new(time_unit, registry.constants(), &int_names, &float_names);
        let header = header.encode();
        let geometry = RecordGeometry::new(int_names.len(), float_names.len(), header.len());

        let required = geometry.header_size + geometry.record_size();
        if self.chunk_capacity_bytes < required {
            return Err(TelemetryError::InvalidChunkCapacity {
                capacity: self.chunk_capacity_bytes,
                required,
            });
        }

        self.chunks.clear();
        create_new_chunk(&mut self.chunks, self.chunk_capacity_bytes, &header)?;

        debug!(
            "Recorder initialized: {} int, {} float fields, record {} bytes, header {} bytes",
            geometry.num_int,
            geometry.num_float,
            geometry.record_size(),
            geometry.header_size
        );

        self.session = Some(Session {
            registry,
            header,
            geometry,
            time_unit,
            ticks_per_second: 1.0 / time_unit,
            snapshots: 0,
        });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Append one record with the current registry values.
    pub fn flush_data_snapshot(&mut self, timestamp: f64) -> Result<()> {
        let session = self.session.as_mut().ok_or(TelemetryError::NotInitialized)?;

        let Some(ticks) = quantize(timestamp, session.ticks_per_second) else {
            let max_time = max_time_for(session.ticks_per_second);
            warn!("Snapshot at {}s rejected, maximum log time is {}s", timestamp, max_time);
            return Err(TelemetryError::TimestampOutOfRange {
                timestamp,
                max_time,
            });
        };

        let geometry = session.geometry;
        let needs_rollover = self
            .chunks
            .last()
            .map_or(true, |chunk| chunk.remaining() < geometry.record_size());
        if needs_rollover {
            create_new_chunk(&mut self.chunks, self.chunk_capacity_bytes, &session.header)?;
        }

        let chunk = self
            .chunks
            .last_mut()
            .ok_or(TelemetryError::NotInitialized)?;
        chunk.write_i64(ticks)?;
        for index in 0..geometry.num_int {
            chunk.write_i64(session.registry.int_value(index))?;
        }
        for index in 0..geometry.num_float {
            chunk.write_f64(session.registry.float_value(index))?;
        }

        session.snapshots += 1;
        Ok(())
    }

    /// Largest loggable time, in seconds, for this recorder's time unit.
    pub fn get_maximum_log_time(&self) -> Result<f64> {
        let session = self.session.as_ref().ok_or(TelemetryError::NotInitialized)?;
        Ok(max_time_for(session.ticks_per_second))
    }

    /// Largest loggable time, in seconds, for a given time unit.
    pub fn maximum_log_time(time_unit: f64) -> Result<f64> {
        if !time_unit.is_finite() || time_unit <= 0.0 {
            return Err(TelemetryError::InvalidTimeUnit(time_unit));
        }
        Ok(max_time_for(1.0 / time_unit))
    }

    /// Same as [`Self::maximum_log_time`], from the number of ticks per second.
    pub fn maximum_log_time_from_inverse(ticks_per_second: u64) -> Result<f64> {
        if ticks_per_second == 0 {
            return Err(TelemetryError::InvalidTimeUnit(f64::INFINITY));
        }
        Ok(max_time_for(ticks_per_second as f64))
    }

    /// Drop every chunk and release the registry.
    pub fn reset(&mut self) {
        self.chunks.clear();
        self.session = None;
    }

    /// Write every chunk to `filename`, or to suffixed files when there are several.
    pub fn write_data_binary<P: AsRef<Path>>(&self, filename: P) -> Result<Vec<PathBuf>> {
        if self.chunks.is_empty() {
            return Err(TelemetryError::NotInitialized);
        }
        storage::write_chunks(self.chunks(), filename.as_ref())
    }

    /// Decode the chunks recorded so far.
    pub fn get_data(&self) -> Result<DecodedLog> {
        let session = self.session.as_ref().ok_or(TelemetryError::NotInitialized)?;
        decode(self.chunks(), &session.geometry)
    }

    /// Used bytes of every chunk, oldest first.
    pub fn chunks(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.chunks.iter().map(ByteBuffer::as_slice)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk_capacity_bytes(&self) -> usize {
        self.chunk_capacity_bytes
    }

    pub fn geometry(&self) -> Option<RecordGeometry> {
        self.session.as_ref().map(|s| s.geometry)
    }

    pub fn time_unit(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.time_unit)
    }

    pub fn recorded_snapshots(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.snapshots)
    }
}

impl Default for TelemetryRecorder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn create_new_chunk(chunks: &mut Vec<ByteBuffer>, capacity: usize, header: &[u8]) -> Result<()> {
    let mut chunk = ByteBuffer::with_capacity(capacity);
    chunk.write_bytes(header)?;
    chunks.push(chunk);
    if chunks.len() > 1 {
        info!("Chunk {} opened ({} bytes)", chunks.len() - 1, capacity);
    }
    Ok(())
}

// None when the rounded tick count does not fit in an i64.
fn quantize(timestamp: f64, ticks_per_second: f64) -> Option<i64> {
    let ticks = (timestamp * ticks_per_second).round();
    (ticks >= i64::MIN as f64 && ticks < i64::MAX as f64).then_some(ticks as i64)
}

// The floored quotient can still round up to 2^63 once multiplied back, so
// step down one ulp at a time until it quantizes.
fn max_time_for(ticks_per_second: f64) -> f64 {
    let mut max_time = (MAX_TICKS_F64 / ticks_per_second).floor();
    while max_time > 0.0 && quantize(max_time, ticks_per_second).is_none() {
        max_time = f64::from_bits(max_time.to_bits() - 1);
    }
    max_time
}
