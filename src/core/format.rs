// Log header and record layout
//
// Chunk:  [header][record]*
// Header: version(i32) time_unit(f64) constants(table of key/value) fieldnames(table)
// Record: ticks(i64) ints(i64 * num_int) floats(f64 * num_float)
//
// Strings are a u32 byte length followed by UTF-8 bytes, tables a u32 entry
// count followed by their entries. Everything is little-endian.

use crate::core::constants::*;
use crate::core::error::{Result, TelemetryError};
use std::io::{ErrorKind, Read};

#[derive(Debug, Clone, PartialEq)]
pub struct LogHeader {
    pub version: i32,
    pub time_unit: f64,
    pub constants: Vec<(String, String)>,
    pub fieldnames: Vec<String>,
}

impl LogHeader {
    pub fn new(
        time_unit: f64,
        mut constants: Vec<(String, String)>,
        int_names: &[String],
        float_names: &[String],
    ) -> Self {
        constants.retain(|(key, _)| key != NUM_INT_ENTRIES && key != NUM_FLOAT_ENTRIES);
        constants.push((NUM_INT_ENTRIES.to_string(), int_names.len().to_string()));
        constants.push((NUM_FLOAT_ENTRIES.to_string(), float_names.len().to_string()));

        let mut fieldnames = Vec::with_capacity(1 + int_names.len() + float_names.len());
        fieldnames.push(TIME_FIELD.to_string());
        fieldnames.extend(int_names.iter().cloned());
        fieldnames.extend(float_names.iter().cloned());

        Self {
            version: TELEMETRY_VERSION,
            time_unit,
            constants,
            fieldnames,
        }
    }

    pub fn constant(&self, key: &str) -> Option<&str> {
        self.constants
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn encoded_len(&self) -> usize {
        let constants: usize = self
            .constants
            .iter()
            .map(|(k, v)| 2 * LENGTH_PREFIX_SIZE + k.len() + v.len())
            .sum();
        let fields: usize = self
            .fieldnames
            .iter()
            .map(|name| LENGTH_PREFIX_SIZE + name.len())
            .sum();

        INT32_SIZE + FLOAT64_SIZE + LENGTH_PREFIX_SIZE + constants + LENGTH_PREFIX_SIZE + fields
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.time_unit.to_le_bytes());

        out.extend_from_slice(&(self.constants.len() as u32).to_le_bytes());
        for (key, value) in &self.constants {
            write_string(&mut out, key);
            write_string(&mut out, value);
        }

        out.extend_from_slice(&(self.fieldnames.len() as u32).to_le_bytes());
        for name in &self.fieldnames {
            write_string(&mut out, name);
        }

        out
    }

    /// Parse a header from the current position of `reader`.
    ///
    /// The version is checked before anything else is read.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let version = i32::from_le_bytes(read_array(reader)?);
        if version != TELEMETRY_VERSION {
            return Err(TelemetryError::UnsupportedVersion(version));
        }

        let time_unit = f64::from_le_bytes(read_array(reader)?);

        let constant_count = u32::from_le_bytes(read_array(reader)?);
        let mut constants = Vec::new();
        for _ in 0..constant_count {
            let key = read_string(reader)?;
            let value = read_string(reader)?;
            constants.push((key, value));
        }

        let field_count = u32::from_le_bytes(read_array(reader)?);
        if field_count == 0 {
            return Err(TelemetryError::CorruptedData(
                "Header has no time field".to_string(),
            ));
        }
        let mut fieldnames = Vec::new();
        for _ in 0..field_count {
            fieldnames.push(read_string(reader)?);
        }

        Ok(Self {
            version,
            time_unit,
            constants,
            fieldnames,
        })
    }
}

/// Byte sizes shared by the encoder and decoder of one log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordGeometry {
    pub num_int: usize,
    pub num_float: usize,
    pub header_size: usize,
}

impl RecordGeometry {
    pub fn new(num_int: usize, num_float: usize, header_size: usize) -> Self {
        Self {
            num_int,
            num_float,
            header_size,
        }
    }

    /// Rebuild the geometry from section sizes in bytes.
    pub fn from_section_sizes(
        integer_section_size: usize,
        float_section_size: usize,
        header_size: usize,
    ) -> Result<Self> {
        if integer_section_size % INT64_SIZE != 0 || float_section_size % FLOAT64_SIZE != 0 {
            return Err(TelemetryError::CorruptedData(format!(
                "Section sizes {} / {} are not multiples of 8 bytes",
                integer_section_size, float_section_size
            )));
        }
        Ok(Self::new(
            integer_section_size / INT64_SIZE,
            float_section_size / FLOAT64_SIZE,
            header_size,
        ))
    }

    /// Geometry described by a parsed header.
    pub fn from_header(header: &LogHeader) -> Result<Self> {
        let num_int = parse_count(header, NUM_INT_ENTRIES)?;
        let num_float = parse_count(header, NUM_FLOAT_ENTRIES)?;
        if header.fieldnames.len() != 1 + num_int + num_float {
            return Err(TelemetryError::CorruptedData(format!(
                "{} fieldnames for {} integer and {} float columns",
                header.fieldnames.len(),
                num_int,
                num_float
            )));
        }
        Ok(Self::new(num_int, num_float, header.encoded_len()))
    }

    pub fn integer_section_size(&self) -> usize {
        self.num_int * INT64_SIZE
    }

    pub fn float_section_size(&self) -> usize {
        self.num_float * FLOAT64_SIZE
    }

    pub fn record_size(&self) -> usize {
        TIMESTAMP_SIZE + self.integer_section_size() + self.float_section_size()
    }
}

fn parse_count(header: &LogHeader, key: &str) -> Result<usize> {
    header
        .constant(key)
        .ok_or_else(|| TelemetryError::CorruptedData(format!("Missing header constant {}", key)))?
        .parse()
        .map_err(|_| TelemetryError::CorruptedData(format!("Invalid header constant {}", key)))
}

fn write_string(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(value.as_bytes());
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(eof_as_corruption)?;
    Ok(buf)
}

fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let len = u32::from_le_bytes(read_array(reader)?) as usize;
    let mut bytes = Vec::new();
    Read::take(&mut *reader, len as u64)
        .read_to_end(&mut bytes)
        .map_err(TelemetryError::Io)?;
    if bytes.len() != len {
        return Err(TelemetryError::CorruptedData(format!(
            "String of {} bytes truncated to {}",
            len,
            bytes.len()
        )));
    }
    Ok(String::from_utf8(bytes)?)
}

fn eof_as_corruption(e: std::io::Error) -> TelemetryError {
    if e.kind() == ErrorKind::UnexpectedEof {
        TelemetryError::CorruptedData("Header truncated".to_string())
    } else {
        TelemetryError::Io(e)
    }
}
