// Sequential decoding of one or more chunks into a single log

use crate::core::constants::*;
use crate::core::error::{Result, TelemetryError};
use crate::core::format::{LogHeader, RecordGeometry};
use crate::core::log_data::DecodedLog;
use std::io::{ErrorKind, Read};
use tracing::debug;

/// Decode an ordered list of chunk sources into one log.
///
/// Every source starts with the same `geometry.header_size` bytes header;
/// the first one is parsed, the others must repeat it byte for byte. Records
/// are appended in source order.
pub fn decode<R, I>(sources: I, geometry: &RecordGeometry) -> Result<DecodedLog>
where
    R: Read,
    I: IntoIterator<Item = R>,
{
    let mut sources = sources.into_iter();
    let mut first = sources
        .next()
        .ok_or_else(|| TelemetryError::CorruptedData("No source to decode".to_string()))?;

    let first_header = read_header(&mut first, 0, geometry)?;
    let mut log = parse_header(&first_header, geometry)?;
    let mut record = vec![0u8; geometry.record_size()];
    read_records(&mut first, 0, geometry, &mut record, &mut log)?;

    for (index, mut source) in sources.enumerate() {
        let source_index = index + 1;
        let header = read_header(&mut source, source_index, geometry)?;
        if header != first_header {
            return Err(TelemetryError::CorruptedData(format!(
                "Header of source {} differs from the first source",
                source_index
            )));
        }
        read_records(&mut source, source_index, geometry, &mut record, &mut log)?;
    }

    Ok(log)
}

/// Decode with the geometry given as raw section sizes in bytes.
pub fn get_data<R, I>(
    sources: I,
    integer_section_size: usize,
    float_section_size: usize,
    header_size: usize,
) -> Result<DecodedLog>
where
    R: Read,
    I: IntoIterator<Item = R>,
{
    let geometry =
        RecordGeometry::from_section_sizes(integer_section_size, float_section_size, header_size)?;
    decode(sources, &geometry)
}

fn read_header<R: Read>(
    source: &mut R,
    source_index: usize,
    geometry: &RecordGeometry,
) -> Result<Vec<u8>> {
    let mut header = vec![0u8; geometry.header_size];
    let got = read_full(source, &mut header)?;
    if got < geometry.header_size {
        return Err(TelemetryError::TruncatedSource {
            source_index,
            offset: 0,
            expected: geometry.header_size,
            got,
        });
    }
    Ok(header)
}

// Append every record of `source` until it is exhausted.
fn read_records<R: Read>(
    source: &mut R,
    source_index: usize,
    geometry: &RecordGeometry,
    record: &mut [u8],
    log: &mut DecodedLog,
) -> Result<()> {
    let mut offset = geometry.header_size as u64;
    let mut count = 0usize;
    loop {
        let got = read_full(source, record)?;
        if got == 0 {
            break;
        }
        if got < record.len() {
            return Err(TelemetryError::TruncatedSource {
                source_index,
                offset,
                expected: record.len(),
                got,
            });
        }
        push_record(log, record, geometry);
        offset += record.len() as u64;
        count += 1;
    }

    debug!("Decoded {} records from source {}", count, source_index);
    Ok(())
}

fn parse_header(bytes: &[u8], geometry: &RecordGeometry) -> Result<DecodedLog> {
    let mut cursor = bytes;
    let header = LogHeader::read_from(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(TelemetryError::CorruptedData(format!(
            "Header is {} bytes shorter than the expected {}",
            cursor.len(),
            geometry.header_size
        )));
    }
    if header.fieldnames.len() != 1 + geometry.num_int + geometry.num_float {
        return Err(TelemetryError::CorruptedData(format!(
            "{} fieldnames for {} integer and {} float columns",
            header.fieldnames.len(),
            geometry.num_int,
            geometry.num_float
        )));
    }

    Ok(DecodedLog {
        constants: header.constants,
        fieldnames: header.fieldnames,
        version: header.version,
        time_unit: header.time_unit,
        num_int: geometry.num_int,
        num_float: geometry.num_float,
        timestamps: Vec::new(),
        int_data: Vec::new(),
        float_data: Vec::new(),
    })
}

fn push_record(log: &mut DecodedLog, record: &[u8], geometry: &RecordGeometry) {
    let (ticks, rest) = record.split_at(TIMESTAMP_SIZE);
    let (ints, floats) = rest.split_at(geometry.integer_section_size());

    log.timestamps.push(i64::from_le_bytes(word(ticks)));
    log.int_data.push(
        ints.chunks_exact(INT64_SIZE)
            .map(|b| i64::from_le_bytes(word(b)))
            .collect(),
    );
    log.float_data.push(
        floats
            .chunks_exact(FLOAT64_SIZE)
            .map(|b| f64::from_le_bytes(word(b)))
            .collect(),
    );
}

fn word(bytes: &[u8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(bytes);
    out
}

// Fill `buf` as far as the source allows; a short count means end of source.
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
