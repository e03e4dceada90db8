// Chunk files on disk

use crate::core::decoder::decode;
use crate::core::error::{Result, TelemetryError};
use crate::core::format::{LogHeader, RecordGeometry};
use crate::core::log_data::DecodedLog;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `dir/stem_<index>.ext`, or `dir/name_<index>` when `base` has no extension.
pub fn chunk_path(base: &Path, index: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}_{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}_{}", stem, index),
    };
    base.with_file_name(name)
}

/// Write chunks in order. A single chunk goes to `base` itself.
///
/// Stops at the first failing chunk; files already written stay in place.
pub fn write_chunks<'c, I>(chunks: I, base: &Path) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = &'c [u8]>,
{
    let chunks: Vec<&[u8]> = chunks.into_iter().collect();
    let mut written = Vec::with_capacity(chunks.len());

    for (index, bytes) in chunks.iter().enumerate() {
        let path = if chunks.len() == 1 {
            base.to_path_buf()
        } else {
            chunk_path(base, index)
        };

        fs::write(&path, bytes).map_err(|source| TelemetryError::ChunkWrite {
            index,
            path: path.clone(),
            source,
        })?;

        info!("Chunk {} written to {} ({} bytes)", index, path.display(), bytes.len());
        written.push(path);
    }

    Ok(written)
}

/// Files making up the log written at `base`, in chunk order.
pub fn discover_chunk_files(base: &Path) -> Result<Vec<PathBuf>> {
    if base.is_file() {
        return Ok(vec![base.to_path_buf()]);
    }

    let files: Vec<PathBuf> = (0..)
        .map(|index| chunk_path(base, index))
        .take_while(|path| path.is_file())
        .collect();

    if files.is_empty() {
        return Err(TelemetryError::LogNotFound(base.to_path_buf()));
    }
    Ok(files)
}

/// Decode a log previously written with [`write_chunks`].
///
/// The geometry is taken from the header of the first file.
pub fn read_log_file<P: AsRef<Path>>(base: P) -> Result<DecodedLog> {
    let files = discover_chunk_files(base.as_ref())?;
    debug!("Reading log from {} file(s)", files.len());

    let geometry = {
        let mut first = BufReader::new(File::open(&files[0])?);
        let header = LogHeader::read_from(&mut first)?;
        RecordGeometry::from_header(&header)?
    };

    let sources = files
        .iter()
        .map(|path| File::open(path).map(BufReader::new))
        .collect::<std::io::Result<Vec<_>>>()?;

    decode(sources, &geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_path_naming() {
        assert_eq!(
            chunk_path(Path::new("/tmp/run/log.data"), 2),
            PathBuf::from("/tmp/run/log_2.data")
        );
        assert_eq!(
            chunk_path(Path::new("log"), 0),
            PathBuf::from("log_0")
        );
    }

    #[test]
    fn test_single_chunk_uses_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("single.data");

        let written = write_chunks([&b"abc"[..]], &base).unwrap();
        assert_eq!(written, vec![base.clone()]);
        assert_eq!(fs::read(&base).unwrap(), b"abc");
        assert_eq!(discover_chunk_files(&base).unwrap(), vec![base]);
    }

    #[test]
    fn test_multiple_chunks_suffixed() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("multi.data");

        let written = write_chunks([&b"a"[..], &b"b"[..], &b"c"[..]], &base).unwrap();
        assert_eq!(written.len(), 3);
        assert!(!base.exists());
        assert_eq!(fs::read(chunk_path(&base, 2)).unwrap(), b"c");
        assert_eq!(discover_chunk_files(&base).unwrap(), written);
    }

    #[test]
    fn test_write_failure_reports_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("missing_dir").join("log.data");

        let err = write_chunks([&b"a"[..], &b"b"[..]], &base).unwrap_err();
        assert!(matches!(err, TelemetryError::ChunkWrite { index: 0, .. }));
    }

    #[test]
    fn test_failure_midway_keeps_earlier_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("log.data");
        // a directory where chunk 1 should go makes that write fail
        fs::create_dir(chunk_path(&base, 1)).unwrap();

        let err = write_chunks([&b"zero"[..], &b"one"[..], &b"two"[..]], &base).unwrap_err();
        match err {
            TelemetryError::ChunkWrite { index, path, .. } => {
                assert_eq!(index, 1);
                assert_eq!(path, chunk_path(&base, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read(chunk_path(&base, 0)).unwrap(), b"zero");
        assert!(!chunk_path(&base, 2).exists());
    }

    #[test]
    fn test_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_log_file(dir.path().join("nothing.data")),
            Err(TelemetryError::LogNotFound(_))
        ));
    }
}
