use pretty_assertions::assert_eq;
use std::fs::{self, File};
use std::io::BufReader;
use telemetry::{
    chunk_path, decode, get_data, read_log_file, RecorderConfig, TelemetryData, TelemetryError,
    TelemetryRecorder,
};

fn config(capacity: usize) -> RecorderConfig {
    RecorderConfig {
        chunk_capacity_bytes: capacity,
        time_unit: 1.0e-3,
    }
}

struct Signals {
    data: TelemetryData,
    ints: [telemetry::IntHandle; 2],
    floats: [telemetry::FloatHandle; 1],
}

fn signals() -> Signals {
    let mut data = TelemetryData::new();
    data.register_constant("Engine.Build", "test").unwrap();
    let ints = [
        data.register_int("A.Count", 0).unwrap(),
        data.register_int("A.Mode", 0).unwrap(),
    ];
    let floats = [data.register_float("B.Level", 0.0).unwrap()];
    Signals { data, ints, floats }
}

fn record(recorder: &mut TelemetryRecorder<'_>, signals: &Signals, steps: i64) {
    for step in 0..steps {
        signals.data.set_int(signals.ints[0], step);
        signals.data.set_int(signals.ints[1], -step * 3);
        signals.data.set_float(signals.floats[0], step as f64 * 0.25);
        recorder.flush_data_snapshot(step as f64 * 0.002).unwrap();
    }
}

#[test]
fn single_chunk_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("log.data");
    let signals = signals();

    let mut recorder = TelemetryRecorder::with_config(&config(1 << 16));
    recorder.initialize(&signals.data, 1.0e-3).unwrap();
    record(&mut recorder, &signals, 20);

    let files = recorder.write_data_binary(&base).unwrap();
    assert_eq!(files, vec![base.clone()]);

    let from_disk = read_log_file(&base).unwrap();
    let in_memory = recorder.get_data().unwrap();
    assert_eq!(from_disk, in_memory);

    assert_eq!(from_disk.timestamps, (0..20).map(|s| s * 2).collect::<Vec<i64>>());
    assert_eq!(from_disk.int_data[7], vec![7, -21]);
    assert_eq!(from_disk.float_data[4], vec![1.0]);
    assert_eq!(
        from_disk.fieldnames,
        vec!["Global.Time", "A.Count", "A.Mode", "B.Level"]
    );
    assert!(from_disk
        .constants
        .contains(&("Engine.Build".to_string(), "test".to_string())));
}

#[test]
fn multi_chunk_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("long.data");
    let signals = signals();

    let mut recorder = TelemetryRecorder::with_config(&config(512));
    recorder.initialize(&signals.data, 1.0e-3).unwrap();
    let geometry = recorder.geometry().unwrap();

    for step in 0..100 {
        signals.data.set_int(signals.ints[0], step);
        signals.data.set_int(signals.ints[1], -step * 3);
        signals.data.set_float(signals.floats[0], step as f64 * 0.25);
        let chunks_before = recorder.chunk_count();
        recorder.flush_data_snapshot(step as f64 * 0.002).unwrap();

        for chunk in recorder.chunks() {
            assert!(chunk.len() <= 512);
            assert_eq!((chunk.len() - geometry.header_size) % geometry.record_size(), 0);
        }
        if recorder.chunk_count() > chunks_before {
            // a fresh chunk holds its header and exactly the record just flushed
            let last = recorder.chunks().last().unwrap();
            assert_eq!(last.len(), geometry.header_size + geometry.record_size());
        }
    }

    let per_chunk = (512 - geometry.header_size) / geometry.record_size();
    let expected_chunks = (100 + per_chunk - 1) / per_chunk;
    assert_eq!(recorder.chunk_count(), expected_chunks);
    assert!(recorder.chunk_count() > 2);

    let files = recorder.write_data_binary(&base).unwrap();
    assert_eq!(files.len(), expected_chunks);
    assert_eq!(files[1], chunk_path(&base, 1));

    let log = read_log_file(&base).unwrap();
    assert_eq!(log.len(), 100);
    assert_eq!(log.int_column("A.Count").unwrap(), (0..100).collect::<Vec<i64>>());
    assert_eq!(log, recorder.get_data().unwrap());
}

#[test]
fn every_chunk_decodes_on_its_own() {
    let signals = signals();
    let mut recorder = TelemetryRecorder::with_config(&config(512));
    recorder.initialize(&signals.data, 1.0e-3).unwrap();
    record(&mut recorder, &signals, 60);

    let geometry = recorder.geometry().unwrap();
    let mut total = 0;
    let mut timestamps = Vec::new();
    for chunk in recorder.chunks() {
        let part = decode([chunk], &geometry).unwrap();
        total += part.len();
        timestamps.extend(part.timestamps);
    }
    assert_eq!(total, 60);
    assert_eq!(timestamps, recorder.get_data().unwrap().timestamps);
}

#[test]
fn three_sources_from_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let signals = signals();
    let mut paths = Vec::new();
    let mut expected = 0;
    let mut geometry = None;

    for (index, steps) in [3, 5, 2].into_iter().enumerate() {
        let mut recorder = TelemetryRecorder::with_config(&config(1 << 16));
        recorder.initialize(&signals.data, 1.0e-3).unwrap();
        record(&mut recorder, &signals, steps);
        expected += steps as usize;
        geometry = recorder.geometry();

        let path = dir.path().join(format!("part{}.data", index));
        recorder.write_data_binary(&path).unwrap();
        paths.push(path);
    }

    let geometry = geometry.unwrap();
    let sources: Vec<_> = paths
        .iter()
        .map(|p| BufReader::new(File::open(p).unwrap()))
        .collect();
    let log = get_data(
        sources,
        geometry.integer_section_size(),
        geometry.float_section_size(),
        geometry.header_size,
    )
    .unwrap();

    assert_eq!(log.len(), expected);
    assert_eq!(log.int_column("A.Count").unwrap(), vec![0, 1, 2, 0, 1, 2, 3, 4, 0, 1]);
}

#[test]
fn truncated_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("cut.data");
    let signals = signals();

    let mut recorder = TelemetryRecorder::with_config(&config(1 << 16));
    recorder.initialize(&signals.data, 1.0e-3).unwrap();
    record(&mut recorder, &signals, 4);
    recorder.write_data_binary(&base).unwrap();

    let mut bytes = fs::read(&base).unwrap();
    bytes.truncate(bytes.len() - 5);
    fs::write(&base, bytes).unwrap();

    assert!(matches!(
        read_log_file(&base),
        Err(TelemetryError::TruncatedSource { source_index: 0, .. })
    ));
}

#[test]
fn write_before_initialize_fails() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = TelemetryRecorder::with_config(&config(1 << 16));
    assert!(matches!(
        recorder.write_data_binary(dir.path().join("x.data")),
        Err(TelemetryError::NotInitialized)
    ));
}
