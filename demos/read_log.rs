// Example usage of the telemetry recorder: record, persist, read back

use telemetry::{read_log_file, RecorderConfig, Result, TelemetryData, TelemetryRecorder};
use tracing::{debug, info, Level};
use tracing_subscriber;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    // Register signals
    let mut data = TelemetryData::new();
    data.register_constant("Demo.Name", "read_log")?;
    let counter = data.register_int("Demo.Counter", 0)?;
    let angle = data.register_float("Demo.Angle", 0.0)?;

    // Small chunks so the log spans several files
    let config = RecorderConfig {
        chunk_capacity_bytes: 4096,
        time_unit: 1.0e-3,
    };
    let mut recorder = TelemetryRecorder::with_config(&config);
    recorder.initialize(&data, config.time_unit)?;

    for i in 0..500 {
        let t = i as f64 * 0.01;
        data.set_int(counter, i);
        data.set_float(angle, t.sin());
        recorder.flush_data_snapshot(t)?;
    }
    info!("Recorded {} snapshots in {} chunks", recorder.recorded_snapshots(), recorder.chunk_count());

    let base = std::env::temp_dir().join("read_log_demo.data");
    let files = recorder.write_data_binary(&base)?;
    for file in &files {
        debug!("  wrote {}", file.display());
    }

    // Read everything back from disk
    let log = read_log_file(&base)?;
    info!("Total records: {}", log.len());
    info!("Fields: {:?}", log.fieldnames);

    if let Some(angles) = log.float_column("Demo.Angle") {
        let times = log.times();
        info!("First record: t={}, angle={}", times[0], angles[0]);
        info!("Last record: t={}, angle={}", times[log.len() - 1], angles[log.len() - 1]);
    }

    // Same result without going through the disk
    let in_memory = recorder.get_data()?;
    info!("In-memory decode matches file decode: {}", in_memory == log);

    for file in files {
        std::fs::remove_file(file)?;
    }
    Ok(())
}
