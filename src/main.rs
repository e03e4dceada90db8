use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rand::Rng;
use std::path::Path;
use telemetry::{read_log_file, TelemetryData, TelemetryRecorder};
use tracing::{info, Level};
use tracing_subscriber;

mod cli;
mod utils;

use crate::cli::model::{Cli, CliCommands};
use crate::utils::conf_helper::init_config;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();
    match cli.command {
        CliCommands::Record { output, steps } => record(cli.config.as_deref(), &output, steps),
        CliCommands::Inspect { log } => inspect(&log),
    }
}

// Damped oscillator sampled by a noisy position sensor.
fn record(config_path: Option<&Path>, output: &Path, steps: u64) -> Result<()> {
    let config = init_config(config_path).map_err(|e| anyhow!(e))?;

    let mut data = TelemetryData::new();
    data.register_constant("Global.StartTime", chrono::Utc::now().to_rfc3339())?;
    data.register_constant("Engine.Version", env!("CARGO_PKG_VERSION"))?;
    let step = data.register_int("Engine.Step", 0)?;
    let contact = data.register_int("Engine.Contact", 0)?;
    let position = data.register_float("Body.Position", 1.0)?;
    let velocity = data.register_float("Body.Velocity", 0.0)?;
    let sensor = data.register_float("Sensor.Position", 1.0)?;

    let mut recorder = TelemetryRecorder::with_config(config);
    recorder.initialize(&data, config.time_unit)?;

    let mut rng = rand::thread_rng();
    let dt = 1.0e-3;
    let (stiffness, damping) = (40.0, 0.4);

    for i in 0..steps {
        let (x, v) = (data.get_float(position), data.get_float(velocity));
        let a = -stiffness * x - damping * v;
        let v = v + a * dt;
        let x = x + v * dt;

        data.set_int(step, i as i64);
        data.set_int(contact, i64::from(x < 0.0));
        data.set_float(position, x);
        data.set_float(velocity, v);
        data.set_float(sensor, x + rng.gen_range(-1.0e-3..1.0e-3));

        recorder.flush_data_snapshot(i as f64 * dt)?;
    }

    let files = recorder.write_data_binary(output)?;
    info!("{} snapshots written to {} file(s)", recorder.recorded_snapshots(), files.len());

    let log = recorder.get_data()?;
    info!(
        "Decoded {} records, {} int and {} float fields",
        log.len(),
        log.num_int,
        log.num_float
    );
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let log = read_log_file(path).with_context(|| format!("reading {}", path.display()))?;
    info!("{} records, time unit {}s", log.len(), log.time_unit);
    println!("{}", log.to_json()?);
    Ok(())
}
