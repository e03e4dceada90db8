use std::path::Path;
use std::sync::OnceLock;
use telemetry::RecorderConfig;
use tracing::info;

static CONFIG_CACHE: OnceLock<RecorderConfig> = OnceLock::new();

const DEFAULT_CONFIG_FILE: &str = "recorder.json";

/// Load the recorder config once: the `--config` file if given, else
/// `recorder.json` when present, else built-in defaults.
pub fn init_config(explicit: Option<&Path>) -> Result<&'static RecorderConfig, String> {
    let default_path = Path::new(DEFAULT_CONFIG_FILE);

    let config = match explicit {
        Some(path) => RecorderConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None if default_path.is_file() => {
            RecorderConfig::from_json_file(default_path).map_err(|e| e.to_string())?
        }
        None => RecorderConfig::default(),
    };

    info!(
        "Config initialized: chunk capacity {} bytes, time unit {}s",
        config.chunk_capacity_bytes, config.time_unit
    );

    CONFIG_CACHE
        .set(config)
        .map_err(|_| "Config already initialized".to_string())?;

    Ok(get_cached_config())
}

pub fn get_cached_config() -> &'static RecorderConfig {
    CONFIG_CACHE.get().expect("Config not initialized")
}
