pub mod recorder_config;
