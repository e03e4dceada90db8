use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Fixed-schema binary telemetry recorder", long_about = None)]
pub struct Cli {
    /// Recorder config file (JSON); defaults to ./recorder.json when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommands {
    /// Record a simulated session and write it to disk
    Record {
        /// Output file; several chunks get a numeric suffix
        output: PathBuf,
        /// Number of timesteps to record
        #[arg(default_value_t = 10_000)]
        steps: u64,
    },
    /// Decode a log (single or multi-chunk) and print it as JSON
    #[command(alias = "cat")]
    Inspect { log: PathBuf },
}
