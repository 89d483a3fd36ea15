use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "normstate",
    about = "normstate: fold nested API payloads into flat collection state",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputArg {
    Legacy,
    Resolved,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge a payload into a collection of a state file
    Merge(MergeArgs),
    /// List the presets defined in a presets file
    Presets(PresetsArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Current state as a JSON mapping of collection to records; empty if omitted
    #[arg(long)]
    pub state: Option<PathBuf>,
    /// Incoming records: one JSON object or an array of objects
    #[arg(long)]
    pub payload: PathBuf,
    /// Target collection
    #[arg(short, long)]
    pub key: String,
    /// Method tag of the request that produced the payload
    #[arg(short, long, default_value = "GET")]
    pub method: String,
    /// Merge config file (.json or .toml)
    #[arg(long, conflicts_with = "preset")]
    pub config: Option<PathBuf>,
    /// Named preset from the presets file
    #[arg(long, requires = "presets")]
    pub preset: Option<String>,
    /// Presets file (TOML, one [presets.<name>] table per preset)
    #[arg(long)]
    pub presets: Option<PathBuf>,
    /// Override the config's output mode
    #[arg(long)]
    pub output: Option<OutputArg>,
    /// Print the full state with the merge applied instead of the partial state
    #[arg(long)]
    pub apply: bool,
}

#[derive(Args)]
pub struct PresetsArgs {
    /// Presets file (TOML)
    #[arg(long)]
    pub presets: PathBuf,
}
