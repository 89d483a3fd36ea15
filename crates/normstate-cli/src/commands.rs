use colored::Colorize;
use normstate_merge::{diff_collections, CollectionChange, StateMerger};
use normstate_types::{MergeConfig, OutputMode, PartialState, State};
use serde::Serialize;

use crate::cli::*;
use crate::config::{load_config, load_payload, load_state, MergePresets};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Merge(args) => cmd_merge(args, &cli.format),
        Command::Presets(args) => cmd_presets(args, &cli.format),
    }
}

fn resolve_config(args: &MergeArgs) -> anyhow::Result<MergeConfig> {
    let mut config = match (&args.config, &args.preset, &args.presets) {
        (Some(path), _, _) => load_config(path)?,
        (None, Some(name), Some(path)) => MergePresets::load(path)?.get(name)?.clone(),
        _ => MergeConfig::default(),
    };
    if let Some(output) = args.output {
        config.output = match output {
            OutputArg::Legacy => OutputMode::Legacy,
            OutputArg::Resolved => OutputMode::Resolved,
        };
    }
    Ok(config)
}

fn cmd_merge(args: MergeArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let state = load_state(args.state.as_deref())?;
    let payload = load_payload(&args.payload)?;

    tracing::debug!(
        collection = %args.key,
        method = %args.method,
        strategy = %config.strategy(),
        "running merge"
    );
    let partial = StateMerger::new().merge_json(&state, &args.method, &args.key, payload, &config)?;

    if args.apply {
        let applied = state.clone().with_applied(partial);
        match format {
            OutputFormat::Json => print_json(&applied),
            OutputFormat::Text => {
                print_applied(&state, &applied);
                Ok(())
            }
        }
    } else {
        match format {
            OutputFormat::Json => print_json(&partial),
            OutputFormat::Text => {
                print_partial(&args.key, &partial);
                Ok(())
            }
        }
    }
}

fn print_partial(key: &str, partial: &PartialState) {
    println!("{} Merged into {}", "✓".green().bold(), key.yellow().bold());
    for name in partial.keys() {
        let len = partial.get(name).map_or(0, <[_]>::len);
        println!("  {:<20} {} record(s)", name.cyan(), len);
    }
}

fn print_applied(before: &State, after: &State) {
    let diff = diff_collections(before, after);
    if diff.is_empty() {
        println!("No changes.");
        return;
    }
    println!(
        "{} {} added, {} modified, {} removed",
        "✓".green().bold(),
        diff.additions(),
        diff.modifications(),
        diff.removals()
    );
    for change in &diff.changes {
        match change {
            CollectionChange::Added { collection, len } => {
                println!("  {} {:<20} {} record(s)", "+".green(), collection, len)
            }
            CollectionChange::Removed { collection, len } => {
                println!("  {} {:<20} {} record(s)", "-".red(), collection, len)
            }
            CollectionChange::Modified {
                collection,
                old_len,
                new_len,
            } => println!(
                "  {} {:<20} {} -> {} record(s)",
                "~".yellow(),
                collection,
                old_len,
                new_len
            ),
        }
    }
}

fn cmd_presets(args: PresetsArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let presets = MergePresets::load(&args.presets)?;
    match format {
        OutputFormat::Json => {
            let listing: Vec<PresetSummary> = presets
                .presets
                .iter()
                .map(|(name, config)| PresetSummary::new(name, config))
                .collect();
            print_json(&listing)
        }
        OutputFormat::Text => {
            if presets.presets.is_empty() {
                println!("No presets defined.");
            }
            for (name, config) in &presets.presets {
                let summary = PresetSummary::new(name, config);
                print!("{:<20} {}", name.bold(), summary.strategy.cyan());
                if !summary.collections.is_empty() {
                    print!("  -> {}", summary.collections.join(", "));
                }
                println!();
            }
            Ok(())
        }
    }
}

#[derive(Debug, Serialize)]
struct PresetSummary {
    name: String,
    strategy: String,
    output: OutputMode,
    collections: Vec<String>,
}

impl PresetSummary {
    fn new(name: &str, config: &MergeConfig) -> Self {
        Self {
            name: name.to_string(),
            strategy: config.strategy().to_string(),
            output: config.output,
            collections: config
                .normalizer
                .as_ref()
                .map(|n| n.collections().into_iter().map(String::from).collect())
                .unwrap_or_default(),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
