//! cardfill CLI
//!
//! Commands:
//!   plan - Split notes from a JSON file into prompt-sized batches
//!   predict - Show the predicted batch size for a budget
//!   config - Show or initialize the configuration

use anyhow::{bail, Context, Result};
use cardfill::{
    filter_by_note_type, filter_eligible, note_type_counts, predict_batch_size, Batcher, Config,
    FieldSelection, Note, NoteType, OversizePolicy, Partition, SelectionContext,
    TransformPromptRenderer,
};
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cardfill")]
#[command(about = "Batch flashcard notes into prompts for language-model field filling")]
#[command(version)]
struct Cli {
    /// Show debug logs (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split notes from a JSON file into prompt-sized batches
    Plan {
        /// JSON file containing an array of notes
        notes: PathBuf,

        /// Maximum prompt size in characters (default: from config)
        #[arg(long)]
        max_chars: Option<usize>,

        /// Maximum example notes per prompt (default: from config)
        #[arg(long)]
        max_examples: Option<usize>,

        /// Fields included as context
        #[arg(long, value_delimiter = ',', required = true)]
        selected: Vec<String>,

        /// Fields to fill when empty
        #[arg(long, value_delimiter = ',')]
        writable: Vec<String>,

        /// Fields to fill regardless of content
        #[arg(long, value_delimiter = ',')]
        overwritable: Vec<String>,

        /// Note type to process (default: the most common one)
        #[arg(long)]
        note_type: Option<String>,

        /// Skip notes that are too large instead of stopping
        #[arg(long)]
        skip_oversized: bool,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the predicted batch size for a budget
    Predict {
        /// Maximum prompt size in characters
        #[arg(long)]
        max_chars: usize,

        /// Number of notes
        #[arg(long)]
        notes: usize,

        /// Average note size in characters
        #[arg(long)]
        avg_size: f64,
    },

    /// Show the configuration
    Config {
        /// Write the default configuration if none exists
        #[arg(long)]
        init: bool,
    },
}

/// JSON form of a plan
#[derive(Serialize)]
struct PlanOutput<'a> {
    note_type: &'a str,
    batches: Vec<Vec<u64>>,
    stats: &'a cardfill::BatchingStats,
}

fn init_logging(verbose: bool, json: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        fmt.json().init();
    } else {
        fmt.init();
    }
}

fn load_notes(path: &PathBuf) -> Result<Vec<Note>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read notes file {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse notes file {:?}", path))
}

fn print_plan(partition: &Partition, note_type: &str) {
    let stats = &partition.stats;
    println!(
        "{} {} batches for {} notes of type '{}'\n",
        "✓".green(),
        stats.num_batches,
        stats.num_notes_selected,
        note_type
    );

    for (i, batch) in partition.batches.iter().enumerate() {
        let ids: Vec<String> = batch.ids().iter().map(|id| id.to_string()).collect();
        println!("  {} {} notes: {}", format!("#{}", i + 1).cyan(), batch.len(), ids.join(", ").dimmed());
    }

    let opt = |v: Option<usize>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
    println!();
    println!("  Median batch size: {}", opt(stats.median_batch_size));
    println!("  Average batch size: {}", opt(stats.avg_batch_size));
    println!("  Average note size: {} chars", stats.avg_note_size);
    println!("  Max prompt size: {} chars", stats.max_prompt_size);
    println!("  Prompts tried: {}", stats.num_prompts_tried);

    if !stats.oversized_notes.is_empty() {
        let ids: Vec<String> = stats.oversized_notes.iter().map(|id| id.to_string()).collect();
        println!("\n  {} Too large for one prompt: {}", "⚠".yellow(), ids.join(", "));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Plan {
            notes,
            max_chars,
            max_examples,
            selected,
            writable,
            overwritable,
            note_type,
            skip_oversized,
            json,
        } => {
            let config = Config::load_or_default()?;
            let all_notes = load_notes(&notes)?;

            let note_type = match note_type {
                Some(name) => name,
                None => match note_type_counts(&all_notes).into_iter().next() {
                    Some((name, _)) => name,
                    None => bail!("No notes found in {:?}", notes),
                },
            };

            let fields = FieldSelection {
                selected,
                writable,
                overwritable,
            };
            if fields.fields_to_fill().is_empty() {
                bail!("Specify at least one --writable or --overwritable field");
            }

            let of_type = filter_by_note_type(&all_notes, &note_type);
            let eligible = filter_eligible(&of_type, &fields);
            tracing::info!(
                total = all_notes.len(),
                of_type = of_type.len(),
                eligible = eligible.len(),
                "notes loaded"
            );

            // Examples come from the notes that are already complete.
            let renderer = TransformPromptRenderer::new()
                .with_field_instructions(config.field_instructions.clone())
                .with_example_pool(of_type.clone())
                .excluding(eligible.iter().map(|n| n.id));

            let mut batcher = Batcher::from_config(&config, renderer);
            if let Some(max_chars) = max_chars {
                batcher = batcher.with_max_chars(max_chars);
            }
            if let Some(max_examples) = max_examples {
                batcher = batcher.with_max_examples(max_examples);
            }
            if skip_oversized {
                batcher = batcher.with_oversize_policy(OversizePolicy::SkipNote);
            }

            let context = Arc::new(SelectionContext::new(NoteType::new(&note_type), fields));
            let partition = batcher.partition(&eligible, context)?;

            if json {
                let output = PlanOutput {
                    note_type: &note_type,
                    batches: partition
                        .batches
                        .iter()
                        .map(|b| b.ids().iter().map(|id| id.0).collect())
                        .collect(),
                    stats: &partition.stats,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_plan(&partition, &note_type);
            }
        }

        Commands::Predict {
            max_chars,
            notes,
            avg_size,
        } => {
            let size = predict_batch_size(max_chars, notes, avg_size);
            println!("Predicted batch size: {}", size.to_string().green().bold());
            println!(
                "  ({} notes, {} chars per prompt, {:.0} chars per note)",
                notes, max_chars, avg_size
            );
        }

        Commands::Config { init } => {
            let path = Config::path()?;
            let config = match Config::load()? {
                Some(config) => config,
                None if init => {
                    let config = Config::default();
                    config.save()?;
                    println!("{} Wrote default config to {}\n", "✓".green(), path.display());
                    config
                }
                None => {
                    println!("{}\n", format!("No config at {} (using defaults)", path.display()).dimmed());
                    Config::default()
                }
            };

            println!("  Max prompt size: {} chars", config.max_prompt_size);
            println!("  Max examples: {}", config.max_examples);
            println!("  Oversized notes: {}", config.oversize_policy.name());
            for (field, instruction) in &config.field_instructions {
                println!("  Instruction for '{}': {}", field, instruction);
            }
        }
    }

    Ok(())
}
