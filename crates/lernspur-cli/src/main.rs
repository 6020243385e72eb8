//! CLI for lernspur.
//!
//! Creates new learner actions from untyped arguments, decodes persisted wire dicts from JSONL
//! files or stdin, and keeps per-kind statistics. The latest schema version is resolved once at
//! startup and stamped on every action created by this process.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lernspur_core::{
    decode_str, init_latest_schema_version, ActionFactory, ActionKind, ActionPayload,
    LearnerAction, SchemaVersion, DEFAULT_LATEST_SCHEMA_VERSION,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

const SCHEMA_VERSION_ENV: &str = "LERNSPUR_SCHEMA_VERSION";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Latest schema version stamped on new actions (overrides LERNSPUR_SCHEMA_VERSION)
    #[arg(long, global = true)]
    schema_version: Option<u32>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an action from unwrapped customization args and print its wire dict
    New {
        /// Action type, e.g. ExplorationStart
        #[arg(value_parser = parse_kind)]
        kind: ActionKind,

        /// Customization args as a flat JSON object, e.g. '{"state_name":"Intro"}'
        #[arg(long)]
        args: String,
    },
    /// Decode learner action dicts (one per line) from a file or stdin
    Decode {
        /// Input file path (default: stdin)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Merge counters for the decoded actions into this stats file
        #[arg(long)]
        stats_file: Option<PathBuf>,
    },
    /// List known action types and their customization arg keys
    Kinds,
}

fn parse_kind(raw: &str) -> std::result::Result<ActionKind, String> {
    ActionKind::from_wire(raw).ok_or_else(|| {
        let known: Vec<&str> = ActionKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown action type '{raw}' (expected one of {})", known.join(", "))
    })
}

/// Flag beats environment, environment beats the built-in default.
fn resolve_schema_version(flag: Option<u32>, env_value: Option<&str>) -> Result<SchemaVersion> {
    let raw = match (flag, env_value) {
        (Some(version), _) => version,
        (None, Some(value)) => value.trim().parse::<u32>().with_context(|| {
            format!("{SCHEMA_VERSION_ENV} must be a positive integer, got {value:?}")
        })?,
        (None, None) => DEFAULT_LATEST_SCHEMA_VERSION,
    };
    Ok(SchemaVersion::new(raw)?)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Serialize, Deserialize, Debug)]
struct ActionStats {
    total_processed: u64,
    by_kind: HashMap<String, u64>,
    by_state: HashMap<String, u64>,
    total_time_spent_msecs: f64,
    #[serde(with = "time::serde::iso8601")]
    last_updated: OffsetDateTime,
}

impl Default for ActionStats {
    fn default() -> Self {
        Self {
            total_processed: 0,
            by_kind: HashMap::new(),
            by_state: HashMap::new(),
            total_time_spent_msecs: 0.0,
            last_updated: OffsetDateTime::now_utc(),
        }
    }
}

impl ActionStats {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(path)?;
        let stats = serde_json::from_reader(file)?;
        Ok(stats)
    }

    fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    fn update(&mut self, action: &LearnerAction) {
        self.total_processed += 1;
        *self.by_kind.entry(action.kind().to_string()).or_insert(0) += 1;
        *self
            .by_state
            .entry(action.state_name().to_string())
            .or_insert(0) += 1;
        let spent = match action.customization_args() {
            ActionPayload::ExplorationStart(_) => 0.0,
            ActionPayload::AnswerSubmit(args) => args.time_spent_in_state_msecs.as_f64(),
            ActionPayload::ExplorationQuit(args) => args.time_spent_in_state_msecs.as_f64(),
        };
        self.total_time_spent_msecs += spent;
        self.last_updated = OffsetDateTime::now_utc();
    }
}

/// Decodes one wire dict per non-blank line; the first bad line aborts the batch.
fn decode_lines(reader: impl BufRead) -> Result<Vec<LearnerAction>> {
    let mut actions = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let action =
            decode_str(&line).with_context(|| format!("Failed to decode line {}", idx + 1))?;
        actions.push(action);
    }
    Ok(actions)
}

fn run_new(kind: ActionKind, raw_args: &str) -> Result<()> {
    let args: Value = serde_json::from_str(raw_args).context("--args is not valid JSON")?;
    let action = ActionFactory::latest().create_from_args(kind, &args)?;
    tracing::debug!(action_type = %kind, schema_version = %action.schema_version(), "created learner action");
    serde_json::to_writer_pretty(io::stdout(), &action.to_wire())?;
    println!();
    Ok(())
}

fn run_decode(path: Option<&Path>, stats_file: Option<&Path>) -> Result<()> {
    // A stats file we cannot read aborts before anything is printed or overwritten.
    let stats = stats_file
        .map(|file| {
            ActionStats::load(file)
                .with_context(|| format!("Failed to read stats file {}", file.display()))
        })
        .transpose()?;

    let reader: Box<dyn BufRead> = match path {
        Some(p) => Box::new(BufReader::new(
            File::open(p).with_context(|| format!("Failed to open input file {}", p.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let actions = decode_lines(reader)?;
    tracing::debug!(count = actions.len(), "decoded learner actions");

    for action in &actions {
        println!(
            "{}\t{}\tv{}",
            action.kind(),
            action.state_name(),
            action.schema_version()
        );
    }

    if let (Some(stats_file), Some(mut stats)) = (stats_file, stats) {
        for action in &actions {
            stats.update(action);
        }
        stats.last_updated = OffsetDateTime::now_utc();
        stats.save(stats_file).context("Failed to save stats")?;
        println!(
            "Processed {} actions. (Stats updated at {})",
            actions.len(),
            stats.last_updated
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let env_value = env::var(SCHEMA_VERSION_ENV).ok();
    let version = resolve_schema_version(cli.schema_version, env_value.as_deref())?;
    init_latest_schema_version(version).context("Failed to initialize schema version")?;
    tracing::debug!(%version, "latest learner action schema version");

    match cli.command {
        Commands::New { kind, args } => run_new(kind, &args)?,
        Commands::Decode { path, stats_file } => {
            run_decode(path.as_deref(), stats_file.as_deref())?;
        }
        Commands::Kinds => {
            for kind in ActionKind::ALL {
                println!("{kind}\t{}", kind.wire_keys().join(", "));
            }
        }
    }

    Ok(())
}
