use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use polltape_doc::Document;
use polltape_review::{
    CommitOutcome, EditSession, ReviewConfig, ReviewSummary, SaveOutcome, TimestampComponent,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod file_sink;

use file_sink::FileSaveSink;

#[derive(Debug, Parser)]
#[command(name = "polltape-review", about = "Review and correct a scanned poll tape")]
struct Args {
    /// JSON review config (malformed-input policy, extra field kinds).
    #[arg(long, global = true, env = "POLLTAPE_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, env = "POLLTAPE_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the review summary of a poll tape.
    Show {
        #[arg(long)]
        document: PathBuf,
    },
    /// Apply corrections, print the summary and save the result.
    Edit {
        #[arg(long)]
        document: PathBuf,

        /// Where to save; defaults to overwriting the document.
        #[arg(long)]
        output: Option<PathBuf>,

        /// `path=text` for plain and calendar-date fields.
        #[arg(long = "set", value_parser = parse_assignment)]
        sets: Vec<Assignment>,

        /// `path=MM/DD/YYYY` for the date of a timestamp field.
        #[arg(long = "date", value_parser = parse_assignment)]
        dates: Vec<Assignment>,

        /// `path=HH:MM AM/PM` for the time of a timestamp field.
        #[arg(long = "time", value_parser = parse_assignment)]
        times: Vec<Assignment>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Assignment {
    path: String,
    text: String,
}

fn parse_assignment(raw: &str) -> Result<Assignment, String> {
    let (path, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected path=value, got {raw:?}"))?;
    let path = path.trim();
    if path.is_empty() {
        return Err(format!("missing path in {raw:?}"));
    }
    Ok(Assignment {
        path: path.to_string(),
        text: text.to_string(),
    })
}

fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ReviewConfig> {
    match path {
        Some(path) => Ok(ReviewConfig::load(path)?),
        None => Ok(ReviewConfig::default()),
    }
}

fn load_document(path: &Path) -> anyhow::Result<Document> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse document {} (JSON)", path.display()))?;
    if !value.is_object() {
        bail!("document {} is not a JSON object", path.display());
    }
    Ok(Document::from_value(value))
}

fn report(kind: &str, assignment: &Assignment, outcome: &CommitOutcome) {
    match outcome {
        CommitOutcome::Applied { .. } => {
            tracing::info!(path = %assignment.path, kind, "applied");
        }
        CommitOutcome::Unchanged { .. } => {
            tracing::info!(path = %assignment.path, kind, "unchanged");
        }
        CommitOutcome::Rejected { error } => {
            tracing::warn!(path = %assignment.path, kind, error = %error, "skipped");
        }
    }
}

async fn edit(
    config: &ReviewConfig,
    document: &Path,
    output: Option<PathBuf>,
    sets: &[Assignment],
    dates: &[Assignment],
    times: &[Assignment],
) -> anyhow::Result<()> {
    let initial = load_document(document)?;
    let target = output.unwrap_or_else(|| document.to_path_buf());
    let session = EditSession::from_config(initial, Arc::new(FileSaveSink::new(&target)), config)?;

    for a in sets {
        let outcome = session
            .commit_field(&a.path, &a.text)
            .with_context(|| format!("--set {}", a.path))?;
        report("set", a, &outcome);
    }
    for a in dates {
        let outcome = session
            .commit_timestamp_component(&a.path, TimestampComponent::Date, &a.text)
            .with_context(|| format!("--date {}", a.path))?;
        report("date", a, &outcome);
    }
    for a in times {
        let outcome = session
            .commit_timestamp_component(&a.path, TimestampComponent::Time, &a.text)
            .with_context(|| format!("--time {}", a.path))?;
        report("time", a, &outcome);
    }

    print!("{}", ReviewSummary::from_document(&session.current()));

    match session.save().await? {
        SaveOutcome::Skipped => tracing::info!("no changes to save"),
        SaveOutcome::Saved { .. } => {
            tracing::info!(path = %target.display(), revision = session.revision(), "saved");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Show { document } => {
            let doc = load_document(&document)?;
            print!("{}", ReviewSummary::from_document(&doc));
            Ok(())
        }
        Command::Edit {
            document,
            output,
            sets,
            dates,
            times,
        } => edit(&config, &document, output, &sets, &dates, &times).await,
    }
}
