mod config;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tally::{AppError, LedgerService};
use tally_import::UploadedFile;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally", version, about = "Import bank CSV exports into a personal ledger")]
struct Cli {
    /// Config file (default: platform config dir, built-in settings if absent)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ledger file, overriding `ledger_path` from the config
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a CSV file into the ledger
    Import { file: PathBuf },
    /// Add a single transaction by hand
    Add {
        #[arg(long)]
        date: String,
        #[arg(long)]
        description: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete the transaction at INDEX
    Delete {
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// List the ledger
    List,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", render_error(&e));
            ExitCode::FAILURE
        }
    }
}

fn render_error(e: &anyhow::Error) -> String {
    match e.downcast_ref::<AppError>() {
        Some(app) => {
            let body = app.body();
            format!("error[{}]: {}", body.kind, body.message)
        }
        None => format!("error: {e:#}"),
    }
}

fn run(cli: Cli) -> Result<()> {
    let cfg = config::load_config(cli.config.as_deref())?;
    let ledger_path = cli.ledger.unwrap_or(cfg.ledger_path);
    tracing::debug!(path = %ledger_path.display(), "opening ledger");
    let service = LedgerService::open(ledger_path, cfg.matcher)?;

    match cli.cmd {
        Command::Import { file } => {
            let contents = fs::read(&file).with_context(|| format!("read {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let upload = service.upload(Some(UploadedFile {
                filename: &filename,
                contents: &contents,
            }))?;

            for m in upload.mapping.entries() {
                println!("  {:<20} -> {:<12} ({}, {})", m.source, m.target, m.score, m.strategy);
            }
            for record in &upload.records {
                println!("{record}");
            }
            println!(
                "Imported {} of {} rows ({} rejected)",
                upload.records.len(),
                upload.rows_read,
                upload.rows_rejected()
            );
        }
        Command::Add {
            date,
            description,
            amount,
            category,
        } => {
            let mut fields = Map::new();
            fields.insert("date".into(), Value::String(date));
            fields.insert("description".into(), Value::String(description));
            fields.insert("amount".into(), Value::String(amount));
            if let Some(category) = category {
                fields.insert("category".into(), Value::String(category));
            }
            let record = service.add(&fields)?;
            println!("Added: {record}");
        }
        Command::Delete { index } => {
            let record = service.delete(index)?;
            println!("Deleted: {record}");
        }
        Command::List => {
            let records = service.transactions();
            if records.is_empty() {
                println!("Ledger is empty.");
            }
            for (i, record) in records.iter().enumerate() {
                println!("{i:>4}  {record}");
            }
        }
    }
    Ok(())
}
