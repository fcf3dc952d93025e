use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use minilog::config::Config;
use minilog::convert::{convert_dir, convert_file};
use minilog::table::MessageTable;

/// Replace C logging format strings with compact message ids.
#[derive(Debug, Parser)]
#[command(name = "minilog", version)]
struct Cli {
    /// Source file or directory to convert.
    source: PathBuf,

    /// Destination file or directory for the rewritten source.
    dest: PathBuf,

    /// Where to write the message table.
    #[arg(long, default_value = "messages.tsv")]
    table: PathBuf,

    /// Optional JSON config overriding the recognized macros, id base and
    /// width, and level-argument emission.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start a fresh table instead of appending to an existing one.
    #[arg(long)]
    fresh: bool,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    let table = if !cli.fresh && cli.table.exists() {
        let path = cli.table.display().to_string();
        let file = File::open(&cli.table).with_context(|| format!("opening {path}"))?;
        MessageTable::read_tsv(&config, BufReader::new(file), &path)?
    } else {
        MessageTable::new(&config)
    };

    let calls = if cli.source.is_dir() {
        convert_dir(&cli.source, &cli.dest, &config, &table)?
    } else {
        convert_file(&cli.source, &cli.dest, &config, &table)?
    };

    if let Some(parent) = cli.table.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let out = File::create(&cli.table)
        .with_context(|| format!("writing {}", cli.table.display()))?;
    table
        .write_tsv(BufWriter::new(out))
        .with_context(|| format!("writing {}", cli.table.display()))?;

    info!(
        calls,
        messages = table.len(),
        table = %cli.table.display(),
        "conversion complete"
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
