//! tabstore CLI entry point.
//!
//! A small orchestrator that exercises the store the way a host
//! application would: declare a high-score table, record a few results,
//! and print the leaderboard.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tabstore::{ColumnSpec, ColumnType, TableStore, Value};

/// Persist and rank simple tabular data in a local SQLite file.
#[derive(Parser, Debug)]
#[command(name = "tabstore")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Database file to use
    #[arg(value_name = "FILE", default_value = "high_score.db")]
    db: PathBuf,

    /// How many rows to show
    #[arg(short = 'n', long = "limit", default_value = "10")]
    limit: u32,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let store = TableStore::new(&args.db);

    store
        .define_schema(
            "high_score",
            vec![
                ColumnSpec::new("name", ColumnType::Text),
                ColumnSpec::new("score", ColumnType::Integer),
            ],
        )
        .with_context(|| format!("failed to create high_score in {}", args.db.display()))?;

    for (name, score) in [("GG Meade", 3701), ("US Grant", 4242), ("GB McClellan", 107)] {
        store.insert("high_score", vec![Value::from(name), Value::from(score)])?;
    }

    let schema = store
        .schema("high_score")
        .context("high_score is not registered")?;
    let rows = store.query_top("high_score", "score", args.limit)?;

    println!("high_score (top {})", args.limit);
    for row in &rows {
        for (col, value) in schema.columns().iter().zip(row) {
            println!("{}: {}", col.name, value);
        }
    }

    Ok(())
}
