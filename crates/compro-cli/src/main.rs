//! Thin CLI driver for the comprehension evaluator: read a `Comprehension`
//! document, compile it, instantiate it, print the results. Not a
//! reconciler — it wires up an empty object store and a real HTTP fetcher
//! and gets out of the way.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use compro_store::{InMemoryStore, ReqwestFetcher};
use compro_types::ComprehensionDocument;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Level;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

/// Evaluate a `Comprehension` object and print its generated values.
#[derive(Debug, Parser)]
#[command(name = "compro", about = "Comprehension generator")]
struct Cli {
    /// Path to a file containing a Comprehension object specification, or `-` for stdin
    #[arg(short, long, default_value = "-")]
    file: String,

    /// Output format for the emitted values
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    output: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_max_level(Level::INFO).try_init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let input = read_input(&cli.file)?;
    let doc: ComprehensionDocument = serde_yaml::from_str(&input).context("parsing comprehension document")?;

    let compiled = compro_engine::compile(&doc.spec).context("compiling comprehension spec")?;

    let cancelled = Arc::new(AtomicBool::new(false));
    let watcher = {
        let cancelled = cancelled.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancelled.store(true, Ordering::SeqCst);
            }
        })
    };

    let results = tokio::task::spawn_blocking(move || {
        let store = InMemoryStore::new();
        let fetcher = ReqwestFetcher;
        compiled.eval_cancellable(&store, &fetcher, &|| cancelled.load(Ordering::SeqCst))
    })
    .await
    .context("evaluator task panicked")??;

    watcher.abort();
    print_results(&results, cli.output)
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading {file}"))
    }
}

fn print_results(results: &[serde_json::Value], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => {
            for value in results {
                println!("---");
                print!("{}", serde_yaml::to_string(value)?);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
    }
    Ok(())
}
