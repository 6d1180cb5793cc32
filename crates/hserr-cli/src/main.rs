use anyhow::Context;
use clap::{Parser, Subcommand};
use hserr_log::{Document, EventKind, parse_document};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hserr")]
#[command(about = "JVM fatal error log tools", long_about = None)]
struct Cli {
    /// Log progress to stderr; repeat for more detail (overridden by RUST_LOG)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a crash log and emit the event document as JSON
    Parse {
        /// Path to the hs_err_pid*.log file
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Leave out padding, blank lines and other throwaway events
        #[arg(long)]
        skip_throwaway: bool,
        /// Leave out lines no grammar recognized
        #[arg(long)]
        skip_unknown: bool,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Print `index kind role` for every line
    Classify {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Print the detected platform, signal and a count of events per kind
    Summary {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Parse {
            path,
            skip_throwaway,
            skip_unknown,
            compact,
        } => {
            let mut doc = read_document(path)?;
            doc.events.retain(|e| {
                !((*skip_throwaway && e.is_throwaway()) || (*skip_unknown && e.is_unknown()))
            });
            let json = if *compact {
                serde_json::to_string(&doc)?
            } else {
                serde_json::to_string_pretty(&doc)?
            };
            println!("{json}");
        }
        Commands::Classify { path } => {
            let doc = read_document(path)?;
            for event in &doc.events {
                println!("{} {} {}", event.index, event.kind, event.role);
            }
        }
        Commands::Summary { path } => {
            let doc = read_document(path)?;
            print_summary(&doc);
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn read_document(path: &Path) -> anyhow::Result<Document> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    // Crash logs are written by a dying process and may contain stray bytes.
    let content = String::from_utf8_lossy(&bytes);
    let doc = parse_document(content.lines());
    log::info!("{}: {} lines classified", path.display(), doc.events.len());
    Ok(doc)
}

fn print_summary(doc: &Document) {
    match &doc.os {
        Some(os) => {
            let vendor = os.vendor.map_or_else(|| "-".to_string(), |v| format!("{v:?}"));
            let version = os.version.as_deref().unwrap_or("-");
            println!("os: {:?} {} {}", os.family, vendor, version);
        }
        None => println!("os: unknown"),
    }
    match &doc.arch {
        Some(arch) => println!("arch: {arch:?}"),
        None => println!("arch: unknown"),
    }
    match doc.signal() {
        Some(signal) => {
            let address = signal
                .address
                .map_or_else(|| "-".to_string(), |a| a.to_string());
            println!("signal: {:?} at {}", signal.signal, address);
        }
        None => println!("signal: none"),
    }

    let truncated = doc.events.iter().filter(|e| e.truncated).count();
    if truncated > 0 {
        println!("truncated sub-reports: {truncated}");
    }

    let mut counts: BTreeMap<EventKind, usize> = BTreeMap::new();
    for event in &doc.events {
        *counts.entry(event.kind).or_default() += 1;
    }
    println!("events:");
    for (kind, count) in counts {
        println!("  {:<32} {count}", kind.slug());
    }
}
