use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use where_polyfill::host::memory::MemoryDocument;
use where_polyfill::polyfill::{IntervalTrigger, Scheduler};
use where_polyfill::{Engine, EngineConfig};

use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Engine configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the condition classes compiled from a document's stylesheets
    Scan {
        /// Document fixture (YAML or JSON)
        #[arg(short, long)]
        document: String,
    },
    /// Run a single apply cycle and print the resulting classes
    Apply {
        /// Document fixture (YAML or JSON)
        #[arg(short, long)]
        document: String,
    },
    /// Keep applying on the polling interval
    Watch {
        /// Document fixture (YAML or JSON)
        #[arg(short, long)]
        document: String,

        /// Override the configured polling interval
        #[arg(short, long)]
        interval_ms: Option<u64>,

        /// Stop after this many cycles instead of running until Ctrl-C
        #[arg(long)]
        cycles: Option<u64>,
    },
}

fn load_config(path: Option<&str>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => EngineConfig::default(),
    };
    Ok(config.with_env()?)
}

fn load_document(path: &str) -> anyhow::Result<Arc<MemoryDocument>> {
    let document = MemoryDocument::load(path)
        .with_context(|| format!("failed to load document from {}", path))?;
    Ok(Arc::new(document))
}

fn print_classes(document: &MemoryDocument) {
    for (label, class) in document.class_snapshot() {
        println!("{}: {}", label, class);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;

    match args.command {
        Commands::Scan { document } => {
            let engine = Engine::new(load_document(&document)?, config)?;
            println!("{}", serde_json::to_string_pretty(engine.registry())?);
        }
        Commands::Apply { document } => {
            let engine = Engine::new(load_document(&document)?, config)?;
            let report = engine.apply_once();
            println!("{}", serde_json::to_string_pretty(&report)?);
            print_classes(engine.document());
        }
        Commands::Watch {
            document,
            interval_ms,
            cycles,
        } => {
            if let Some(interval_ms) = interval_ms {
                config.poll_interval_ms = interval_ms;
            }
            let engine = Engine::new(load_document(&document)?, config)?;
            log::info!(
                "Watching {} every {}ms",
                document,
                engine.config().poll_interval_ms
            );

            let scheduler = Scheduler::new(IntervalTrigger::new(engine.config().poll_interval()));
            let ran = match cycles {
                Some(max) => engine.start_with(scheduler.with_max_cycles(max)).wait().await?,
                None => {
                    let handle = engine.start_with(scheduler);
                    tokio::signal::ctrl_c().await?;
                    handle.stop().await?
                }
            };

            println!("Ran {} cycle(s)", ran);
            print_classes(engine.document());
        }
    }

    Ok(())
}
