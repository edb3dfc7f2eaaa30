use clap::{Parser, Subcommand};
use feed_update::config::{Paths, SummarizerConfig};
use feed_update::sources::default_providers;
use feed_update::summarize::{summarizer_from_config, Summarizer};
use feed_update::updater::{delete_item, feed_titles};
use feed_update::{FeedUpdater, FetchConfig, Fetcher};
use std::io::Read;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_PATTERN: &str = "Text:\n\n%s";

#[derive(Parser)]
#[command(name = "feed-update", version, about = "Builds the Wapuugotchi RSS feed from upstream WordPress sources")]
struct Cli {
    /// Directory holding site.json, entries.json and articles/
    #[arg(long, env = "FEED_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Rendered feed file
    #[arg(long, env = "FEED_OUTPUT", default_value = "feed.xml", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll every source once and rebuild the feed (default)
    Update,
    /// List the items of the rendered feed
    Info,
    /// Delete the N-th feed item (1-based) from the entry store
    Delete { number: usize },
    /// Summarize text with the configured model
    Ai {
        /// Text to summarize; read from stdin when absent
        #[arg(long)]
        text: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = Paths::new(&cli.data_dir, &cli.output);

    match cli.command.unwrap_or(Command::Update) {
        Command::Update => {
            let summarizer = summarizer_from_config(&SummarizerConfig::from_env())?;
            let fetcher = Fetcher::new(FetchConfig::default())?;
            let updater = FeedUpdater::new(paths, default_providers(summarizer), Box::new(fetcher));

            let summary = updater.run().await?;
            if summary.changed {
                println!("update detected");
            } else {
                println!("no update detected");
            }
        }
        Command::Info => {
            println!("Wapuugotchi Feed Generator");
            let titles = feed_titles(&paths.feed)?;
            for (i, title) in titles.iter().enumerate() {
                println!("{}) Title: {}", i + 1, title);
            }
            println!("Total items: {}", titles.len());
        }
        Command::Delete { number } => {
            let removed = delete_item(&paths, number)?;
            println!("Item '{}' deleted successfully", removed.title);
        }
        Command::Ai { text } => {
            let input = match text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
                Some(input) => input,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf.trim().to_string()
                }
            };
            if input.is_empty() {
                eprintln!("missing --text or stdin input");
                std::process::exit(2);
            }

            let summarizer = summarizer_from_config(&SummarizerConfig::from_env())?;
            info!("Summarizing {} bytes with {}", input.len(), summarizer.summarizer_name());
            println!("{}", summarizer.summarize(DEFAULT_PATTERN, &input).await?);
        }
    }

    Ok(())
}
