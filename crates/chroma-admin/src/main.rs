mod browse;
mod client;
mod render;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use chroma_core::normalize::{TimeFormat, parse_offset};
use chroma_core::pagination::{DEFAULT_PAGE_SIZE, PaginatedFetcher, load_page};
use chroma_core::source::RecordSource;
use chroma_core::stats::load_dashboard_stats;
use chroma_core::timeline::{DEFAULT_SOURCE_LIMIT, TimelineAggregator, TimelineView};
use chroma_core::view::FetchOutcome;
use chroma_types::models::Collection;

use crate::client::AdminClient;

#[derive(Parser, Debug)]
#[command(name = "chroma-admin")]
#[command(about = "Back-office client for the chroma color service")]
struct Cli {
    /// Server (or PostgREST) base URL
    #[arg(long, env = "CHROMA_URL", default_value = "http://localhost:3000")]
    url: String,

    /// Anon key sent as `apikey` to hosted PostgREST
    #[arg(long, env = "CHROMA_API_KEY")]
    api_key: Option<String>,

    /// Session token printed by `login`
    #[arg(long, env = "CHROMA_TOKEN")]
    token: Option<String>,

    /// UTC offset used for display times
    #[arg(long, env = "CHROMA_DISPLAY_OFFSET", default_value = "+07:00")]
    offset: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open an admin session and print its token
    Login {
        #[arg(long, env = "CHROMA_ADMIN_EMAIL", default_value = "admin@chroma.local")]
        email: String,
        #[arg(long, env = "CHROMA_ADMIN_PASSWORD")]
        password: String,
    },
    /// Close the session given by --token
    Logout,
    /// Merged timeline of recent scans and saved palettes
    Activity {
        #[arg(long, default_value_t = DEFAULT_SOURCE_LIMIT)]
        limit: usize,
    },
    /// One page of scan history (zero-based)
    History {
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Page through a collection interactively
    Browse {
        #[arg(long, default_value = "scans")]
        collection: Collection,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Dashboard totals and recent scans
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chroma_admin=info,chroma_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = AdminClient::new(&cli.url, cli.api_key.clone(), cli.token.clone());
    let source: Arc<dyn RecordSource> = Arc::new(client.record_source());

    match cli.command {
        Commands::Login { email, password } => {
            let session = client.login(&email, &password).await?;
            println!("Logged in as {} until {}", session.email, session.expires_at);
            println!("export CHROMA_TOKEN={}", session.token);
        }
        Commands::Logout => {
            client.logout().await?;
            println!("Logged out.");
        }
        Commands::Activity { limit } => {
            let offset = parse_offset(&cli.offset)
                .with_context(|| format!("'{}' is not a UTC offset", cli.offset))?;
            let aggregator =
                TimelineAggregator::new(source, TimeFormat::new(offset)).with_limits(limit, limit);
            let view = TimelineView::new(aggregator);
            if let FetchOutcome::Applied(entries) = view.refresh().await? {
                print!("{}", render::timeline(&entries));
            }
        }
        Commands::History { page, page_size } => {
            let page = load_page(source.as_ref(), Collection::Scans, page, page_size).await?;
            print!("{}", render::page(&page));
        }
        Commands::Browse {
            collection,
            page_size,
        } => {
            browse::run(PaginatedFetcher::new(source, collection, page_size)).await?;
        }
        Commands::Stats => {
            let stats = load_dashboard_stats(source.as_ref()).await?;
            print!("{}", render::stats(&stats));
        }
    }

    Ok(())
}
