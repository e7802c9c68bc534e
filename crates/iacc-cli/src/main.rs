use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use iacc_api::FinanceClient;
use iacc_cache::CacheManager;
use iacc_core::{
    compose, AppServices, Config, FriendsCache, ItemOrigin, RetryPolicy, ScreenConfig, ScreenKind,
    SqliteFriendsCache, StaticSession,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "iacc")]
#[command(version, about = "Friends, cards and transfers from your iACC account", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to <config_dir>/iacc/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true, env = "IACC_API_URL")]
    api_url: Option<String>,

    /// Treat the user as premium (enables the offline friends list)
    #[arg(long, global = true)]
    premium: bool,

    /// Override the screen's retry budget
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// Open row N (0-based) after loading
    #[arg(long, global = true)]
    select: Option<usize>,
}

#[derive(clap::Subcommand, Clone, Copy)]
enum Commands {
    /// List friends
    Friends,
    /// List payment cards
    Cards,
    /// List transfers you sent
    Sent,
    /// List transfers you received
    Received,
}

impl Commands {
    fn kind(self) -> ScreenKind {
        match self {
            Commands::Friends => ScreenKind::Friends,
            Commands::Cards => ScreenKind::Cards,
            Commands::Sent => ScreenKind::SentTransfers,
            Commands::Received => ScreenKind::ReceivedTransfers,
        }
    }
}

/// Detail view stand-in: dump the record
fn show_details<T: Serialize + 'static>(label: &'static str) -> Arc<dyn Fn(&T) + Send + Sync> {
    Arc::new(move |record: &T| match serde_json::to_string_pretty(record) {
        Ok(json) => println!("\n{}:\n{}", label, json),
        Err(e) => tracing::warn!("Could not render {}: {}", label, e),
    })
}

fn screen_config(kind: ScreenKind) -> ScreenConfig {
    match kind {
        ScreenKind::Friends => ScreenConfig::friends(show_details("Friend")),
        ScreenKind::Cards => ScreenConfig::cards(show_details("Card")),
        ScreenKind::SentTransfers => ScreenConfig::sent_transfers(show_details("Transfer")),
        ScreenKind::ReceivedTransfers => ScreenConfig::received_transfers(show_details("Transfer")),
    }
}

fn open_friends_cache(config: &Config) -> Option<Arc<dyn FriendsCache>> {
    if !config.cache.enabled {
        return None;
    }

    let opened = config.cache_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(CacheManager::open(&path.to_string_lossy())?)
    });

    match opened {
        Ok(store) => {
            let cache: Arc<dyn FriendsCache> = Arc::new(SqliteFriendsCache::new(Arc::new(store)));
            Some(cache)
        }
        Err(e) => {
            tracing::warn!("Offline cache unavailable: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iacc_core=info,iacc_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load config")?;

    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    if cli.premium {
        config.user.premium = true;
    }

    let client = Arc::new(
        FinanceClient::with_timeout(
            config.api.base_url.clone(),
            config.api.token.clone(),
            Duration::from_secs(config.api.timeout_secs),
        )
        .context("Failed to create API client")?,
    );

    let services = AppServices {
        friends: client.clone(),
        cards: client.clone(),
        transfers: client,
        session: Arc::new(StaticSession {
            premium: config.user.premium,
        }),
        friends_cache: open_friends_cache(&config),
    };

    let kind = cli.command.kind();
    let retry = match cli.retries {
        Some(n) => RetryPolicy::up_to(n),
        None => config.screens.retry_for(kind),
    };
    tracing::info!("Opening {} (retry: {:?})", kind.title(), retry);

    let screen = compose(screen_config(kind).with_retry(retry), &services);
    screen.appear().await;

    println!("{}  [{}]", screen.title(), kind.action_label());
    if screen.origin() == Some(ItemOrigin::Cache) {
        println!("(offline copy)");
    }

    if let Some(error) = screen.last_error() {
        println!("Error: {}", error);
        return Ok(());
    }

    let rows = screen.rows();
    if rows.is_empty() {
        println!("Nothing here yet.");
    }
    for row in &rows {
        println!("{}\n    {}", row.title, row.subtitle);
    }

    if let Some(index) = cli.select {
        if !screen.select(index) {
            anyhow::bail!("No row {} (have {})", index, rows.len());
        }
    }

    Ok(())
}
