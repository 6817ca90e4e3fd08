use anyhow::Context;
use clap::Parser;
use deck_of_many_things::adapters::http::{self, RequestLimits};
use deck_of_many_things::utils::{logger, validation::Validate};
use deck_of_many_things::{DeckManager, DeckQuery, LocalStorage, TomlConfig};
use std::path::PathBuf;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "draw-server")]
#[command(about = "Serves random draws from the Deck of Many Things over HTTP")]
struct Args {
    /// Path to TOML configuration file (defaults to ./deck.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides [server].bind
    #[arg(short, long)]
    bind: Option<String>,

    /// Pristine deck, used when there is no saved session
    #[arg(long)]
    default_deck: Option<PathBuf>,

    /// Saved session deck, preferred when present
    #[arg(long)]
    working_deck: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_server_logger(args.verbose, args.json_logs);
    tracing::info!("🚀 Starting draw server");

    let mut config = match &args.config {
        Some(path) => TomlConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path.display()))?,
        None => TomlConfig::discover().context("failed to load deck.toml")?,
    };

    // 套用命令列覆蓋設定
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(path) = args.default_deck {
        config.paths.default_deck = path;
    }
    if let Some(path) = args.working_deck {
        config.paths.working_deck = path;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        return Err(e.into());
    }

    // 伺服器載入自己的副本，不碰執行中 session 的牌堆
    let manager = DeckManager::from_config(LocalStorage::default(), &config);
    let query = DeckQuery::load(&manager);
    tracing::info!("📚 Serving draws from {} cards", query.len());

    let addr = config.bind_address()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🌐 Listening on http://{}/draw-card", listener.local_addr()?);

    let limits = RequestLimits {
        max_head_bytes: config.server.max_request_bytes,
        read_timeout: config.server.read_timeout(),
    };
    http::serve_with_limits(listener, query, limits, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        }
    })
    .await?;

    Ok(())
}
