use anyhow::Result;
use clap::Parser;
use feedgate_common::observability::{LogConfig, init_logging};
use feedgate_config::{FeedgateConfig, FeedgateConfigLoader};
use std::path::PathBuf;

mod server;

/// HTTP gateway exposing social-feed operations over GetStream.
#[derive(Debug, Parser)]
#[command(name = "feedgate", version)]
struct Cli {
    /// Optional YAML/TOML/JSON config file; environment variables win over it.
    #[arg(long, env = "FEEDGATE_CONFIG", default_value = "feedgate.yaml")]
    config: PathBuf,

    /// Override the listen port from config.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins over the file)
    let mut cfg: FeedgateConfig = FeedgateConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()?;
    if let Some(port) = cli.port {
        cfg.port = port;
    }

    let log_path = init_logging(LogConfig::from_env("feedgate"))?;
    tracing::info!(log = %log_path.display(), config = ?cfg, "feedgate.starting");

    let router = server::build_router(&cfg)?;
    server::serve(router, cfg.listen_addr()).await
}
