//! livegrep - terminal client for a live code search server
//!
//! Connects to a running search server and provides type-as-you-go search,
//! file context viewing with syntax highlighting, and recursive call
//! hierarchy exploration for C/C++ code.

use clap::Parser;
use std::time::Duration;

use livegrep::client::SearchClient;
use livegrep::tui::{DetailSurface, Engine, EngineConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the search server
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Directory to search, sent with every request
    #[arg(long, default_value = ".")]
    path: String,

    /// Where the file context view renders
    #[arg(long, value_enum, default_value_t = DetailSurface::Panel)]
    detail: DetailSurface,

    /// Quiescence window before a quick search fires, in milliseconds
    #[arg(long, default_value_t = 300)]
    debounce_ms: u64,

    /// Result cap for quick searches (full searches are uncapped)
    #[arg(long, default_value_t = 50)]
    limit: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    log::info!("connecting to {}", cli.server);
    let client = SearchClient::new(&cli.server);
    let config = EngineConfig {
        base_path: cli.path,
        surface: cli.detail,
        debounce: Duration::from_millis(cli.debounce_ms),
        limit: cli.limit,
    };

    let mut engine = Engine::new(client, config)?;
    engine.run().await
}
