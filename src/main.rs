//! Notice Watcher — Binary Entrypoint
//! Polls configured announcement listing pages and pushes one template
//! notification per subscriber for every new entry.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("notice_watcher=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the vars come from the environment.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = notice_watcher::config::load_default()?;
    notice_watcher::app::run(cfg).await
}
