//! Gobang server binary.

use std::sync::Arc;

use gobang::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), GobangError> {
    init_tracing();

    let config = AppConfig::load();
    let store = Arc::new(MemoryUserStore::new());
    let server = GobangServerBuilder::new().config(config).build(store).await?;

    tracing::info!(
        http_addr = %server.http_local_addr()?,
        ws_addr = %server.ws_local_addr()?,
        "listeners bound"
    );
    server.run().await
}

/// Reads `RUST_LOG`, defaulting to `info`.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
