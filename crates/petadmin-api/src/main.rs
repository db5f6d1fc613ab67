use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use petadmin_api::Server;
use petadmin_core::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "petadmin_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Arc::new(Settings::load(None, None)?);
    let host: IpAddr = settings
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server.host: {}", settings.server.host))?;
    let addr = SocketAddr::from((host, settings.server.port));

    let server = Server::new(addr, settings).await?;
    server.run().await?;
    Ok(())
}
