//! Employee Registration mirror server
//!
//! Serves the owners JSON document that wizard sessions mirror to.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use employee_registration::config::Config;
use employee_registration::{api, create_router, MirrorState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Employee Registration mirror server");
    tracing::info!("Mirror file: {:?}", config.mirror_file);
    tracing::info!("Bind address: {}", config.bind_addr);

    let app = create_router(MirrorState::new(config.mirror_file.clone()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        "Server listening on http://{}{}",
        config.bind_addr,
        api::MIRROR_PATH
    );

    axum::serve(listener, app).await?;

    Ok(())
}
