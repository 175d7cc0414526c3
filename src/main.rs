use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genogate::{
    handlers::{create_router, AppState},
    pipeline::Limits,
    solr::SolrClient,
    Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Create the search backend client
    let backend = Arc::new(SolrClient::new(
        &config.solr_url,
        Duration::from_secs(config.backend_timeout),
    )?);

    let state = AppState {
        backend,
        limits: Limits {
            default_rows: config.default_rows,
            max_rows: config.max_rows,
        },
        api_url: config.effective_api_url(),
        content_url: config.content_url.clone(),
        tree_dir: config.tree_dir.clone(),
    };

    // IP-based rate limiting
    let governor = GovernorConfigBuilder::default()
        .per_second(config.rate_per_second)
        .burst_size(config.rate_burst)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit configuration"))?;

    let app = create_router(state).layer(GovernorLayer {
        config: Arc::new(governor),
    });

    let app = if config.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting genogate server on {}", addr);
    tracing::info!("Search backend: {}", config.solr_url);
    tracing::info!("Tree directory: {:?}", config.tree_dir);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
