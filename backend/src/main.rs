mod activity;
mod auth;
mod comment_cache;
mod comment_gateway;
mod config;
mod drive_client;
mod handlers;
mod products;
mod request_context;
mod routes;
mod sheet_rows;
mod state;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("review_flow_backend=info,tower_http=info")),
        )
        .init();

    let config = config::AppConfig::from_env()?;

    tracing::info!("Starting review-flow backend server");
    tracing::info!(
        auth_enabled = config.auth_enabled(),
        sheet_configured = config.sheet.sheet_id.is_some(),
        comments_webhook_configured = config.comments_webhook_url.is_some(),
        "configuration resolved"
    );

    let app_state = state::AppState::new(config.clone())?;
    let app = routes::create_router(app_state);

    let addr = format!("{}:{}", config.bind_addr, config.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
