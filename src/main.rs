use std::sync::Arc;

use brandboard_api::config::AppConfig;
use brandboard_api::context::AppContext;
use brandboard_api::handlers;
use brandboard_api::identity::http::HttpIdentityProvider;
use brandboard_api::push::http::HttpPushGateway;
use brandboard_api::store::postgres;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brandboard_api=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("starting Brandboard API in {:?} mode", config.environment);

    let (profiles, catalog) = postgres::connect(&config.database).await?;
    let identity = HttpIdentityProvider::new(&config.identity);
    let push = HttpPushGateway::new(&config.push);

    let ctx = AppContext::new(
        Arc::new(profiles),
        Arc::new(identity),
        Arc::new(push),
        Arc::new(catalog),
    );

    let app = handlers::app(ctx, config.security.jwt_secret.clone());

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Brandboard API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
