use dotenvy::dotenv;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use riskserver::access::roles::seed_roles;
use riskserver::api_router::configure_api_routes;
use riskserver::config::{AppConfig, DEV_JWT_SECRET};
use riskserver::security::jwt::JwtKeys;
use riskserver::shared::state::AppState;
use riskserver::shared::utils::{create_conn, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    if config.auth.jwt_secret == DEV_JWT_SECRET {
        warn!("auth.jwt_secret not set, using the development secret - do not use in production");
    }

    let pool = create_conn(&config.database.url, config.database.pool_size)?;
    run_migrations(&pool).map_err(|e| anyhow::anyhow!("{e}"))?;

    {
        let mut conn = pool.get()?;
        let seeded = seed_roles(&mut conn)?;
        if seeded > 0 {
            info!("Seeded {seeded} catalog roles");
        }
    }

    let jwt = JwtKeys::from_secret(
        &config.auth.jwt_secret,
        &config.auth.jwt_issuer,
        config.auth.token_ttl_minutes,
    );
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState { conn: pool, config, jwt });

    let app = configure_api_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("riskserver listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
