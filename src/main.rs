//! FGS Store HTTP service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use fgs_store::chat::ChatClient;
use fgs_store::config::AppConfig;
use fgs_store::db::{create_pool, sessions::SessionRepository};
use fgs_store::publisher::EventPublisher;
use fgs_store::{app, AppState};
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let db = create_pool(&config.database_url).await.context("failed to connect to database")?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, domain events disabled");
                None
            }
        },
        None => None,
    };
    if config.chat.api_key.is_none() {
        tracing::warn!("AI_GATEWAY_API_KEY not set, chat assistant will answer 500");
    }

    spawn_session_purge(db.clone());

    let addr = config.socket_addr();
    let state = AppState {
        db,
        chat: ChatClient::new(config.chat.clone())?,
        events: EventPublisher::new(nats),
        config: Arc::new(config),
    };

    tracing::info!(events = state.events.is_enabled(), "FGS Store listening on {addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app(state)).await?;
    Ok(())
}

fn spawn_session_purge(db: PgPool) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match SessionRepository::new(&db).purge_expired().await {
                Ok(0) => {}
                Ok(purged) => tracing::info!(purged, "Expired sessions removed"),
                Err(e) => tracing::warn!(error = %e, "Session purge failed"),
            }
        }
    });
}
