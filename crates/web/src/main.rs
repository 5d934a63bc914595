use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use storage::{
    Database, MemoryStore, PgStore, Store,
    services::mail::{self, EmailQueue, LogMailer},
};
use volunteer_api::{
    AppState, build_router, config::Config, features::auth::services::ensure_admin,
    token::TokenSigner, workers,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting volunteer platform API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            tracing::info!(
                "Connecting to database at: {}",
                url.split('@').next_back().unwrap_or("unknown")
            );
            let db = Database::new(url)
                .await
                .context("Failed to initialize database")?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations");
            db.run_migrations()
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Database migrations completed successfully");

            Arc::new(PgStore::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };
    tracing::info!(backend = store.backend_tag(), "Store ready");

    match &config.admin {
        Some(seed) => {
            ensure_admin(store.as_ref(), seed, Utc::now())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create administrator: {e}"))?;
        }
        None => tracing::warn!(
            "ADMIN_EMAIL/ADMIN_PASSWORD not set; staff routes need an existing administrator"
        ),
    }

    let (mail_queue, mail_rx) = EmailQueue::channel(config.email_queue_capacity);
    tokio::spawn(mail::run_worker(mail_rx, Arc::new(LogMailer)));

    let tokens = TokenSigner::new(
        config.token_secret.as_bytes(),
        Duration::hours(config.token_ttl_hours),
    )
    .context("Failed to initialize token signer")?;

    tokio::spawn(workers::reminder_loop(
        store.clone(),
        mail_queue.clone(),
        config.reminder_hour_utc,
    ));

    let state = AppState::new(store, mail_queue, tokens);
    let app = build_router(state, config.cors_allow_any_origin);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
