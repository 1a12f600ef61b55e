//! `message-dispatcher` binary: wires configuration, stores, the dispatch loop
//! and the HTTP API, then serves until SIGINT or SIGTERM.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use message_dispatcher::adapters::http::{api_router, MessageHandlers};
use message_dispatcher::adapters::postgres::seed_sample_data;
use message_dispatcher::adapters::webhook::WebhookSetupError;
use message_dispatcher::adapters::{
    PostgresMessageReader, PostgresMessageRepository, RedisMessageCache, WebhookDelivery,
    WebhookDeliveryConfig,
};
use message_dispatcher::application::{
    ListSentMessagesHandler, MessageDispatcher, MessageDispatcherConfig, PaginationLimits,
};
use message_dispatcher::config::{AppConfig, ConfigError, ServerConfig, ValidationError};
use message_dispatcher::domain::message::MessageError;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("redis connection failed: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis connection timed out")]
    RedisTimeout,

    #[error(transparent)]
    Webhook(#[from] WebhookSetupError),

    #[error("seeding sample data failed: {0}")]
    Seed(#[from] MessageError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        webhook = %config.webhook.url,
        "Starting message dispatcher"
    );

    let db = &config.database;
    let pool = PgPoolOptions::new()
        .min_connections(db.min_connections)
        .max_connections(db.max_connections)
        .acquire_timeout(db.acquire_timeout())
        .idle_timeout(db.idle_timeout())
        .max_lifetime(db.max_lifetime())
        .connect(&db.url)
        .await?;

    if db.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let repository = PostgresMessageRepository::new(pool.clone());
    if db.seed_sample_data {
        seed_sample_data(&repository).await?;
    }

    let redis_client = redis::Client::open(config.redis.url.as_str())?;
    let redis_conn = tokio::time::timeout(
        config.redis.timeout(),
        redis_client.get_multiplexed_tokio_connection(),
    )
    .await
    .map_err(|_| StartupError::RedisTimeout)??;
    let cache = Arc::new(RedisMessageCache::new(redis_conn, config.redis.cache_ttl()));

    let delivery = WebhookDelivery::new(WebhookDeliveryConfig::from_config(&config.webhook))?;

    let dispatcher = Arc::new(MessageDispatcher::new(
        Arc::new(repository),
        Arc::new(delivery),
        cache.clone(),
        MessageDispatcherConfig::from_config(&config.dispatcher),
    ));
    if config.dispatcher.autostart {
        dispatcher.start().await;
    }

    let list_handler = Arc::new(ListSentMessagesHandler::new(
        Arc::new(PostgresMessageReader::new(pool.clone())),
        cache,
        PaginationLimits::from_config(&config.pagination),
    ));
    let app = api_router(
        MessageHandlers::new(dispatcher.clone(), list_handler),
        config.server.request_timeout(),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening");

    let shutdown = install_signal_handler();
    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
        .await?;

    dispatcher.stop().await;
    pool.close().await;
    tracing::info!("Message dispatcher shut down");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if server.is_production() {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Returns a token cancelled on SIGINT or SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
                        _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down"),
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for SIGINT");
                    let _ = ctrl_c.await;
                    tracing::info!("Received SIGINT, shutting down");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            tracing::info!("Received Ctrl+C, shutting down");
        }

        trigger.cancel();
    });

    token
}
