//! FarmHub alerting engine - server binary

use std::{net::SocketAddr, sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use farmhub_backend::config::{LogFormat, StorageBackend};
use farmhub_backend::external::{sms, MarketDataset, RandomWeatherSource, StaticMarketSource};
use farmhub_backend::services::{spawn_scheduler, Stores, TipSchedule};
use farmhub_backend::store::{
    MemoryAlertSessions, MemoryNotificationLog, MemorySubjectStore, PgAlertSessions,
    PgNotificationLog, PgSubjectStore,
};
use farmhub_backend::{create_app, AppState, Config};

const DEFAULT_LOG_FILTER: &str =
    "farmhub_server=debug,farmhub_backend=debug,tower_http=debug,sqlx=warn";

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

async fn build_stores(config: &Config) -> anyhow::Result<Stores> {
    match config.storage.backend {
        StorageBackend::Memory => {
            let subjects = match &config.storage.seed_path {
                Some(path) => MemorySubjectStore::from_file(path)?,
                None => MemorySubjectStore::default(),
            };
            tracing::info!("Using in-memory storage");

            Ok(Stores {
                subjects: Arc::new(subjects),
                notifications: Arc::new(MemoryNotificationLog::new()),
                sessions: Arc::new(MemoryAlertSessions::new()),
            })
        }
        StorageBackend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("database.url is required for postgres storage"))?;

            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(url)
                .await?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&db_pool).await?;
            tracing::info!("Migrations completed");

            Ok(Stores {
                subjects: Arc::new(PgSubjectStore::new(db_pool.clone())),
                notifications: Arc::new(PgNotificationLog::new(db_pool.clone())),
                sessions: Arc::new(PgAlertSessions::new(db_pool)),
            })
        }
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    init_tracing(config.log.format);

    tracing::info!("Starting FarmHub Alerting Engine");
    tracing::info!("Environment: {}", config.environment);

    let stores = build_stores(&config).await?;

    let dataset = match &config.sources.market_dataset_path {
        Some(path) => MarketDataset::from_file(path)?,
        None => MarketDataset::builtin(),
    };
    let weather = Arc::new(RandomWeatherSource::new(config.sources.weather_seed));
    let market = Arc::new(StaticMarketSource::new(dataset));
    let channel = sms::from_config(&config.sms, config.sources.timeout());

    let shutdown = CancellationToken::new();
    let state = AppState::new(
        config.clone(),
        stores,
        weather,
        market,
        channel,
        shutdown.clone(),
    );

    // Daily tips
    let scheduler = if config.tip_job.enabled {
        let schedule = TipSchedule::from_config(&config.tip_job)?;
        Some(spawn_scheduler(
            state.tip_job.as_ref().clone(),
            schedule,
            shutdown.clone(),
        ))
    } else {
        tracing::info!("Daily tip job disabled");
        None
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Some(handle) = scheduler {
        handle.await?;
    }

    Ok(())
}
