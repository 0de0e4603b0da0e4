use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use spark_engine::config::{LoggingSettings, Settings};
use spark_engine::core::DecisionResolver;
use spark_engine::models::seed;
use spark_engine::routes::{self, AppState};
use spark_engine::services::{AppStore, CacheManager, MemoryBackend, PersistenceBackend, PostgresBackend};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// How often expired notifications are swept
const NOTIFICATION_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.json().init(),
    }
}

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        io_error(e)
    })?;

    init_logging(&settings.logging);
    info!("Starting Spark matching engine...");

    // Persistence backend: PostgreSQL when configured, otherwise in-memory
    let backend: Arc<dyn PersistenceBackend> = match &settings.database.url {
        Some(url) => {
            let postgres = PostgresBackend::from_settings(
                url,
                settings.database.max_connections,
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                io_error(e)
            })?;
            Arc::new(postgres)
        }
        None => {
            info!("No database configured, using in-memory backend");
            Arc::new(MemoryBackend::new())
        }
    };

    // Cache: Redis is optional, L1 always present
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);
    let cache = match CacheManager::new(settings.cache.redis_url.as_deref(), l1_cache_size, cache_ttl).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to connect to Redis ({}), continuing with L1 cache only", e);
            CacheManager::in_memory(l1_cache_size, cache_ttl)
        }
    };
    info!(
        "Cache initialized (L1: {} entries, TTL: {}s, redis: {})",
        l1_cache_size,
        cache_ttl,
        cache.has_redis()
    );

    let default_preferences = settings.matching.default_preferences();
    let store = if settings.matching.seed_demo_data {
        for profile in seed::demo_profiles() {
            if let Err(e) = backend.create_profile(profile).await {
                warn!("Failed to seed backend profile: {}", e);
            }
        }
        info!("Seeded demo profiles, matches and messages");
        AppStore::seeded(DecisionResolver::default(), default_preferences)
    } else {
        AppStore::new(DecisionResolver::default(), default_preferences)
    };
    let store = Arc::new(RwLock::new(store));

    // The notification display window is enforced here, not by clients
    let sweeper_store = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(NOTIFICATION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sweeper_store.write().await.purge_notifications(chrono::Utc::now());
            if purged > 0 {
                tracing::debug!("Purged {} expired notifications", purged);
            }
        }
    });

    let app_state = AppState {
        store,
        backend,
        cache: Arc::new(cache),
        discovery_limit: settings.matching.discovery_limit,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
