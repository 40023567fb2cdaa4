use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use flight_options::config::{LoggingSettings, Settings, StoreBackend};
use flight_options::routes::{self, AppState};
use flight_options::services::{
    AppwriteCollections, AppwriteStore, CacheManager, ContentStore, InMemoryStore, PostgresStore,
};
use flight_options::FlightOptionsService;
use std::io;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(message: String) -> io::Error {
    error!("{}", message);
    io::Error::new(io::ErrorKind::Other, message)
}

async fn build_store(settings: &Settings) -> io::Result<Arc<dyn ContentStore>> {
    match settings.store.backend {
        StoreBackend::Memory => {
            let store = InMemoryStore::from_path(&settings.store.fixture_path)
                .map_err(|e| startup_error(format!("Failed to load content snapshot: {}", e)))?;
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let database = settings
                .database
                .as_ref()
                .ok_or_else(|| startup_error("store.backend = postgres requires [database]".to_string()))?;

            let store = PostgresStore::from_settings(
                &database.url,
                database.max_connections,
                database.min_connections,
                database.acquire_timeout_secs,
                database.idle_timeout_secs,
            )
            .await
            .map_err(|e| startup_error(format!("Failed to connect to PostgreSQL: {}", e)))?;

            info!(
                "PostgreSQL content store initialized (max: {} connections)",
                database.max_connections.unwrap_or(10)
            );
            Ok(Arc::new(store))
        }
        StoreBackend::Appwrite => {
            let appwrite = settings
                .appwrite
                .as_ref()
                .ok_or_else(|| startup_error("store.backend = appwrite requires [appwrite]".to_string()))?;

            let collections = AppwriteCollections {
                flight_options: appwrite.collections.flight_options.clone(),
                airports: appwrite.collections.airports.clone(),
                benefits: appwrite.collections.benefits.clone(),
                currencies: appwrite.collections.currencies.clone(),
            };

            let store = AppwriteStore::new(
                appwrite.endpoint.clone(),
                appwrite.api_key.clone(),
                appwrite.project_id.clone(),
                appwrite.database_id.clone(),
                appwrite.bucket_id.clone(),
                collections,
            )
            .map_err(|e| startup_error(format!("Failed to create Appwrite client: {}", e)))?;

            info!("Appwrite content store initialized");
            Ok(Arc::new(store))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();
    init_tracing(
        &settings
            .as_ref()
            .map(|s| s.logging.clone())
            .unwrap_or_default(),
    );

    info!("Starting flight options service...");

    let settings = settings.map_err(|e| startup_error(format!("Configuration error: {}", e)))?;

    info!("Configuration loaded successfully");

    let store = build_store(&settings).await?;
    let mut service = FlightOptionsService::new(store);

    if settings.cache.enabled {
        let l1_size = settings.cache.l1_cache_size.unwrap_or(1000);
        let ttl = u64::from(settings.cache.max_age_secs);

        match CacheManager::new(settings.cache.redis_url.as_deref(), l1_size, ttl).await {
            Ok(cache) => {
                info!(
                    "Response cache enabled (L1: {} entries, Redis: {}, TTL: {}s)",
                    l1_size,
                    cache.has_redis(),
                    ttl
                );
                service = service.with_cache(Arc::new(cache));
            }
            Err(e) => {
                // The lookup works without it; only the server-side cache is lost
                error!("Failed to initialize response cache ({}), running without it", e);
            }
        }
    }

    let app_state = AppState {
        service,
        max_age_secs: settings.cache.max_age_secs,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
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
