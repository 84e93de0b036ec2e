use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use campus_match::config::{ProviderKind, Settings};
use campus_match::core::{validate_catalog, BadgeSessions};
use campus_match::models::ErrorResponse;
use campus_match::routes::{self, AppState};
use campus_match::services::{
    CacheManager, DataProvider, InMemoryProvider, PostgresProvider, RestProvider, RestTables, SessionVerifier,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error for malformed request payloads
#[derive(Debug)]
pub struct JsonError(ErrorResponse);

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.0.error, self.0.message)
    }
}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

/// Handle JSON payload errors
fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError(ErrorResponse {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    })
    .into()
}

/// Handle query payload errors
fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError(ErrorResponse {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    })
    .into()
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

async fn build_provider(settings: &Settings) -> std::io::Result<Arc<dyn DataProvider>> {
    match settings.provider.kind {
        ProviderKind::Postgres => {
            let db = settings
                .database
                .as_ref()
                .ok_or_else(|| config_error("database settings are required for the postgres provider"))?;

            let provider = PostgresProvider::from_settings(
                &db.url,
                db.max_connections,
                db.min_connections,
                db.acquire_timeout_secs,
                db.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;

            info!("PostgreSQL provider initialized (max: {} connections)", db.max_connections.unwrap_or(10));
            Ok(Arc::new(provider))
        }
        ProviderKind::Rest => {
            let rest = settings
                .rest
                .as_ref()
                .ok_or_else(|| config_error("rest settings are required for the rest provider"))?;

            let tables = RestTables {
                profiles: rest.profiles_table.clone(),
                swipes: rest.swipes_table.clone(),
                matches: rest.matches_table.clone(),
            };
            let provider = RestProvider::new(
                rest.url.clone(),
                rest.api_key.clone(),
                tables,
                Duration::from_secs(rest.timeout_secs.unwrap_or(30)),
            )
            .map_err(|e| config_error(&e.to_string()))?;

            info!("REST provider initialized for {}", rest.url);
            Ok(Arc::new(provider))
        }
        ProviderKind::Memory => {
            warn!("Using the in-memory provider; data is lost on restart");
            Ok(Arc::new(InMemoryProvider::new()))
        }
    }
}

async fn build_cache(settings: &Settings) -> Arc<CacheManager> {
    let cache = &settings.cache;
    if let Some(url) = &cache.redis_url {
        match CacheManager::new(url, cache.l1_cache_size, cache.ttl_secs).await {
            Ok(manager) => {
                info!("Cache manager initialized (L1: {} entries, TTL: {}s, Redis L2)", cache.l1_cache_size, cache.ttl_secs);
                return Arc::new(manager);
            }
            Err(e) => {
                error!("Failed to connect to Redis ({}), continuing with L1 only", e);
            }
        }
    }

    let manager = CacheManager::local(cache.l1_cache_size, cache.ttl_secs);
    info!("Cache manager initialized (L1 only: {} entries, TTL: {}s)", cache.l1_cache_size, cache.ttl_secs);
    Arc::new(manager)
}

fn config_error(message: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, message.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        config_error(&e.to_string())
    })?;

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());
    init_logging(&log_level, &log_format);

    info!("Starting Campus Match service...");

    let catalog = settings.badges.catalog();
    validate_catalog(&catalog).map_err(|e| {
        error!("Invalid badge catalog: {}", e);
        config_error(&e.to_string())
    })?;

    let provider = build_provider(&settings).await?;
    let cache = build_cache(&settings).await;

    let sessions = SessionVerifier::new(&settings.auth.jwt_secret, settings.auth.audience.as_deref());
    let badges = BadgeSessions::new(
        catalog,
        settings.badges.max_sessions,
        Duration::from_secs(settings.badges.session_ttl_secs),
    );

    let app_state = AppState::new(provider, sessions, cache, settings.feed.page_size, badges);

    info!("Feed page size: {}", app_state.feed.page_size());

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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
