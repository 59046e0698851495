use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use std::sync::Arc;
use std::time::Duration;
use swipe_quiz::config::Settings;
use swipe_quiz::core::Quiz;
use swipe_quiz::routes::{self, sessions::AppState};
use swipe_quiz::services::{CatalogClient, SessionStore};
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path errors (malformed session ids)
pub fn handle_path_error(err: error::PathError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Path error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

fn load_quiz(settings: &Settings) -> Result<Quiz, swipe_quiz::core::QuizError> {
    let quiz = match &settings.quiz.definition_path {
        Some(path) => {
            info!("Loading quiz definition from {}", path);
            Quiz::from_file(path)?
        }
        None => Quiz::builtin(),
    };
    Ok(match &settings.quiz.gender_step {
        Some(key) => quiz.with_gender_step(key.clone()),
        None => quiz,
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load();

    // Initialize logging (LOG_LEVEL / LOG_FORMAT override the config file)
    let (level, format) = match &settings {
        Ok(s) => (s.logging.level.clone(), s.logging.format.clone()),
        Err(_) => ("info".to_string(), "json".to_string()),
    };
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting swipe quiz service...");

    let settings = settings.unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    let quiz = load_quiz(&settings).unwrap_or_else(|e| {
        error!("Failed to load quiz: {}", e);
        panic!("Quiz definition error: {}", e);
    });

    info!("Quiz loaded with {} steps (gender step: {})", quiz.len(), quiz.gender_step());

    // Initialize catalog client
    let timeout = settings
        .catalog
        .timeout_secs
        .unwrap_or(CatalogClient::DEFAULT_TIMEOUT_SECS);

    let catalog = CatalogClient::new(settings.catalog.endpoint.clone(), Duration::from_secs(timeout))
        .map_err(|e| {
            error!("Failed to create catalog client: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e)
        })?;

    info!("Catalog client initialized ({}, timeout {}s)", settings.catalog.endpoint, timeout);

    let sessions = Arc::new(SessionStore::new(
        Arc::new(catalog),
        Arc::new(quiz),
        settings.sessions.max_sessions,
        settings.sessions.idle_ttl_secs,
    ));

    info!(
        "Session store initialized (max: {}, idle TTL: {}s)",
        settings.sessions.max_sessions, settings.sessions.idle_ttl_secs
    );

    let app_state = AppState { sessions };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
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
