use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod composer;
pub mod config;
pub mod document;
pub mod pricing;
pub mod proposal;
pub mod state;
pub mod storage;

pub use crate::state::AppState;

use crate::config::AppConfig;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn with_details(mut self, details: impl std::fmt::Display) -> Self {
        self.details = Some(details.to_string());
        self
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::proposal::handlers::health,
        crate::proposal::handlers::generate_proposal,
        crate::proposal::handlers::generate_composed_proposal,
        crate::proposal::handlers::download_proposal,
        crate::proposal::handlers::get_proposal,
    ),
    components(
        schemas(
            proposal::models::GenerateProposalRequest,
            proposal::models::ProposalResponse,
            proposal::models::ComposedProposalResponse,
            proposal::models::ProposalRecord,
            proposal::models::ProposalKind,
            proposal::models::ESignature,
            proposal::models::HealthResponse,
            composer::ProposalFields,
            composer::TextSource,
            pricing::LineItem,
            storage::StorageLocation,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Proposal Service", description = "Proposal and quotation generation endpoints.")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    )
)]
pub struct ApiDoc;

fn cors_for(config: &AppConfig) -> Cors {
    if config.is_development() {
        return Cors::permissive();
    }

    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .max_age(3600);

    if config.allowed_origins.is_empty() {
        cors.allow_any_origin()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    let app_state = web::Data::new(
        AppState::from_config(&config).context("failed to initialise application state")?,
    );

    let prometheus = PrometheusMetricsBuilder::new("auto_proposal_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {}", e))?;

    log::info!(
        "Starting server at http://{}:{} (env={}, object storage={}, text generation={})",
        config.host,
        config.port,
        config.app_env,
        app_state.storage.has_remote(),
        app_state.text_generator.is_some()
    );

    let bind = (config.host.clone(), config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors_for(&config))
            .app_data(app_state.clone())
            .configure(proposal::handlers::config)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind)
    .context("failed to bind HTTP listener")?
    .run()
    .await
    .context("HTTP server error")
}
