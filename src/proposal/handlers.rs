use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{error, web, HttpRequest, HttpResponse, Responder};
use log::{debug, error, info, warn};
use sanitize_filename::sanitize;
use uuid::Uuid;

use super::models::{
    ComposedProposalResponse, GenerateProposalRequest, HealthResponse, ProposalRecord,
    ProposalResponse,
};
use super::service::{self, ProposalError};
use crate::composer::ProposalFields;
use crate::document::secure_filename;
use crate::state::AppState;
use crate::ErrorResponse;

pub const SERVICE_NAME: &str = "Auto Proposal & Quotation Generator";

fn error_response(err: ProposalError) -> HttpResponse {
    match err {
        ProposalError::InvalidInput(errors) => {
            warn!("Rejected proposal request: {}", errors);
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&errors.to_string()))
        }
        ProposalError::DocumentBuild(e) => {
            error!("PDF build failed: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("PDF build failed").with_details(&e))
        }
        ProposalError::Storage(e) => {
            error!("Failed to store PDF: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to store PDF").with_details(&e))
        }
    }
}

#[utoipa::path(
    tag = "Proposal Service",
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: SERVICE_NAME.to_string(),
        time: chrono::Utc::now().to_rfc3339(),
    })
}

#[utoipa::path(
    tag = "Proposal Service",
    post,
    path = "/generate",
    request_body = GenerateProposalRequest,
    responses(
        (status = 201, description = "Proposal generated", body = ProposalResponse),
        (status = 400, description = "Missing client_name or project_type", body = ErrorResponse),
        (status = 500, description = "PDF build or storage failed", body = ErrorResponse)
    )
)]
pub async fn generate_proposal(
    data: web::Data<AppState>,
    req: web::Json<GenerateProposalRequest>,
) -> impl Responder {
    info!("Executing generate_proposal handler");
    match service::generate_proposal(&data, req.into_inner()).await {
        Ok(response) => {
            info!("Proposal {} generated", response.id);
            HttpResponse::Created().json(response)
        }
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    tag = "Proposal Service",
    post,
    path = "/generate/composed",
    request_body = ProposalFields,
    responses(
        (status = 201, description = "Composed proposal generated", body = ComposedProposalResponse),
        (status = 500, description = "PDF build or storage failed", body = ErrorResponse)
    )
)]
pub async fn generate_composed_proposal(
    data: web::Data<AppState>,
    req: web::Json<ProposalFields>,
) -> impl Responder {
    info!("Executing generate_composed_proposal handler");
    match service::generate_composed_proposal(&data, req.into_inner()).await {
        Ok(response) => {
            info!(
                "Composed proposal {} generated ({:?} text)",
                response.id, response.text_source
            );
            HttpResponse::Created().json(response)
        }
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    tag = "Proposal Service",
    get,
    path = "/download/{filename}",
    params(
        ("filename" = String, Path, description = "Stored PDF filename")
    ),
    responses(
        (status = 200, description = "PDF attachment", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn download_proposal(
    req: HttpRequest,
    filename: web::Path<String>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let filename = secure_filename(&sanitize(filename.into_inner()));
    let path = data.storage.local().path_for(&filename);
    debug!("Serving {}", path.display());

    if filename.is_empty() || !path.is_file() {
        return HttpResponse::NotFound().json(ErrorResponse::not_found("File not found"));
    }

    match NamedFile::open_async(&path).await {
        Ok(file) => file
            .set_content_disposition(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(filename)],
            })
            .into_response(&req),
        Err(e) => {
            error!("Failed to open {}: {}", path.display(), e);
            HttpResponse::NotFound().json(ErrorResponse::not_found("File not found"))
        }
    }
}

#[utoipa::path(
    tag = "Proposal Service",
    get,
    path = "/api/proposals/{id}",
    params(
        ("id" = Uuid, Path, description = "Proposal id")
    ),
    responses(
        (status = 200, description = "Proposal record", body = ProposalRecord),
        (status = 404, description = "Proposal not found", body = ErrorResponse),
        (status = 500, description = "Repository error", body = ErrorResponse)
    )
)]
pub async fn get_proposal(id: web::Path<Uuid>, data: web::Data<AppState>) -> impl Responder {
    let id = id.into_inner();
    match data.proposals.find(&id).await {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Proposal not found")),
        Err(e) => {
            error!("Failed to load proposal {}: {}", id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load proposal"))
        }
    }
}

/// JSON extractor config: malformed or missing bodies get an `ErrorResponse`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("JSON body required").with_details(&err));
        error::InternalError::from_response(err, response).into()
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/generate").route(web::post().to(generate_proposal)))
        .service(
            web::resource("/generate/composed").route(web::post().to(generate_composed_proposal)),
        )
        .service(web::resource("/download/{filename}").route(web::get().to(download_proposal)))
        .service(
            web::scope("/api")
                .service(web::resource("/proposals/{id}").route(web::get().to(get_proposal))),
        );
}
