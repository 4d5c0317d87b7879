mod common;

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use auto_proposal_server::pricing;
use auto_proposal_server::proposal::handlers;
use auto_proposal_server::proposal::repository::{InMemoryProposalRepository, ProposalRepository};
use serde_json::{json, Value};
use tempfile::TempDir;

use common::{FixedTextGenerator, MockObjectStorage};

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(handlers::config),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(common::test_app_state(&dir));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["service"], json!(handlers::SERVICE_NAME));
    assert!(body["time"].as_str().is_some());
}

#[actix_web::test]
async fn test_generate_proposal_stores_locally() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(common::test_app_state(&dir));

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(json!({
            "client_name": "  Acme Corp ",
            "project_type": "Website redesign",
            "company_name": "Northwind Studio"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"].as_f64(), Some(4095.0));
    assert_eq!(body["storage"], json!("local"));
    assert_eq!(
        body["pricing_table"].as_array().map(Vec::len),
        Some(pricing::price("Website redesign").items.len())
    );
    assert_eq!(body["pricing_table"][0]["name"], json!("Discovery & Planning"));
    assert_eq!(body["e_signature"]["enabled"], json!(false));
    assert!(body["e_signature"]["endpoint"].is_null());

    let cover_letter = body["cover_letter"].as_str().unwrap();
    assert!(cover_letter.contains("Acme Corp"));
    assert!(cover_letter.contains("Northwind Studio"));

    let filename = body["proposal_pdf_filename"].as_str().unwrap();
    assert!(filename.starts_with("proposal_Acme_Corp_Website_redesign_"));
    assert!(filename.ends_with(".pdf"));
    assert_eq!(
        body["proposal_pdf_download_url"].as_str().unwrap(),
        format!("{}/download/{}", common::BASE_URL, filename)
    );
    assert!(dir.path().join(filename).is_file());
}

#[actix_web::test]
async fn test_generate_uses_default_company_name() {
    let dir = TempDir::new().unwrap();
    let state = common::test_app_state(&dir).with_default_company_name("Default Co");
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(json!({"client_name": "Acme", "project_type": "SEO audit"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["cover_letter"].as_str().unwrap().contains("Default Co"));
    assert_eq!(body["total"].as_f64(), Some(1785.0));
}

#[actix_web::test]
async fn test_generate_rejects_blank_client_name() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(common::test_app_state(&dir));

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(json!({"client_name": "   ", "project_type": "Website"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], json!("BadRequest"));
    assert!(body["message"].as_str().unwrap().contains("client_name"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[actix_web::test]
async fn test_generate_rejects_blank_project_type_without_storing() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MockObjectStorage::new());
    let app = init_app!(common::test_app_state_with_remote(&dir, remote.clone()));

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(json!({"client_name": "Acme", "project_type": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("project_type"));
    assert_eq!(remote.file_count().await, 0);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[actix_web::test]
async fn test_generate_rejects_missing_body() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(common::test_app_state(&dir));

    let req = test::TestRequest::post().uri("/generate").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], json!("JSON body required"));
}

#[actix_web::test]
async fn test_download_serves_generated_pdf() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(common::test_app_state(&dir));

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(json!({"client_name": "Acme", "project_type": "Mobile app"}))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let filename = body["proposal_pdf_filename"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/download/{}", filename))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(&filename));

    let bytes = test::read_body(resp).await;
    assert!(bytes.starts_with(b"%PDF"));
    let pdf = lopdf::Document::load_mem(&bytes).unwrap();
    assert!(pdf.get_pages().len() >= 3);
}

#[actix_web::test]
async fn test_download_unknown_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(common::test_app_state(&dir));

    let req = test::TestRequest::get()
        .uri("/download/missing.pdf")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], json!("NotFound"));
}

#[actix_web::test]
async fn test_get_proposal_record() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(common::test_app_state(&dir));

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(json!({"client_name": "Acme", "project_type": "Branding"}))
        .to_request();
    let created: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let id = created["id"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/proposals/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let record: Value = test::read_body_json(resp).await;
    assert_eq!(record["id"], created["id"]);
    assert_eq!(record["kind"], json!("priced"));
    assert_eq!(record["client_name"], json!("Acme"));
    assert_eq!(record["filename"], created["proposal_pdf_filename"]);
    assert_eq!(record["total"], created["total"]);
}

#[actix_web::test]
async fn test_generate_records_into_injected_repository() {
    let dir = TempDir::new().unwrap();
    let repository = Arc::new(InMemoryProposalRepository::new());
    let state = common::test_app_state(&dir).with_repository(repository.clone());
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(json!({"client_name": "Acme", "project_type": "Website"}))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let id: uuid::Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let record = repository.find(&id).await.unwrap().expect("record saved");
    assert_eq!(record.client_name, "Acme");
    assert_eq!(record.project, "Website");
    assert_eq!(record.company_name.as_deref(), Some("Your Company"));
}

#[actix_web::test]
async fn test_get_unknown_proposal_is_not_found() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(common::test_app_state(&dir));

    let req = test::TestRequest::get()
        .uri(&format!("/api/proposals/{}", uuid::Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_generate_uses_object_storage_when_available() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MockObjectStorage::new());
    let app = init_app!(common::test_app_state_with_remote(&dir, remote.clone()));

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(json!({"client_name": "Acme", "project_type": "Website"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    let filename = body["proposal_pdf_filename"].as_str().unwrap();
    assert_eq!(body["storage"], json!("object_store"));
    assert!(body["proposal_pdf_download_url"]
        .as_str()
        .unwrap()
        .starts_with("https://storage.test/signed/proposals/"));
    assert!(remote.has_file(&format!("proposals/{}", filename)).await);
    assert!(!dir.path().join(filename).exists());
}

#[actix_web::test]
async fn test_generate_falls_back_to_local_when_object_storage_fails() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MockObjectStorage::failing());
    let app = init_app!(common::test_app_state_with_remote(&dir, remote));

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_json(json!({"client_name": "Acme", "project_type": "Website"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["storage"], json!("local"));
    let filename = body["proposal_pdf_filename"].as_str().unwrap();
    assert!(dir.path().join(filename).is_file());
}

#[actix_web::test]
async fn test_composed_proposal_uses_template_without_generator() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(common::test_app_state(&dir));

    let req = test::TestRequest::post()
        .uri("/generate/composed")
        .set_json(json!({"client_name": "Acme", "project_title": "Customer portal"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["text_source"], json!("template"));
    let text = body["proposal_text"].as_str().unwrap();
    assert!(text.contains("Acme"));
    assert!(text.contains("Not specified"));

    let filename = body["proposal_pdf_filename"].as_str().unwrap();
    assert!(filename.starts_with("proposal_Acme_Customer_portal_"));
    assert!(dir.path().join(filename).is_file());
}

#[actix_web::test]
async fn test_composed_proposal_accepts_empty_object() {
    let dir = TempDir::new().unwrap();
    let app = init_app!(common::test_app_state(&dir));

    let req = test::TestRequest::post()
        .uri("/generate/composed")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn test_composed_proposal_uses_generated_text() {
    let dir = TempDir::new().unwrap();
    let state = common::test_app_state(&dir)
        .with_text_generator(Arc::new(FixedTextGenerator("Executive Summary\n\nGenerated body.")));
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/generate/composed")
        .set_json(json!({"client_name": "Acme", "project_title": "Portal", "tone": "friendly"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["text_source"], json!("generated"));
    assert_eq!(
        body["proposal_text"],
        json!("Executive Summary\n\nGenerated body.")
    );

    let id = body["id"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/proposals/{}", id))
        .to_request();
    let record: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(record["kind"], json!("composed"));
    assert!(record["total"].is_null());
}
