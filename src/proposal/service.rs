//! The proposal pipeline: validate, price, render, assemble, store, record.

use chrono::Utc;
use thiserror::Error;

use super::models::{
    ComposedProposalResponse, ESignature, GenerateProposalRequest, ProposalKind, ProposalRecord,
    ProposalResponse,
};
use super::validation::ValidationErrors;
use crate::composer::{self, ProposalFields};
use crate::document::{
    text, Assembler, ComposedDocument, DocumentBuildError, PlainTextAssembler, ProposalAssembler,
    ProposalDocument,
};
use crate::state::AppState;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ProposalError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationErrors),
    #[error("document build failed: {0}")]
    DocumentBuild(#[from] DocumentBuildError),
    #[error("storage failed: {0}")]
    Storage(#[from] StorageError),
}

async fn record(state: &AppState, record: ProposalRecord) {
    let id = record.id;
    if let Err(e) = state.proposals.save(record).await {
        log::error!("Failed to record proposal {}: {}", id, e);
    }
}

/// Build, store and record a priced proposal.
pub async fn generate_proposal(
    state: &AppState,
    request: GenerateProposalRequest,
) -> Result<ProposalResponse, ProposalError> {
    let input = request.into_input(&state.default_company_name)?;
    log::debug!(
        "Generating proposal for client '{}' (project '{}')",
        input.client_name,
        input.project_type
    );

    let document = ProposalDocument::prepare(
        &input.client_name,
        &input.project_type,
        &input.company_name,
        text::today(),
    );
    let rendered = ProposalAssembler.assemble(&document)?;
    let stored = state
        .storage
        .store(&rendered.bytes, &rendered.suggested_filename)
        .await?;

    record(
        state,
        ProposalRecord {
            id: rendered.id,
            kind: ProposalKind::Priced,
            client_name: input.client_name.clone(),
            project: input.project_type.clone(),
            company_name: Some(input.company_name.clone()),
            filename: rendered.suggested_filename.clone(),
            download_url: stored.url.clone(),
            total: Some(document.pricing.total),
            created_at: Utc::now(),
        },
    )
    .await;

    Ok(ProposalResponse {
        id: rendered.id,
        proposal_pdf_filename: rendered.suggested_filename,
        proposal_pdf_download_url: stored.url,
        storage: stored.location,
        pricing_table: document.pricing.items,
        total: document.pricing.total,
        cover_letter: document.cover_letter,
        contract_text: document.contract_text,
        e_signature: ESignature::default(),
    })
}

/// Compose, store and record a plain-text proposal. Text generation failures
/// are absorbed by the composer.
pub async fn generate_composed_proposal(
    state: &AppState,
    fields: ProposalFields,
) -> Result<ComposedProposalResponse, ProposalError> {
    let composed = composer::compose(&fields, state.text_generator()).await;

    let document = ComposedDocument {
        client_name: fields.client_name().to_string(),
        project_title: fields.project_title().to_string(),
        title: format!(
            "{} — Proposal for {}",
            fields.project_title(),
            fields.client_name()
        ),
        body: composed.body,
    };
    let rendered = PlainTextAssembler.assemble(&document)?;
    let stored = state
        .storage
        .store(&rendered.bytes, &rendered.suggested_filename)
        .await?;

    record(
        state,
        ProposalRecord {
            id: rendered.id,
            kind: ProposalKind::Composed,
            client_name: document.client_name,
            project: document.project_title,
            company_name: None,
            filename: rendered.suggested_filename.clone(),
            download_url: stored.url.clone(),
            total: None,
            created_at: Utc::now(),
        },
    )
    .await;

    Ok(ComposedProposalResponse {
        id: rendered.id,
        proposal_pdf_filename: rendered.suggested_filename,
        proposal_pdf_download_url: stored.url,
        storage: stored.location,
        proposal_text: document.body,
        text_source: composed.source,
    })
}
