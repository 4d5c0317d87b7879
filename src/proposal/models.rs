use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::validation::{validate_required, ValidationErrors, Validator};
use crate::composer::TextSource;
use crate::pricing::LineItem;
use crate::storage::StorageLocation;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct GenerateProposalRequest {
    #[schema(example = "Acme Corp")]
    pub client_name: Option<String>,
    #[schema(example = "Website redesign")]
    pub project_type: Option<String>,
    #[schema(example = "Northwind Studio")]
    pub company_name: Option<String>,
}

impl Validator for GenerateProposalRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(
            self.client_name.as_deref(),
            "client_name",
            "Client name",
            &mut errors,
        );
        validate_required(
            self.project_type.as_deref(),
            "project_type",
            "Project type",
            &mut errors,
        );
        errors.into_result()
    }
}

/// Trimmed, validated inputs for the priced proposal pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalInput {
    pub client_name: String,
    pub project_type: String,
    pub company_name: String,
}

impl GenerateProposalRequest {
    pub fn into_input(self, default_company_name: &str) -> Result<ProposalInput, ValidationErrors> {
        self.validate()?;
        let trimmed = |value: Option<String>| value.unwrap_or_default().trim().to_string();
        let company_name = match trimmed(self.company_name) {
            name if name.is_empty() => default_company_name.to_string(),
            name => name,
        };
        Ok(ProposalInput {
            client_name: trimmed(self.client_name),
            project_type: trimmed(self.project_type),
            company_name,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ESignature {
    pub enabled: bool,
    #[schema(example = "E-sign integration coming later")]
    pub note: String,
    pub endpoint: Option<String>,
}

impl Default for ESignature {
    fn default() -> Self {
        Self {
            enabled: false,
            note: "E-sign integration coming later".to_string(),
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProposalResponse {
    pub id: Uuid,
    #[schema(example = "proposal_Acme_Corp_Website_redesign_0f8fad5bd9cb469fa16570867728950e.pdf")]
    pub proposal_pdf_filename: String,
    pub proposal_pdf_download_url: String,
    pub storage: StorageLocation,
    pub pricing_table: Vec<LineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 4095.0)]
    pub total: Decimal,
    pub cover_letter: String,
    pub contract_text: String,
    pub e_signature: ESignature,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComposedProposalResponse {
    pub id: Uuid,
    pub proposal_pdf_filename: String,
    pub proposal_pdf_download_url: String,
    pub storage: StorageLocation,
    pub proposal_text: String,
    pub text_source: TextSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    Priced,
    Composed,
}

/// Metadata kept for each generated proposal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProposalRecord {
    pub id: Uuid,
    pub kind: ProposalKind,
    #[schema(example = "Acme Corp")]
    pub client_name: String,
    #[schema(example = "Website redesign")]
    pub project: String,
    pub company_name: Option<String>,
    pub filename: String,
    pub download_url: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>, example = 4095.0)]
    pub total: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    #[schema(example = "Auto Proposal & Quotation Generator")]
    pub service: String,
    pub time: String,
}
