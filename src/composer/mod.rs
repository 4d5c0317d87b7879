//! Proposal text composer.
//!
//! Produces one structured proposal body from a set of named fields. When a
//! [`TextGenerator`] is configured the body is requested from it; when none is
//! configured, or the call fails, times out, or returns nothing usable, the
//! deterministic template is used instead. Failures never reach the caller.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

pub use openai::{OpenAiConfig, OpenAiTextGenerator};

pub const NOT_SPECIFIED: &str = "Not specified";
pub const DEFAULT_TONE: &str = "professional";

pub const SECTION_HEADINGS: [&str; 7] = [
    "Introduction",
    "Project Understanding",
    "Scope of Work",
    "Deliverables",
    "Timeline",
    "Investment",
    "Next Steps",
];

pub const TEMPERATURE: f32 = 0.4;
pub const MAX_TOKENS: u32 = 1200;

#[derive(Debug, Error)]
pub enum TextGenerationError {
    #[error("text generation timed out after {0:?}")]
    Timeout(Duration),
    #[error("text generation request failed: {0}")]
    Request(String),
    #[error("text generation provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("text generation response was malformed: {0}")]
    Malformed(String),
}

/// External text-generation collaborator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, TextGenerationError>;

    /// Upper bound for one completion; the composer gives up after this.
    fn timeout(&self) -> Duration {
        Duration::from_secs(20)
    }
}

/// Named inputs for a composed proposal. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProposalFields {
    #[schema(example = "Acme Corp")]
    pub client_name: Option<String>,
    #[schema(example = "Customer portal")]
    pub project_title: Option<String>,
    #[schema(example = "Self-service portal with SSO and billing history")]
    pub scope: Option<String>,
    #[schema(example = "$12,000")]
    pub budget: Option<String>,
    #[schema(example = "8 weeks")]
    pub timeline: Option<String>,
    #[schema(example = "friendly")]
    pub tone: Option<String>,
    pub notes: Option<String>,
}

fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

impl ProposalFields {
    pub fn client_name(&self) -> &str {
        or_default(&self.client_name, NOT_SPECIFIED)
    }

    pub fn project_title(&self) -> &str {
        or_default(&self.project_title, NOT_SPECIFIED)
    }

    pub fn scope(&self) -> &str {
        or_default(&self.scope, NOT_SPECIFIED)
    }

    pub fn budget(&self) -> &str {
        or_default(&self.budget, NOT_SPECIFIED)
    }

    pub fn timeline(&self) -> &str {
        or_default(&self.timeline, NOT_SPECIFIED)
    }

    pub fn tone(&self) -> &str {
        or_default(&self.tone, DEFAULT_TONE)
    }

    pub fn notes(&self) -> &str {
        or_default(&self.notes, NOT_SPECIFIED)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    Generated,
    Template,
}

#[derive(Debug, Clone)]
pub struct ComposedText {
    pub body: String,
    pub source: TextSource,
}

/// Prompt sent to the text-generation collaborator.
pub fn build_prompt(fields: &ProposalFields) -> String {
    format!(
        "You are an experienced consultant writing a client proposal.\n\
         Write a {tone} business proposal in plain text (no markdown) using exactly \
         these section headings, in this order: {headings}.\n\n\
         Client: {client}\n\
         Project: {title}\n\
         Scope: {scope}\n\
         Budget: {budget}\n\
         Timeline: {timeline}\n\
         Additional notes: {notes}\n\n\
         Keep it concise, specific to the client, and end with a clear call to action.",
        tone = fields.tone(),
        headings = SECTION_HEADINGS.join(", "),
        client = fields.client_name(),
        title = fields.project_title(),
        scope = fields.scope(),
        budget = fields.budget(),
        timeline = fields.timeline(),
        notes = fields.notes(),
    )
}

/// Deterministic proposal body. Identical fields always give identical
/// output.
pub fn fallback_body(fields: &ProposalFields) -> String {
    let client = fields.client_name();
    let title = fields.project_title();
    format!(
        "Proposal: {title}\n\
         Prepared for: {client}\n\n\
         Introduction\n\
         Thank you for the opportunity to propose on {title}. This document outlines \
         how we will approach the work, what you will receive, and what it will cost.\n\n\
         Project Understanding\n\
         {client} is looking for a partner to deliver {title}. Requested tone: {tone}.\n\
         Notes: {notes}\n\n\
         Scope of Work\n\
         {scope}\n\n\
         Deliverables\n\
         All work described in the scope above, delivered and reviewed with {client}.\n\n\
         Timeline\n\
         {timeline}\n\n\
         Investment\n\
         {budget}\n\n\
         Next Steps\n\
         Reply to confirm the scope and timeline, and we will send an agreement to \
         schedule a kickoff.\n",
        tone = fields.tone(),
        notes = fields.notes(),
        scope = fields.scope(),
        timeline = fields.timeline(),
        budget = fields.budget(),
    )
}

async fn generate(
    generator: &dyn TextGenerator,
    prompt: &str,
) -> Result<String, TextGenerationError> {
    let limit = generator.timeout();
    let text = tokio::time::timeout(limit, generator.complete(prompt))
        .await
        .map_err(|_| TextGenerationError::Timeout(limit))??;

    let text = text.trim();
    if text.is_empty() {
        return Err(TextGenerationError::Malformed("empty completion".to_string()));
    }
    Ok(text.to_string())
}

/// Compose a proposal body, falling back to [`fallback_body`] on any
/// generator failure.
pub async fn compose(
    fields: &ProposalFields,
    generator: Option<&dyn TextGenerator>,
) -> ComposedText {
    let Some(generator) = generator else {
        log::debug!("No text generator configured, using template body");
        return ComposedText {
            body: fallback_body(fields),
            source: TextSource::Template,
        };
    };

    match generate(generator, &build_prompt(fields)).await {
        Ok(body) => ComposedText {
            body,
            source: TextSource::Generated,
        },
        Err(e) => {
            log::warn!("Text generation unavailable, using template body: {}", e);
            ComposedText {
                body: fallback_body(fields),
                source: TextSource::Template,
            }
        }
    }
}
