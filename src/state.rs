//! Shared application state: injected collaborators, built once at startup.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

use crate::composer::{OpenAiTextGenerator, TextGenerator};
use crate::config::AppConfig;
use crate::document::text::DEFAULT_COMPANY_NAME;
use crate::proposal::repository::{InMemoryProposalRepository, ProposalRepository};
use crate::storage::{LocalFileStore, ObjectStorage, StorageResolver, SupabaseStorage};

#[derive(Clone)]
pub struct AppState {
    pub storage: StorageResolver,
    pub text_generator: Option<Arc<dyn TextGenerator>>,
    pub proposals: Arc<dyn ProposalRepository>,
    pub default_company_name: String,
}

impl AppState {
    /// State with only local storage, the template composer and an
    /// in-memory repository.
    pub fn new(storage: StorageResolver) -> Self {
        Self {
            storage,
            text_generator: None,
            proposals: Arc::new(InMemoryProposalRepository::new()),
            default_company_name: DEFAULT_COMPANY_NAME.to_string(),
        }
    }

    pub fn with_text_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.text_generator = Some(generator);
        self
    }

    pub fn with_repository(mut self, proposals: Arc<dyn ProposalRepository>) -> Self {
        self.proposals = proposals;
        self
    }

    pub fn with_default_company_name(mut self, name: impl Into<String>) -> Self {
        self.default_company_name = name.into();
        self
    }

    pub fn text_generator(&self) -> Option<&dyn TextGenerator> {
        self.text_generator.as_deref()
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(900))
            .user_agent("auto-proposal-server/0.1")
            .build()
            .context("failed to create HTTP client")?;

        let local = LocalFileStore::new(&config.output_dir, &config.base_url);
        local.ensure_dir().with_context(|| {
            format!(
                "failed to create PDF output directory {}",
                config.output_dir.display()
            )
        })?;

        let remote = config.supabase.clone().map(|supabase| {
            log::info!(
                "Object storage enabled (endpoint={}, bucket={})",
                supabase.url,
                supabase.bucket
            );
            Arc::new(SupabaseStorage::new(supabase, http_client.clone())) as Arc<dyn ObjectStorage>
        });

        let storage =
            StorageResolver::new(remote, local).with_signed_url_ttl(config.signed_url_ttl);

        let mut state = Self::new(storage).with_default_company_name(&config.default_company_name);

        if let Some(openai) = config.openai.clone() {
            let generator = OpenAiTextGenerator::new(openai, http_client);
            log::info!("Text generation enabled (model={})", generator.model());
            state = state.with_text_generator(Arc::new(generator));
        }

        Ok(state)
    }
}
