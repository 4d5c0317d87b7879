//! Proposal metadata persistence.

use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use uuid::Uuid;

use super::models::ProposalRecord;

const RECORD_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_RECORDS: u64 = 10_000;

#[async_trait]
pub trait ProposalRepository: Send + Sync {
    async fn save(&self, record: ProposalRecord) -> Result<(), String>;
    async fn find(&self, id: &Uuid) -> Result<Option<ProposalRecord>, String>;
}

/// Records held in a bounded moka cache; they expire with the signed URLs.
#[derive(Clone)]
pub struct InMemoryProposalRepository {
    records: Cache<Uuid, ProposalRecord>,
}

impl Default for InMemoryProposalRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProposalRepository {
    pub fn new() -> Self {
        Self::with_limits(RECORD_TTL, MAX_RECORDS)
    }

    pub fn with_limits(ttl: Duration, max_capacity: u64) -> Self {
        let records = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();
        Self { records }
    }
}

#[async_trait]
impl ProposalRepository for InMemoryProposalRepository {
    async fn save(&self, record: ProposalRecord) -> Result<(), String> {
        self.records.insert(record.id, record).await;
        Ok(())
    }

    async fn find(&self, id: &Uuid) -> Result<Option<ProposalRecord>, String> {
        Ok(self.records.get(id).await)
    }
}
