use async_trait::async_trait;
use tokio::sync::Mutex;

use applypilot_core_types::{ApplicationOutcome, JobPosting};

use crate::errors::FlowError;

/// Persistence seam for attempt results. One `record` call per attempt,
/// made before the batch moves on to the next posting.
#[async_trait]
pub trait OutcomeStore: Send + Sync {
    async fn record(
        &self,
        posting: &JobPosting,
        outcome: &ApplicationOutcome,
    ) -> Result<(), FlowError>;
}

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct MemoryOutcomeStore {
    records: Mutex<Vec<(JobPosting, ApplicationOutcome)>>,
}

impl MemoryOutcomeStore {
    pub async fn records(&self) -> Vec<(JobPosting, ApplicationOutcome)> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl OutcomeStore for MemoryOutcomeStore {
    async fn record(
        &self,
        posting: &JobPosting,
        outcome: &ApplicationOutcome,
    ) -> Result<(), FlowError> {
        self.records
            .lock()
            .await
            .push((posting.clone(), outcome.clone()));
        Ok(())
    }
}
