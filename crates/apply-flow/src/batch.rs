use async_trait::async_trait;
use tracing::{info, warn};

use applypilot_core_types::{
    ApplicationConfig, ApplicationOutcome, ApplicationStatus, JobPosting, JobStatus,
};
use applypilot_session::PagePort;

use crate::errors::FlowError;
use crate::pipeline::ApplyPipeline;
use crate::store::OutcomeStore;

/// Opens a fresh page context per attempt. Sessions are never shared
/// between attempts.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PagePort>, FlowError>;
}

/// Sequential batch driver: one posting at a time, a fixed pause between
/// attempts, one store write per attempt. A failed attempt (including a
/// failed session launch) records its outcome and the batch continues.
pub struct BatchRunner<'a> {
    pipeline: &'a ApplyPipeline,
    factory: &'a dyn SessionFactory,
    store: &'a dyn OutcomeStore,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        pipeline: &'a ApplyPipeline,
        factory: &'a dyn SessionFactory,
        store: &'a dyn OutcomeStore,
    ) -> Self {
        Self {
            pipeline,
            factory,
            store,
        }
    }

    pub async fn run(
        &self,
        postings: &mut [JobPosting],
        config: &ApplicationConfig,
        delay: std::time::Duration,
    ) -> Vec<ApplicationOutcome> {
        let total = postings.len();
        let mut outcomes = Vec::with_capacity(total);
        for (i, posting) in postings.iter_mut().enumerate() {
            if i > 0 {
                // Fixed pacing toward external sites.
                tokio::time::sleep(delay).await;
            }
            info!(index = i + 1, total, job = %posting.id, "batch attempt");

            let outcome = match self.factory.open().await {
                Ok(page) => self.pipeline.run_with_session(page, posting, config).await,
                Err(err) => ApplicationOutcome::failure(
                    ApplicationStatus::Error,
                    format!("session launch failed: {err}"),
                    posting.job_url.clone(),
                ),
            };

            // The posting's lifecycle status reflects the attempt before
            // the record is written.
            posting.status = if outcome.success {
                JobStatus::Applied
            } else {
                JobStatus::Skipped
            };

            if let Err(err) = self.store.record(posting, &outcome).await {
                warn!(job = %posting.id, error = %err, "outcome record failed");
            }
            outcomes.push(outcome);
        }
        outcomes
    }
}
