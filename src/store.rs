//! Append-only JSONL outcome log, one line per attempt.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::json;
use tokio::io::AsyncWriteExt;

use applypilot_core_types::{ApplicationOutcome, JobPosting};
use applypilot_flow::{FlowError, OutcomeStore};

pub struct JsonlOutcomeStore {
    path: PathBuf,
}

impl JsonlOutcomeStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl OutcomeStore for JsonlOutcomeStore {
    async fn record(
        &self,
        posting: &JobPosting,
        outcome: &ApplicationOutcome,
    ) -> Result<(), FlowError> {
        let record = json!({
            "job_id": posting.id,
            "title": posting.title,
            "company": posting.company,
            "job_url": posting.job_url,
            "source": posting.source,
            "outcome": outcome,
        });
        let mut line = serde_json::to_string(&record)
            .map_err(|err| FlowError::Internal(format!("outcome serialization: {err}")))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|err| {
                FlowError::Internal(format!("opening {}: {err}", self.path.display()))
            })?;
        file.write_all(line.as_bytes()).await.map_err(|err| {
            FlowError::Internal(format!("writing {}: {err}", self.path.display()))
        })?;
        file.flush()
            .await
            .map_err(|err| FlowError::Internal(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use applypilot_core_types::ApplicationStatus;

    #[tokio::test]
    async fn test_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outcomes.jsonl");
        let store = JsonlOutcomeStore::new(path.clone());

        let posting = JobPosting::new("A", "Acme", "https://jobs.acme.test/job/1");
        let applied =
            ApplicationOutcome::applied("done", "https://jobs.acme.test/job/1/confirm");
        let failed = ApplicationOutcome::failure(
            ApplicationStatus::LoginRequired,
            "wall",
            "https://jobs.acme.test/job/1",
        );
        store.record(&posting, &applied).await.unwrap();
        store.record(&posting, &failed).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["outcome"]["status"], "applied");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["outcome"]["status"], "login_required");
    }
}
