//! Posting input files: a JSON array of postings to apply to.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use applypilot_core_types::{JobPosting, JobStatus};

/// Lenient input shape; missing ids and statuses are filled in.
#[derive(Debug, Deserialize)]
struct RawPosting {
    #[serde(default)]
    id: Option<String>,
    title: String,
    company: String,
    job_url: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    source: String,
}

pub fn load_postings(path: &Path) -> Result<Vec<JobPosting>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading jobs file {}", path.display()))?;
    let raw: Vec<RawPosting> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing jobs file {}", path.display()))?;
    if raw.is_empty() {
        bail!("jobs file {} contains no postings", path.display());
    }

    Ok(raw
        .into_iter()
        .map(|item| {
            let mut posting = JobPosting::new(item.title, item.company, item.job_url);
            if let Some(id) = item.id {
                posting.id = id;
            }
            posting.location = item.location;
            posting.description = item.description;
            posting.source = item.source;
            posting.status = JobStatus::New;
            posting
        })
        .collect())
}
