//! End-to-end runs over scripted pages: the full pipeline wired to the
//! batch driver and the JSONL outcome log, no browser involved.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use applypilot_cli::store::JsonlOutcomeStore;
use applypilot_core_types::{
    ApplicantProfile, ApplicationConfig, ApplicationStatus, AtsIdentity, FieldKind, JobPosting,
    JobStatus,
};
use applypilot_flow::testutil::{FixturePage, PageState};
use applypilot_flow::{ApplyPipeline, BatchRunner, FlowError, FlowPolicy, SessionFactory};
use applypilot_perceiver::keywords::{JOB_CARD_SELECTOR, PAGINATION_SELECTOR};
use applypilot_session::PagePort;

fn config_with_resume(resume_path: Option<String>) -> ApplicationConfig {
    ApplicationConfig {
        resume_path,
        cover_letter_text: "Dear hiring team, I am excited to apply.".into(),
        applicant_profile: ApplicantProfile {
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: Some("+1 555 0100".into()),
            ..Default::default()
        },
    }
}

fn config() -> ApplicationConfig {
    config_with_resume(None)
}

fn pipeline() -> ApplyPipeline {
    ApplyPipeline::default().with_policy(FlowPolicy::fast())
}

fn greenhouse_fixture() -> FixturePage {
    let form = PageState {
        url: "https://boards.greenhouse.io/acme/jobs/4012".into(),
        title: "Backend Engineer - Acme".into(),
        body: "Backend Engineer at Acme. Complete the application below.".into(),
        fields: vec![
            FixturePage::text_field(0, "first_name"),
            FixturePage::text_field(1, "last_name"),
            {
                let mut field = FixturePage::text_field(2, "email");
                field.element_type = FieldKind::Email;
                field
            },
            {
                let mut field = FixturePage::text_field(3, "phone");
                field.element_type = FieldKind::Tel;
                field
            },
            {
                // Styled uploads routinely hide the real input.
                let mut field = FixturePage::text_field(4, "resume");
                field.element_type = FieldKind::File;
                field.is_visible = false;
                field
            },
        ],
        buttons: vec![FixturePage::button(0, "Submit application", "submit")],
        counts: HashMap::new(),
    };
    let confirm = PageState {
        url: "https://boards.greenhouse.io/acme/jobs/4012/confirm".into(),
        title: "Application received".into(),
        body: "Thank you, Jane! We received your application.".into(),
        ..PageState::default()
    };
    FixturePage::default()
        .on_navigate("greenhouse", form)
        .on_click(0, confirm)
}

fn listing_fixture() -> FixturePage {
    let mut counts = HashMap::new();
    counts.insert(JOB_CARD_SELECTOR.to_string(), 6);
    counts.insert(PAGINATION_SELECTOR.to_string(), 1);
    FixturePage::default().on_navigate(
        "search",
        PageState {
            url: "https://jobs.example.test/search?q=rust&page=1".into(),
            title: "Rust jobs".into(),
            body: "1,234 jobs found matching your search".into(),
            counts,
            ..PageState::default()
        },
    )
}

#[tokio::test]
async fn greenhouse_like_posting_is_applied_end_to_end() {
    use std::io::Write;

    let mut resume = tempfile::NamedTempFile::new().unwrap();
    resume.write_all(b"%PDF-1.4").unwrap();
    let resume_path = resume.path().to_string_lossy().to_string();

    let page = greenhouse_fixture();
    let posting = JobPosting::new(
        "Backend Engineer",
        "Acme",
        "https://boards.greenhouse.io/acme/jobs/4012",
    );

    let outcome = pipeline()
        .run(&page, &posting, &config_with_resume(Some(resume_path.clone())))
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.status, ApplicationStatus::Applied);
    assert_eq!(outcome.ats_type, Some(AtsIdentity::Greenhouse));
    assert!(outcome
        .confirmation_url
        .as_deref()
        .unwrap()
        .ends_with("/confirm"));

    let filled = page.filled_values();
    assert!(filled.contains(&(0, "Jane".into())));
    assert!(filled.contains(&(1, "Doe".into())));
    assert!(filled.contains(&(2, "jane@example.com".into())));
    assert!(filled.contains(&(3, "+1 555 0100".into())));
    // The resume reaches the hidden file input.
    assert!(filled.contains(&(4, resume_path)));
}

#[tokio::test]
async fn listing_url_is_refused_without_touching_the_page() {
    let page = listing_fixture();
    let posting = JobPosting::new(
        "Rust jobs",
        "various",
        "https://jobs.example.test/search?q=rust&page=1",
    );

    let outcome = pipeline().run(&page, &posting, &config()).await;

    assert!(!outcome.success);
    assert_eq!(outcome.status, ApplicationStatus::Error);
    assert!(outcome.message.contains("search-results"));
    assert!(page.filled_values().is_empty());
    assert!(page.clicked_handles().is_empty());
}

struct ScriptedFactory {
    pages: Mutex<VecDeque<FixturePage>>,
}

#[async_trait]
impl SessionFactory for ScriptedFactory {
    async fn open(&self) -> Result<Box<dyn PagePort>, FlowError> {
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .map(|page| Box::new(page) as Box<dyn PagePort>)
            .ok_or_else(|| FlowError::Internal("fixture exhausted".into()))
    }
}

#[tokio::test]
async fn batch_logs_one_jsonl_line_per_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outcomes.jsonl");

    let pipeline = pipeline();
    let factory = ScriptedFactory {
        pages: Mutex::new(VecDeque::from([greenhouse_fixture(), listing_fixture()])),
    };
    let store = JsonlOutcomeStore::new(path.clone());
    let runner = BatchRunner::new(&pipeline, &factory, &store);

    let mut postings = vec![
        JobPosting::new(
            "Backend Engineer",
            "Acme",
            "https://boards.greenhouse.io/acme/jobs/4012",
        ),
        JobPosting::new(
            "Rust jobs",
            "various",
            "https://jobs.example.test/search?q=rust&page=1",
        ),
    ];
    let outcomes = runner
        .run(&mut postings, &config(), Duration::from_millis(1))
        .await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].status, ApplicationStatus::Applied);
    assert_eq!(outcomes[1].status, ApplicationStatus::Error);
    assert_eq!(postings[0].status, JobStatus::Applied);
    assert_eq!(postings[1].status, JobStatus::Skipped);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["outcome"]["status"], "applied");
    assert_eq!(lines[0]["outcome"]["ats_type"], "greenhouse");
    assert_eq!(lines[1]["outcome"]["status"], "error");
}
