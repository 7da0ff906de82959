//! The attempt state machine: classify, gate, extract, map, fill, step,
//! submit, verify. All failure paths funnel into one `ApplicationOutcome`.

use std::sync::Arc;

use tracing::{info, warn};

use applypilot_core_types::{
    ApplicationConfig, ApplicationOutcome, ApplicationStatus, JobPosting,
};
use applypilot_mapper::{FieldMapper, MappingRequest, RuleBasedMapper};
use applypilot_perceiver::keywords::{contains_any, CANCEL_WORDS};
use applypilot_perceiver::{FieldExtractor, GateOutcome, LoginGate, PageClass, PageClassifier};
use applypilot_session::PagePort;

use crate::errors::FlowError;
use crate::filler::FormFiller;
use crate::policy::FlowPolicy;
use crate::route::{handler_for, PlatformRoute, StageContext};
use crate::submit;
use crate::{steps, submit::Verdict};

/// Drives one posting from URL to terminal outcome. The mapper is injected
/// so the same pipeline runs with the LLM mapper, the rule mapper, or a
/// test double; the rule mapper additionally backs every mapper failure.
pub struct ApplyPipeline {
    mapper: Arc<dyn FieldMapper>,
    policy: FlowPolicy,
}

impl ApplyPipeline {
    pub fn new(mapper: Arc<dyn FieldMapper>) -> Self {
        Self {
            mapper,
            policy: FlowPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FlowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run one attempt. Infallible by construction: every internal error
    /// becomes a failure outcome carrying the mapped status.
    #[tracing::instrument(skip_all, fields(job = %posting.id))]
    pub async fn run(
        &self,
        page: &dyn PagePort,
        posting: &JobPosting,
        config: &ApplicationConfig,
    ) -> ApplicationOutcome {
        info!(
            job = %posting.id,
            title = %posting.title,
            company = %posting.company,
            url = %posting.job_url,
            "starting application attempt"
        );
        let result = self.attempt(page, posting, config).await;
        let final_url = page
            .current_url()
            .await
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| posting.job_url.clone());

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(job = %posting.id, error = %err, "attempt failed");
                ApplicationOutcome::failure(err.status(), err.to_string(), final_url.clone())
            }
        };
        let outcome = outcome.with_ats(applypilot_perceiver::detect_ats(&final_url));
        info!(job = %posting.id, status = ?outcome.status, "attempt finished");
        outcome
    }

    /// `run`, then unconditionally release the page. Every exit path of an
    /// owned-session attempt goes through the close.
    pub async fn run_with_session(
        &self,
        page: Box<dyn PagePort>,
        posting: &JobPosting,
        config: &ApplicationConfig,
    ) -> ApplicationOutcome {
        let outcome = self.run(page.as_ref(), posting, config).await;
        page.close().await;
        outcome
    }

    async fn attempt(
        &self,
        page: &dyn PagePort,
        posting: &JobPosting,
        config: &ApplicationConfig,
    ) -> Result<ApplicationOutcome, FlowError> {
        page.navigate(&posting.job_url).await?;

        let classifier = PageClassifier::new(self.policy.classifier.clone());
        if classifier.classify(page).await? == PageClass::SearchResults {
            return Err(FlowError::ListingPage);
        }

        let url = page.current_url().await?;
        let route = PlatformRoute::resolve(&url, &posting.source);
        info!(route = ?route, "routing attempt");

        let cx = StageContext {
            page,
            posting,
            config,
            mapper: self.mapper.as_ref(),
            policy: &self.policy,
        };
        handler_for(&route).attempt(&cx).await
    }
}

impl Default for ApplyPipeline {
    fn default() -> Self {
        Self::new(Arc::new(RuleBasedMapper))
    }
}

/// Block until the login wall (if any) clears or the wait window runs out.
pub(crate) async fn wait_out_login(cx: &StageContext<'_>) -> Result<(), FlowError> {
    let gate = LoginGate::new(cx.policy.gate.clone());
    match gate.wait_for_login(cx.page).await? {
        GateOutcome::NoWall | GateOutcome::Resolved => Ok(()),
        GateOutcome::Unresolved => Err(FlowError::LoginRequired),
    }
}

/// Click the apply affordance that reveals the real form, if one is on
/// screen. Returns whether anything was clicked.
pub(crate) async fn open_apply_form(cx: &StageContext<'_>) -> Result<bool, FlowError> {
    let buttons = cx.page.visible_buttons().await?;
    let apply = buttons.iter().filter(|b| b.is_visible).find(|b| {
        let haystack = b.naming_haystack();
        haystack.contains("apply") && !contains_any(&haystack, CANCEL_WORDS)
    });
    let Some(apply) = apply else {
        return Ok(false);
    };
    info!(text = %apply.text, "opening apply form");
    cx.page.click_button(apply).await?;
    cx.page.settle(cx.policy.step_settle).await?;
    Ok(true)
}

/// Extract, map, fill, advance through wizard steps, submit, verify.
pub(crate) async fn form_flow(
    cx: &StageContext<'_>,
    probe_apply: bool,
) -> Result<ApplicationOutcome, FlowError> {
    let mut fields = FieldExtractor::extract(cx.page).await?;
    if fields.is_empty() && probe_apply && open_apply_form(cx).await? {
        fields = FieldExtractor::extract(cx.page).await?;
    }
    if fields.is_empty() {
        return Err(FlowError::FormNotFound);
    }

    let request = MappingRequest::new(fields.clone(), cx.posting, cx.config);
    let mappings = match cx.mapper.map_fields(&request).await {
        Ok(mappings) if !mappings.is_empty() => {
            info!(mapper = cx.mapper.name(), count = mappings.len(), "fields mapped");
            mappings
        }
        Ok(_) => {
            info!(mapper = cx.mapper.name(), "mapper returned nothing, using rules");
            RuleBasedMapper::map(&request)
        }
        Err(err) => {
            warn!(mapper = cx.mapper.name(), error = %err, "mapper failed, using rules");
            RuleBasedMapper::map(&request)
        }
    };

    let report = FormFiller::apply(cx.page, &fields, &mappings, &cx.policy.fill).await;
    info!(
        applied = report.applied,
        skipped = report.skipped,
        failed = report.failed,
        "fill pass complete"
    );

    // Wizard steps: advance, re-extract, fill contact basics, bounded by
    // the policy ceiling.
    let mut step = 0;
    while step < cx.policy.max_wizard_steps {
        let buttons = cx.page.visible_buttons().await?;
        let Some(next) = steps::find_next_control(&buttons) else {
            break;
        };
        step += 1;
        info!(step, text = %next.text, "advancing wizard");
        cx.page.click_button(&next).await?;
        cx.page.settle(cx.policy.step_settle).await?;

        let step_fields = FieldExtractor::extract(cx.page).await?;
        let contact =
            RuleBasedMapper::map_contact_only(&step_fields, &cx.config.applicant_profile);
        FormFiller::apply(cx.page, &step_fields, &contact, &cx.policy.fill).await;
    }

    let buttons = cx.page.visible_buttons().await?;
    let Some(submit_control) = submit::find_submit_control(&buttons) else {
        return Err(FlowError::SubmitNotFound);
    };
    info!(text = %submit_control.text, "submitting");
    cx.page.click_button(&submit_control).await?;
    cx.page.settle(cx.policy.post_submit_settle).await?;

    let final_url = cx.page.current_url().await?;
    match submit::verify_success(cx.page).await? {
        Verdict::Success => Ok(ApplicationOutcome::applied(
            format!("application submitted to {}", cx.posting.company),
            final_url,
        )),
        Verdict::Ambiguous(reason) => Ok(ApplicationOutcome::failure(
            ApplicationStatus::Pending,
            format!("submission could not be verified: {reason}"),
            final_url,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FixturePage, PageState};
    use applypilot_core_types::{ApplicantProfile, FieldKind};
    use applypilot_mapper::MapperError;
    use applypilot_perceiver::keywords::{JOB_CARD_SELECTOR, PAGINATION_SELECTOR};
    use async_trait::async_trait;
    use std::collections::HashMap;

    fn posting() -> JobPosting {
        let mut posting = JobPosting::new(
            "Backend Engineer",
            "Acme",
            "https://jobs.example.test/job/backend-1",
        );
        posting.source = "crawler".into();
        posting
    }

    fn config() -> ApplicationConfig {
        ApplicationConfig {
            resume_path: None,
            cover_letter_text: "Dear team, I would like to apply.".into(),
            applicant_profile: ApplicantProfile {
                full_name: "Jane Doe".into(),
                email: "jane@example.com".into(),
                phone: Some("+1 555 0100".into()),
                ..Default::default()
            },
        }
    }

    fn pipeline() -> ApplyPipeline {
        ApplyPipeline::default().with_policy(FlowPolicy::fast())
    }

    fn form_state() -> PageState {
        PageState {
            url: "https://jobs.example.test/job/backend-1".into(),
            title: "Backend Engineer - Acme".into(),
            body: "Backend Engineer at Acme. Fill in the application below.".into(),
            fields: vec![
                FixturePage::text_field(0, "first_name"),
                FixturePage::text_field(1, "last_name"),
                {
                    let mut f = FixturePage::text_field(2, "email");
                    f.element_type = FieldKind::Email;
                    f
                },
            ],
            buttons: vec![FixturePage::button(0, "Submit application", "submit")],
            counts: HashMap::new(),
        }
    }

    fn confirm_state() -> PageState {
        PageState {
            url: "https://jobs.example.test/job/backend-1/confirm".into(),
            title: "Application received".into(),
            body: "Thank you, Jane! We received your application.".into(),
            ..PageState::default()
        }
    }

    #[tokio::test]
    async fn test_single_page_form_applies() {
        let page = FixturePage::default()
            .on_navigate("backend-1", form_state())
            .on_click(0, confirm_state());

        let outcome = pipeline().run(&page, &posting(), &config()).await;

        assert!(outcome.success);
        assert_eq!(outcome.status, ApplicationStatus::Applied);
        assert_eq!(
            outcome.confirmation_url.as_deref(),
            Some("https://jobs.example.test/job/backend-1/confirm")
        );
        assert_eq!(outcome.final_url, outcome.confirmation_url.unwrap());
        let filled = page.filled_values();
        assert!(filled.contains(&(0, "Jane".into())));
        assert!(filled.contains(&(1, "Doe".into())));
        assert!(filled.contains(&(2, "jane@example.com".into())));
    }

    #[tokio::test]
    async fn test_listing_page_is_refused_untouched() {
        let mut counts = HashMap::new();
        counts.insert(JOB_CARD_SELECTOR.to_string(), 6);
        counts.insert(PAGINATION_SELECTOR.to_string(), 1);
        let page = FixturePage::default().on_navigate(
            "jobs",
            PageState {
                url: "https://jobs.example.test/jobs?q=rust&page=2".into(),
                title: "Search results".into(),
                body: "1,234 jobs found".into(),
                counts,
                ..PageState::default()
            },
        );

        let mut posting = posting();
        posting.job_url = "https://jobs.example.test/jobs?q=rust&page=2".into();
        let outcome = pipeline().run(&page, &posting, &config()).await;

        assert!(!outcome.success);
        assert_eq!(outcome.status, ApplicationStatus::Error);
        assert!(outcome.message.contains("search-results"));
        assert!(page.filled_values().is_empty());
        assert!(page.clicked_handles().is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_login_wall() {
        let mut counts = HashMap::new();
        counts.insert("input[type=\"password\"]".to_string(), 1);
        let page = FixturePage::default().on_navigate(
            "backend-1",
            PageState {
                counts,
                ..form_state()
            },
        );

        let outcome = pipeline().run(&page, &posting(), &config()).await;

        assert!(!outcome.success);
        assert_eq!(outcome.status, ApplicationStatus::LoginRequired);
        assert!(page.filled_values().is_empty());
    }

    #[tokio::test]
    async fn test_login_wall_clearing_resumes_the_flow() {
        let mut counts = HashMap::new();
        counts.insert("input[type=\"password\"]".to_string(), 1);
        let gated = PageState {
            counts,
            ..form_state()
        };
        let page = FixturePage::default()
            .on_navigate("backend-1", gated)
            // Wall clears on the second poll; the gate re-checks once more.
            .on_settle(vec![form_state(), form_state()])
            .on_click(0, confirm_state());

        let outcome = pipeline().run(&page, &posting(), &config()).await;
        assert_eq!(outcome.status, ApplicationStatus::Applied);
    }

    #[tokio::test]
    async fn test_wizard_steps_then_submit() {
        let step_two = PageState {
            url: "https://jobs.example.test/job/backend-1/step2".into(),
            title: "Step 2".into(),
            body: "Contact details".into(),
            fields: vec![
                {
                    let mut f = FixturePage::text_field(0, "email");
                    f.element_type = FieldKind::Email;
                    f
                },
                {
                    let mut f = FixturePage::text_field(1, "phone");
                    f.element_type = FieldKind::Tel;
                    f
                },
            ],
            buttons: vec![FixturePage::button(5, "Submit application", "submit")],
            counts: HashMap::new(),
        };
        let mut first = form_state();
        first.buttons = vec![FixturePage::button(3, "Continue", "button")];

        let page = FixturePage::default()
            .on_navigate("backend-1", first)
            .on_click(3, step_two)
            .on_click(5, confirm_state());

        let outcome = pipeline().run(&page, &posting(), &config()).await;

        assert_eq!(outcome.status, ApplicationStatus::Applied);
        assert_eq!(page.clicked_handles(), vec![3, 5]);
        // Contact basics filled on the second step.
        assert!(page.filled_values().contains(&(0, "jane@example.com".into())));
    }

    #[tokio::test]
    async fn test_step_loop_is_bounded() {
        // A "Continue" control that never goes away must not loop forever.
        let mut looping = form_state();
        looping.buttons = vec![
            FixturePage::button(3, "Continue", "button"),
            FixturePage::button(0, "Submit application", "submit"),
        ];
        let page = FixturePage::default()
            .on_navigate("backend-1", looping)
            .on_click(0, confirm_state());

        let outcome = pipeline().run(&page, &posting(), &config()).await;

        assert_eq!(outcome.status, ApplicationStatus::Applied);
        let continue_clicks = page
            .clicked_handles()
            .iter()
            .filter(|&&handle| handle == 3)
            .count();
        assert_eq!(continue_clicks as u32, FlowPolicy::fast().max_wizard_steps);
    }

    #[tokio::test]
    async fn test_ambiguous_submit_is_pending_not_applied() {
        let silent = PageState {
            url: "https://jobs.example.test/job/backend-1".into(),
            title: "Backend Engineer - Acme".into(),
            body: "Backend Engineer at Acme.".into(),
            ..PageState::default()
        };
        let page = FixturePage::default()
            .on_navigate("backend-1", form_state())
            .on_click(0, silent);

        let outcome = pipeline().run(&page, &posting(), &config()).await;

        assert!(!outcome.success);
        assert_eq!(outcome.status, ApplicationStatus::Pending);
        assert!(outcome.confirmation_url.is_none());
    }

    #[tokio::test]
    async fn test_no_form_is_manual_required() {
        let mut empty = form_state();
        empty.fields.clear();
        empty.buttons.clear();
        let page = FixturePage::default().on_navigate("backend-1", empty);

        let outcome = pipeline().run(&page, &posting(), &config()).await;
        assert_eq!(outcome.status, ApplicationStatus::ManualRequired);
    }

    struct BrokenMapper;

    #[async_trait]
    impl FieldMapper for BrokenMapper {
        async fn map_fields(
            &self,
            _request: &MappingRequest,
        ) -> Result<Vec<applypilot_core_types::FieldMapping>, MapperError> {
            Err(MapperError::Unavailable("no api key".into()))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_mapper_failure_falls_back_to_rules() {
        let page = FixturePage::default()
            .on_navigate("backend-1", form_state())
            .on_click(0, confirm_state());

        let pipeline =
            ApplyPipeline::new(Arc::new(BrokenMapper)).with_policy(FlowPolicy::fast());
        let outcome = pipeline.run(&page, &posting(), &config()).await;

        assert_eq!(outcome.status, ApplicationStatus::Applied);
        assert!(page.filled_values().contains(&(0, "Jane".into())));
    }

    #[tokio::test]
    async fn test_ats_identity_attached_to_outcome() {
        let mut state = form_state();
        state.url = "https://boards.greenhouse.io/acme/jobs/1".into();
        let confirm = PageState {
            url: "https://boards.greenhouse.io/acme/jobs/1/confirmation".into(),
            title: "Done".into(),
            body: "Thank you, your application has been submitted".into(),
            ..PageState::default()
        };
        let mut posting = posting();
        posting.job_url = "https://boards.greenhouse.io/acme/jobs/1".into();

        let page = FixturePage::default()
            .on_navigate("greenhouse", state)
            .on_click(0, confirm);
        let outcome = pipeline().run(&page, &posting, &config()).await;

        assert_eq!(outcome.status, ApplicationStatus::Applied);
        assert_eq!(
            outcome.ats_type,
            Some(applypilot_core_types::AtsIdentity::Greenhouse)
        );
    }
}
